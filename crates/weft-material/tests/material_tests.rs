//! Integration tests for weft-material.

use weft_material::{FabricProperties, MaterialDatabase, StretchingStiffness};

fn test_fabric() -> FabricProperties {
    FabricProperties {
        name: "test".into(),
        density: 0.15,
        stretching: StretchingStiffness::orthotropic(800.0, 600.0, 100.0, 200.0),
        bending_stiffness: 1e-5,
        damping: 0.01,
    }
}

// ─── StretchingStiffness Tests ────────────────────────────────

#[test]
fn isotropic_coefficients() {
    let s = StretchingStiffness::isotropic(1000.0, 0.3);
    let d = 1000.0 / (1.0 - 0.09);
    assert!((s.warp() - d).abs() < 1e-9);
    assert!((s.weft() - d).abs() < 1e-9);
    assert!((s.coupling() - 0.3 * d).abs() < 1e-9);
    assert!((s.shear() - 1000.0 / 1.3).abs() < 1e-9);
    assert!(!s.is_anisotropic());
    assert!(s.is_positive_semidefinite());
}

#[test]
fn orthotropic_layout() {
    let s = StretchingStiffness::orthotropic(1.0, 2.0, 3.0, 4.0);
    assert_eq!(s.k, [1.0, 3.0, 2.0, 4.0]);
    assert!((s.warp_weft_ratio() - 0.5).abs() < 1e-12);
    assert!(s.is_anisotropic());
}

#[test]
fn semidefinite_check() {
    assert!(StretchingStiffness::orthotropic(4.0, 1.0, 2.0, 0.0).is_positive_semidefinite());
    // k_warp · k_weft < k_coupling²
    assert!(!StretchingStiffness::orthotropic(1.0, 1.0, 2.0, 1.0).is_positive_semidefinite());
    assert!(!StretchingStiffness::orthotropic(1.0, 1.0, 0.0, -1.0).is_positive_semidefinite());
    assert!(StretchingStiffness::orthotropic(1.0, 1.0, 2.0, 1.0).validate().is_err());
    assert!(StretchingStiffness::orthotropic(f64::NAN, 1.0, 0.0, 1.0).validate().is_err());
}

// ─── FabricProperties Tests ───────────────────────────────────

#[test]
fn valid_fabric_passes() {
    assert!(test_fabric().validate().is_ok());
}

#[test]
fn validate_rejects_out_of_range_parameters() {
    let mut f = test_fabric();
    f.density = 0.0;
    assert!(f.validate().is_err());

    let mut f = test_fabric();
    f.bending_stiffness = -1.0;
    assert!(f.validate().is_err());

    let mut f = test_fabric();
    f.damping = f64::INFINITY;
    assert!(f.validate().is_err());

    let mut f = test_fabric();
    f.stretching = StretchingStiffness::orthotropic(-1.0, 1.0, 0.0, 1.0);
    let err = f.validate().unwrap_err().to_string();
    assert!(err.contains("test"), "error should name the fabric: {err}");
}

#[test]
fn fabric_toml_round_trip() {
    let f = test_fabric();
    let text = toml::to_string(&f).unwrap();
    let back: FabricProperties = toml::from_str(&text).unwrap();
    assert_eq!(f, back);
}

#[test]
fn damping_defaults_to_zero() {
    let text = r#"
        name = "undamped"
        density = 0.1
        bending_stiffness = 0.0

        [stretching]
        k = [100.0, 0.0, 100.0, 50.0]
    "#;
    let f: FabricProperties = toml::from_str(text).unwrap();
    assert_eq!(f.damping, 0.0);
    assert!(f.validate().is_ok());
}

// ─── MaterialDatabase Tests ──────────────────────────────────

#[test]
fn default_database_has_five_materials() {
    let db = MaterialDatabase::with_defaults();
    assert_eq!(db.len(), 5);
}

#[test]
fn lookup_by_name() {
    let db = MaterialDatabase::with_defaults();
    let cotton = db.get("cotton_twill").unwrap();
    assert!((cotton.density - 0.2).abs() < 1e-12);
}

#[test]
fn names_are_sorted() {
    let db = MaterialDatabase::with_defaults();
    assert_eq!(
        db.names(),
        vec!["chiffon", "cotton_twill", "denim_14oz", "jersey_knit", "silk_charmeuse"]
    );
}

#[test]
fn all_presets_are_valid() {
    let db = MaterialDatabase::with_defaults();
    for m in db.iter() {
        assert!(m.validate().is_ok(), "preset {} failed validation", m.name);
    }
}

#[test]
fn missing_material_returns_none() {
    let db = MaterialDatabase::with_defaults();
    assert!(db.get("nonexistent").is_none());
}

#[test]
fn custom_material() {
    let mut db = MaterialDatabase::empty();
    assert!(db.is_empty());
    db.register(test_fabric());
    assert_eq!(db.len(), 1);
    assert!(db.get("test").is_some());
}

#[test]
fn density_ordering() {
    let db = MaterialDatabase::with_defaults();
    let chiffon = db.get("chiffon").unwrap().density;
    let silk = db.get("silk_charmeuse").unwrap().density;
    let jersey = db.get("jersey_knit").unwrap().density;
    let cotton = db.get("cotton_twill").unwrap().density;
    let denim = db.get("denim_14oz").unwrap().density;
    assert!(chiffon < silk);
    assert!(silk < jersey);
    assert!(jersey < cotton);
    assert!(cotton < denim);
}

#[test]
fn stiffness_ordering() {
    let db = MaterialDatabase::with_defaults();
    let denim = db.get("denim_14oz").unwrap();
    let chiffon = db.get("chiffon").unwrap();
    assert!(denim.stretching.warp() > chiffon.stretching.warp());
    assert!(denim.bending_stiffness > chiffon.bending_stiffness);
}

#[test]
fn jersey_is_weft_dominant() {
    let db = MaterialDatabase::with_defaults();
    let jersey = db.get("jersey_knit").unwrap();
    assert!(jersey.stretching.warp_weft_ratio() < 1.0);
    assert!(jersey.stretching.is_anisotropic());
}
