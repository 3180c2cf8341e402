//! Integration tests for weft-types.

use weft_types::{EdgeId, FaceId, PointId, WeftError};

// ─── ID Tests ──────────────────────────────────────────────────

#[test]
fn point_id_index_and_dof() {
    let id = PointId(42);
    assert_eq!(id.index(), 42);
    assert_eq!(id.dof(), 126);
}

#[test]
fn face_and_edge_id_index() {
    assert_eq!(FaceId(7).index(), 7);
    assert_eq!(EdgeId(3).index(), 3);
}

#[test]
fn ids_are_serializable() {
    let id = PointId(100);
    let json = serde_json::to_string(&id).unwrap();
    let deserialized: PointId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, deserialized);
}

// ─── Error Tests ──────────────────────────────────────────────

#[test]
fn error_display() {
    let err = WeftError::InvalidMesh("point 4 has no adjacent face".into());
    assert!(err.to_string().contains("no adjacent face"));
}

#[test]
fn not_positive_definite_carries_retry_context() {
    let err = WeftError::NotPositiveDefinite {
        step: 12,
        dt: 0.01,
        detail: "diagonal entry 6 is -1.0".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("step 12"));
    assert!(msg.contains("diagonal entry 6"));
    assert!(err.is_step_failure());
    assert_eq!(err.failed_dt(), Some(0.01));
}

#[test]
fn config_errors_are_not_step_failures() {
    let err = WeftError::InvalidConfig("dt must be positive".into());
    assert!(!err.is_step_failure());
    assert_eq!(err.failed_dt(), None);
}
