//! Material database with fabric presets.
//!
//! Preset values are representative of common woven and knitted fabrics
//! at the membrane level; they are starting points, not measurements of a
//! particular bolt of cloth.

use std::collections::BTreeMap;

use crate::properties::FabricProperties;
use crate::stiffness::StretchingStiffness;

/// Built-in presets:
/// `(name, density kg/m², [warp, weft, coupling, shear] N/m, bending N·m, damping s)`.
const PRESETS: [(&str, f64, [f64; 4], f64, f64); 5] = [
    // Medium-weight twill, holds defined folds
    ("cotton_twill", 0.200, [1200.0, 1000.0, 200.0, 300.0], 5.0e-5, 0.002),
    // Light and flowing
    ("silk_charmeuse", 0.080, [400.0, 360.0, 60.0, 100.0], 4.0e-6, 0.001),
    // Heavy, sharp creases
    ("denim_14oz", 0.400, [3000.0, 2500.0, 500.0, 900.0], 4.0e-4, 0.003),
    // Knit: weft stiffer than warp
    ("jersey_knit", 0.180, [150.0, 220.0, 30.0, 50.0], 1.0e-5, 0.002),
    ("chiffon", 0.050, [250.0, 220.0, 40.0, 60.0], 1.0e-6, 0.001),
];

/// Fabric materials keyed by name.
///
/// Iteration and [`names`](Self::names) are in name order.
#[derive(Debug, Clone)]
pub struct MaterialDatabase {
    materials: BTreeMap<String, FabricProperties>,
}

impl MaterialDatabase {
    /// Database holding the built-in presets.
    pub fn with_defaults() -> Self {
        let mut db = Self::empty();
        for (name, density, [warp, weft, coupling, shear], bending, damping) in PRESETS {
            db.register(FabricProperties {
                name: name.into(),
                density,
                stretching: StretchingStiffness::orthotropic(warp, weft, coupling, shear),
                bending_stiffness: bending,
                damping,
            });
        }
        db
    }

    /// Database with no entries.
    pub fn empty() -> Self {
        Self {
            materials: BTreeMap::new(),
        }
    }

    /// Adds `props` under its own name, replacing any previous entry.
    pub fn register(&mut self, props: FabricProperties) {
        self.materials.insert(props.name.clone(), props);
    }

    /// Material called `name`, if registered.
    pub fn get(&self, name: &str) -> Option<&FabricProperties> {
        self.materials.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.materials.keys().map(String::as_str).collect()
    }

    /// Materials in name order.
    pub fn iter(&self) -> impl Iterator<Item = &FabricProperties> {
        self.materials.values()
    }

    /// Number of registered materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Default for MaterialDatabase {
    fn default() -> Self {
        Self::with_defaults()
    }
}
