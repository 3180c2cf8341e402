//! # weft-material
//!
//! Fabric parameters consumed by the force models.
//!
//! [`FabricProperties`] bundles areal density, a four-coefficient
//! [`StretchingStiffness`], bending rigidity and damping. The
//! [`MaterialDatabase`] stores named presets for common fabrics.

pub mod database;
pub mod properties;
pub mod stiffness;

pub use database::MaterialDatabase;
pub use properties::FabricProperties;
pub use stiffness::StretchingStiffness;
