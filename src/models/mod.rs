//! Core data models for boundary checking.

pub mod conflict;
pub mod feature;

pub use conflict::{ConflictResult, PairKey};
pub use feature::{Feature, GeometryDescriptor, GeometryKind, GeometrySource};
