//! Boundary consistency checks.
//!
//! Resolves feature geometry, pairs every two regions that exist at the same
//! time, and classifies how they touch.

mod classify;
mod contact;
mod driver;
mod geometry;
mod merge;
mod waiver;
pub mod wkt;

pub use classify::{Classifier, Finding, Subject, Verdict};
pub use contact::{boundary_contact, line_boundary, Contact};
pub use driver::{BoundaryChecker, CheckContext, CheckReport, Tally};
pub use geometry::{GeometryResolver, Shape};
pub use merge::{MergeChecker, MergeOutcome};
pub use waiver::{WaiverRegistry, WaiverSet};
