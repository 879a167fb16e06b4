//! Seamcheck - consistency checks for time-varying historical boundaries
//!
//! This library provides the boundary conflict engine shared by the
//! `check-boundaries` and `check-merges` binaries.

pub mod boundary;
pub mod config;
pub mod dates;
pub mod error;
pub mod loader;
pub mod models;

pub use boundary::{BoundaryChecker, CheckReport, MergeChecker};
pub use config::CheckConfig;
pub use error::{CheckError, CheckResult};
pub use models::{ConflictResult, Feature};
