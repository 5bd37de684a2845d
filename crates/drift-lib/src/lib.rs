//! Namespace drift detection library
//!
//! This crate provides the core functionality for:
//! - Normalizing a namespace's workload resources into a snapshot
//! - Structural, exhaustive comparison of two snapshots
//! - Difference reporting
//! - Resource collection from Kubernetes clusters

pub mod builder;
pub mod collector;
pub mod compare;
pub mod error;
pub mod models;
pub mod observability;
pub mod report;

pub use builder::{build, RawResources, DEFAULT_CREDENTIAL_SECRET};
pub use compare::compare;
pub use error::CollectionError;
pub use models::*;
pub use observability::DriftLogger;
pub use report::{Category, DiffKind, DiffReport, DiffValue, Difference};
