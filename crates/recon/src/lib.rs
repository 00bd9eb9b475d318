//! `posture-recon` - desired-vs-observed standards compliance reconciliation.
//!
//! Pure engine crate: receives pre-fetched templates and tenant snapshots,
//! returns one comparison record per declared standard. No CLI or IO
//! dependencies.

pub mod catalog;
pub mod config;
pub mod desired;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod model;
pub mod observed;
pub mod reconcile;
pub mod value;

pub use catalog::Catalog;
pub use config::CompareConfig;
pub use engine::{build, compare};
pub use error::ReconError;
pub use model::{ComparisonRecord, ComparisonReport, ComplianceStatus, StandardId};
pub use value::Value;
