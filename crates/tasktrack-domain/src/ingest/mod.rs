//! Tabular ingestion.
//!
//! Parsed rows flow through three stages: the normalizer reconciles header
//! names, the factory turns one row into a [`Task`](crate::Task), and the
//! batch processor runs a whole table with shared headers and project id.

pub mod batch;
pub mod factory;
pub mod normalizer;
pub mod raw;

pub use batch::{BatchProcessor, ImportBatch};
pub use factory::TaskFactory;
pub use normalizer::{canonical_headers, resolve_assignee, resolve_status};
pub use raw::RawRow;
