//! Readiness aggregation: derived completion percentages over status maps.
//!
//! Every number produced here is recomputed from a status map on demand;
//! nothing is persisted. The same aggregation backs checklist cards,
//! evidence libraries, review queues, and section timeline phases.

pub mod aggregate;
pub mod rag;

pub use aggregate::Readiness;
pub use aggregate::compute_completion;
pub use aggregate::compute_completion_within;
pub use aggregate::compute_grouped_completion;
pub use rag::RagStatus;
pub use rag::Urgency;
