pub mod review;
pub mod status;

// Re-export the types every downstream crate needs at the crate root.
pub use review::derive_section_review_state;
pub use status::ChecklistItemStatus;
pub use status::EvidenceStatus;
pub use status::ItemId;
pub use status::ItemKind;
pub use status::ReviewGateState;
pub use status::TaskStatus;
pub use status::TrackedStatus;
