//! Optimistic mutation coordination for tracked-item collections.
//!
//! The UI applies a status change locally the moment the user acts, then
//! persists it in the background. This crate owns the bookkeeping that
//! makes that safe: per-key rollback values, supersession of stale
//! requests, derived saving indicators, and keyed failure reporting.

pub mod controller;
pub mod error;

pub use controller::MutationController;
pub use error::PersistFailure;
