//! Workspace sessions: the composition layer a page holds in memory.
//!
//! A [`CollectionSession`] owns one collection's optimistic state for the
//! lifetime of a page: it seeds from the persistence endpoint, applies
//! status changes locally while persisting in the background, and derives
//! readiness numbers from whatever is currently displayed. Dropping or
//! shutting down the session cancels everything still in flight.

pub mod collection;
pub mod config;

pub use collection::CollectionSession;
pub use config::SessionConfig;
