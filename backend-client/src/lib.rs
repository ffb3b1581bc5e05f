//! Persistence endpoint abstraction and its HTTP implementation.
//!
//! The mutation controller and session layer talk to the server through
//! the [`PersistenceEndpoint`] trait: one call to persist a single item's
//! status, one call to seed a collection at page load. The concrete HTTP
//! shape lives entirely in [`HttpEndpoint`]; tests and previews swap in
//! in-process fakes.

mod http;

pub use http::HttpEndpoint;

use std::collections::HashMap;

use async_trait::async_trait;
use nasara_mutation::PersistFailure;
use nasara_protocol::ItemKind;
use thiserror::Error;

/// Failure loading a collection at session start.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("collection fetch transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("collection response has unexpected shape: {reason}")]
    MalformedResponse { reason: String },
}

/// The server boundary for tracked-item collections.
///
/// `persist` is idempotent-preferred on the server side: repeating a
/// successful call with the same status is a no-op. Implementations must
/// complete or fail within bounded time; callers additionally wrap calls
/// in an outer deadline.
#[async_trait]
pub trait PersistenceEndpoint: Send + Sync {
    /// Persist one item's new status (wire form).
    async fn persist(
        &self,
        kind: ItemKind,
        item_id: &str,
        status: &str,
    ) -> Result<(), PersistFailure>;

    /// Fetch the raw id-to-status map for one collection. Called once per
    /// session load; the session never polls.
    async fn fetch_collection(
        &self,
        kind: ItemKind,
        parent_id: &str,
    ) -> Result<HashMap<String, String>, FetchError>;
}
