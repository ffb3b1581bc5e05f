//! Failure currency shared between the controller and persistence callers.

use thiserror::Error;

/// Why a persistence attempt did not commit.
///
/// Every variant is recoverable: the controller rolls the affected key
/// back and stays usable. A cancelled request is deliberately absent —
/// supersession and teardown are not failures and produce no rollback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistFailure {
    #[error("persistence transport error: {0}")]
    Transport(String),

    #[error("persistence request timed out")]
    Timeout,

    #[error("persistence rejected: HTTP {status}")]
    Rejected { status: u16 },
}
