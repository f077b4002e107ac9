use std::collections::TryReserveError;
use thiserror::Error;

/// Faults reported by checked map operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("key not found")]
    KeyNotFound,
    #[error("cursor is at the end of the map")]
    EndCursor,
    #[error("cursor no longer designates a live entry")]
    StaleCursor,
    #[error("bucket table allocation failed")]
    Alloc(#[from] TryReserveError),
}
