use thiserror::Error;

use crate::models::ValidationError;
use crate::sync::SyncError;

/// All the ways things can go wrong in PantryPal
///
/// We use thiserror here because it generates the boilerplate for us.
/// Nothing in this enum is fatal - every failure is scoped to the operation
/// that produced it.
#[derive(Error, Debug)]
pub enum Error {
    /// The item never made it into the store; no rollback was needed.
    #[error("invalid item: {0}")]
    Validation(#[from] ValidationError),

    /// The optimistic change was applied and has already been rolled back.
    #[error("sync failed: {0}")]
    Sync(#[from] SyncError),

    #[error("not a calendar date: {0}")]
    InvalidDate(String),

    #[error("no such item: {0}")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
