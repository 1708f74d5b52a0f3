// Seams toward the remote collaborators - the store only ever talks to
// these traits, never to HTTP directly
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{Category, PantryItem};

#[cfg(test)]
use mockall::automock;

/// Failure surfaced by the remote side of a sync operation. The store
/// treats every variant the same way for rollback; the UI layer can still
/// pick the message apart for display.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("network unavailable")]
    NetworkUnavailable,

    #[error("server rejected the request: {0}")]
    ServerRejected(String),

    #[error("unauthorized")]
    Unauthorized,
}

/// Durable persistence for pantry items.
///
/// The item store applies mutations locally first and then calls one of
/// these; a failure drives the rollback of the optimistic change. Makes
/// testing easy too - the store's tests run against a mock of this.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SyncAdapter: Send + Sync {
    async fn create_remote(&self, owner: &str, item: &PantryItem) -> Result<(), SyncError>;
    async fn update_remote(&self, owner: &str, item: &PantryItem) -> Result<(), SyncError>;
    async fn delete_remote(&self, owner: &str, id: &str) -> Result<(), SyncError>;
    async fn fetch_all(&self, owner: &str) -> Result<Vec<PantryItem>, SyncError>;
}

/// Expiry-prediction collaborator: resolves the `Auto` sentinel into a
/// concrete date before an item is allowed to persist.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ExpiryPredictor: Send + Sync {
    async fn predict(
        &self,
        name: &str,
        category: Category,
        purchase_date: NaiveDate,
    ) -> Result<NaiveDate, SyncError>;
}
