// The in-memory source of truth, with an optimistic-write/rollback
// discipline toward the sync adapter
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Category, ExpiryDate, PantryItem};
use crate::session::Session;
use crate::sync::{ExpiryPredictor, SyncAdapter};
use crate::{Error, Result};

/// Optional predicates for `ItemStore::list`. When both are set they are
/// AND-combined.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Case-insensitive substring match on the item name.
    pub name_contains: Option<String>,
    /// Exact category match.
    pub category: Option<Category>,
}

impl ListFilter {
    fn matches(&self, item: &PantryItem) -> bool {
        if let Some(needle) = &self.name_contains {
            if !item.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if item.category != category {
                return false;
            }
        }
        true
    }
}

/// Canonical in-session item set.
///
/// Every mutation is applied locally first and then pushed through the sync
/// adapter; a sync failure rolls the local change back exactly, so callers
/// always observe either the confirmed state or the optimistic state of
/// their own in-flight operation - never a half-applied one. Mutations
/// targeting the same item id are serialized through a per-id gate;
/// different ids run concurrently.
pub struct ItemStore {
    session: Session,
    adapter: Arc<dyn SyncAdapter>,
    predictor: Option<Arc<dyn ExpiryPredictor>>,
    items: Mutex<Vec<PantryItem>>,
    gates: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    refresh_seq: AtomicU64,
}

impl ItemStore {
    pub fn new(session: Session, adapter: Arc<dyn SyncAdapter>) -> Self {
        Self {
            session,
            adapter,
            predictor: None,
            items: Mutex::new(Vec::new()),
            gates: Mutex::new(HashMap::new()),
            refresh_seq: AtomicU64::new(0),
        }
    }

    /// Attach the expiry-prediction collaborator. Without one, items whose
    /// expiry is still `Auto` fail validation instead of being persisted
    /// unresolved.
    pub fn with_predictor(mut self, predictor: Arc<dyn ExpiryPredictor>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn owner_id(&self) -> &str {
        self.session.owner_id()
    }

    /// Add a new item: assign an id if it has none, resolve an `Auto`
    /// expiry through the predictor, validate, apply optimistically, then
    /// persist. Returns the item as stored (id and expiry resolved).
    pub async fn add(&self, mut item: PantryItem) -> Result<PantryItem> {
        if item.id.is_empty() {
            item.id = Uuid::new_v4().to_string();
        }
        self.resolve_expiry(&mut item).await?;
        item.validate()?;

        let gate = self.gate_for(&item.id).await;
        let result = {
            let _serialized = gate.lock().await;
            self.add_inner(item).await
        };
        self.drop_idle_gate(&gate).await;
        result
    }

    async fn add_inner(&self, item: PantryItem) -> Result<PantryItem> {
        {
            let mut items = self.items.lock().await;
            items.push(item.clone());
        }

        if let Err(err) = self.adapter.create_remote(self.owner_id(), &item).await {
            warn!("create failed for {}, rolling back: {}", item.id, err);
            let mut items = self.items.lock().await;
            items.retain(|i| i.id != item.id);
            return Err(err.into());
        }

        debug!("created {}", item.id);
        Ok(item)
    }

    /// Replace an existing item (full record, keyed by id). The prior value
    /// is held until the adapter confirms, and restored if it doesn't.
    pub async fn update(&self, mut item: PantryItem) -> Result<()> {
        self.resolve_expiry(&mut item).await?;
        item.validate()?;

        let gate = self.gate_for(&item.id).await;
        let result = {
            let _serialized = gate.lock().await;
            self.update_inner(item).await
        };
        self.drop_idle_gate(&gate).await;
        result
    }

    async fn update_inner(&self, item: PantryItem) -> Result<()> {
        let prior = {
            let mut items = self.items.lock().await;
            let slot = items
                .iter_mut()
                .find(|i| i.id == item.id)
                .ok_or_else(|| Error::NotFound(item.id.clone()))?;
            std::mem::replace(slot, item.clone())
        };

        if let Err(err) = self.adapter.update_remote(self.owner_id(), &item).await {
            warn!("update failed for {}, restoring prior value: {}", item.id, err);
            let mut items = self.items.lock().await;
            if let Some(slot) = items.iter_mut().find(|i| i.id == item.id) {
                *slot = prior;
            }
            return Err(err.into());
        }

        debug!("updated {}", item.id);
        Ok(())
    }

    /// Remove an item by id. On sync failure the item returns to its prior
    /// position, so list order is preserved exactly.
    pub async fn remove(&self, id: &str) -> Result<PantryItem> {
        let gate = self.gate_for(id).await;
        let result = {
            let _serialized = gate.lock().await;
            self.remove_inner(id).await
        };
        self.drop_idle_gate(&gate).await;
        result
    }

    async fn remove_inner(&self, id: &str) -> Result<PantryItem> {
        let (position, removed) = {
            let mut items = self.items.lock().await;
            let position = items
                .iter()
                .position(|i| i.id == id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            (position, items.remove(position))
        };

        if let Err(err) = self.adapter.delete_remote(self.owner_id(), id).await {
            warn!("delete failed for {}, re-inserting: {}", id, err);
            let mut items = self.items.lock().await;
            let position = position.min(items.len());
            items.insert(position, removed);
            return Err(err.into());
        }

        debug!("removed {}", id);
        Ok(removed)
    }

    /// Current items, optionally filtered. Order is insertion order, as the
    /// backend returned or the session created them.
    pub async fn list(&self, filter: Option<&ListFilter>) -> Vec<PantryItem> {
        let items = self.items.lock().await;
        match filter {
            None => items.clone(),
            Some(f) => items.iter().filter(|i| f.matches(i)).cloned().collect(),
        }
    }

    /// Replace the local set with the remote one. Last-request-wins: when a
    /// newer refresh was issued while this one was in flight, the stale
    /// response is discarded. Returns whether the response was applied.
    pub async fn refresh(&self) -> Result<bool> {
        let ticket = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let fetched = self.adapter.fetch_all(self.owner_id()).await?;

        // The ticket check and the write must be one step: holding the items
        // lock keeps a newer refresh from landing in between.
        let mut items = self.items.lock().await;
        if self.refresh_seq.load(Ordering::SeqCst) != ticket {
            debug!("discarding stale refresh response (ticket {})", ticket);
            return Ok(false);
        }
        *items = fetched;
        Ok(true)
    }

    /// Resolve the `Auto` sentinel before anything touches local state.
    /// Prediction failures surface as sync errors but need no rollback -
    /// nothing has been applied yet.
    async fn resolve_expiry(&self, item: &mut PantryItem) -> Result<()> {
        if item.expiry_date != ExpiryDate::Auto {
            return Ok(());
        }
        let Some(predictor) = &self.predictor else {
            // validate() turns this into UnresolvedExpiry
            return Ok(());
        };
        let predicted = predictor
            .predict(&item.name, item.category, item.added_date)
            .await?;
        item.expiry_date = ExpiryDate::Date(predicted);
        Ok(())
    }

    /// Per-id gate so overlapping mutations on one item queue instead of
    /// clobbering each other's optimistic state.
    async fn gate_for(&self, id: &str) -> Arc<Mutex<()>> {
        let mut gates = self.gates.lock().await;
        gates
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop a gate nobody is waiting on; keeps the map from accumulating
    /// entries for deleted ids.
    async fn drop_idle_gate(&self, gate: &Arc<Mutex<()>>) {
        let mut gates = self.gates.lock().await;
        // Two strong refs mean: the map's copy plus ours.
        gates.retain(|_, g| !Arc::ptr_eq(g, gate) || Arc::strong_count(g) > 2);
    }
}
