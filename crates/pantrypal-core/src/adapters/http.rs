// HTTP adapter - bridges PantryClient to the core's sync traits
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use pantrypal_api::{ApiError, ApiItem, PantryClient};

use crate::models::{Category, PantryItem};
use crate::sync::{ExpiryPredictor, SyncAdapter, SyncError};

/// Wrapper around `PantryClient` that implements the store-facing traits.
pub struct HttpSyncAdapter {
    client: Arc<PantryClient>,
}

impl HttpSyncAdapter {
    pub fn new(client: Arc<PantryClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SyncAdapter for HttpSyncAdapter {
    async fn create_remote(&self, owner: &str, item: &PantryItem) -> Result<(), SyncError> {
        self.client
            .add_item(owner, &item_to_wire(item))
            .await
            .map_err(api_to_sync)
    }

    async fn update_remote(&self, owner: &str, item: &PantryItem) -> Result<(), SyncError> {
        self.client
            .update_item(owner, &item_to_wire(item))
            .await
            .map_err(api_to_sync)
    }

    async fn delete_remote(&self, owner: &str, id: &str) -> Result<(), SyncError> {
        self.client.delete_item(owner, id).await.map_err(api_to_sync)
    }

    async fn fetch_all(&self, owner: &str) -> Result<Vec<PantryItem>, SyncError> {
        let wire = self.client.fetch_items(owner).await.map_err(api_to_sync)?;
        wire.into_iter().map(item_from_wire).collect()
    }
}

#[async_trait]
impl ExpiryPredictor for HttpSyncAdapter {
    async fn predict(
        &self,
        name: &str,
        category: Category,
        purchase_date: NaiveDate,
    ) -> Result<NaiveDate, SyncError> {
        let buy_date = purchase_date.format("%Y-%m-%d").to_string();
        let raw = self
            .client
            .predict_expiry(name, category.as_str(), &buy_date)
            .await
            .map_err(api_to_sync)?;

        NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
            SyncError::ServerRejected(format!("unparseable predicted expiry date: {}", raw))
        })
    }
}

/// Collapse transport failures into the store's error taxonomy.
fn api_to_sync(err: ApiError) -> SyncError {
    match err {
        ApiError::Unauthorized => SyncError::Unauthorized,
        ApiError::Network(_) => SyncError::NetworkUnavailable,
        other => SyncError::ServerRejected(other.to_string()),
    }
}

/// Convert a domain item to its wire shape.
fn item_to_wire(item: &PantryItem) -> ApiItem {
    ApiItem {
        id: item.id.clone(),
        name: item.name.clone(),
        quantity: item.quantity,
        unit: item.unit.as_str().to_string(),
        category: item.category.as_str().to_string(),
        expiry_date: item.expiry_date.to_string(),
        added_date: item.added_date.format("%Y-%m-%d").to_string(),
        notes: item.notes.clone(),
    }
}

/// Convert a wire item into the domain model, rejecting records the server
/// shouldn't have sent (unknown units, malformed dates).
fn item_from_wire(wire: ApiItem) -> Result<PantryItem, SyncError> {
    let malformed = |what: &str, raw: &str| {
        SyncError::ServerRejected(format!("malformed item field {}: {}", what, raw))
    };

    Ok(PantryItem {
        unit: wire.unit.parse().map_err(|_| malformed("unit", &wire.unit))?,
        category: wire
            .category
            .parse()
            .map_err(|_| malformed("category", &wire.category))?,
        expiry_date: wire
            .expiry_date
            .parse()
            .map_err(|_| malformed("expiryDate", &wire.expiry_date))?,
        added_date: NaiveDate::parse_from_str(&wire.added_date, "%Y-%m-%d")
            .map_err(|_| malformed("addedDate", &wire.added_date))?,
        id: wire.id,
        name: wire.name,
        quantity: wire.quantity,
        notes: wire.notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpiryDate, Unit};

    fn wire_item() -> ApiItem {
        ApiItem {
            id: "7".into(),
            name: "Butter".into(),
            quantity: 0.5,
            unit: "kg".into(),
            category: "dairy".into(),
            expiry_date: "2026-09-15".into(),
            added_date: "2026-08-20".into(),
            notes: None,
        }
    }

    #[test]
    fn wire_round_trip_preserves_the_item() {
        let item = item_from_wire(wire_item()).unwrap();
        assert_eq!(item.unit, Unit::Kg);
        assert_eq!(item.category, Category::Dairy);
        assert!(matches!(item.expiry_date, ExpiryDate::Date(_)));

        assert_eq!(item_to_wire(&item), wire_item());
    }

    #[test]
    fn unknown_unit_is_rejected() {
        let mut wire = wire_item();
        wire.unit = "barrels".into();
        assert!(matches!(
            item_from_wire(wire),
            Err(SyncError::ServerRejected(_))
        ));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let mut wire = wire_item();
        wire.added_date = "someday".into();
        assert!(matches!(
            item_from_wire(wire),
            Err(SyncError::ServerRejected(_))
        ));
    }

    #[test]
    fn auto_sentinel_survives_the_wire() {
        let mut wire = wire_item();
        wire.expiry_date = "Auto".into();
        let item = item_from_wire(wire).unwrap();
        assert_eq!(item.expiry_date, ExpiryDate::Auto);
        assert_eq!(item_to_wire(&item).expiry_date, "Auto");
    }

    #[test]
    fn api_errors_collapse_into_sync_errors() {
        assert_eq!(api_to_sync(ApiError::Unauthorized), SyncError::Unauthorized);
        assert!(matches!(
            api_to_sync(ApiError::RequestFailed {
                message: "boom".into(),
                status: 500,
            }),
            SyncError::ServerRejected(_)
        ));
    }
}
