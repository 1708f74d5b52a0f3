// Typed client for the PantryPal backend API
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::retry::{is_retryable_status, with_retry, RetryConfig};

const DEFAULT_API_BASE: &str = "http://localhost:5000";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API request failed: {message} (status {status})")]
    RequestFailed { message: String, status: u16 },

    #[error("authentication required")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether asking again could plausibly succeed. Transport failures and
    /// retryable statuses qualify; auth failures, missing resources, and
    /// other client errors do not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::RequestFailed { status, .. } => reqwest::StatusCode::from_u16(*status)
                .map(is_retryable_status)
                .unwrap_or(false),
            ApiError::Unauthorized | ApiError::NotFound(_) | ApiError::Parse(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Pantry item as it travels over the wire. The backend stores dates as
/// plain `YYYY-MM-DD` strings and uses the literal `"Auto"` as the
/// not-yet-predicted expiry sentinel, so everything here stays stringly
/// typed; `pantrypal-core` owns the conversion into real types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiItem {
    pub id: String,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: String,
    #[serde(rename = "expiryDate")]
    pub expiry_date: String,
    #[serde(rename = "addedDate")]
    pub added_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A suggested recipe built from the user's pantry contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub picture_link: String,
}

/// Credentials payload shared by login and signup.
#[derive(Debug, Clone, Serialize)]
pub struct AuthRequest {
    pub user_name: String,
    pub user_id: String,
    pub password: String,
}

/// Partial profile update; only the supplied fields change.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Deserialize)]
struct ItemsResponse {
    #[serde(default)]
    data: Vec<ApiItem>,
}

#[derive(Deserialize)]
struct PredictionResponse {
    predicted_expiry_date: String,
}

#[derive(Deserialize)]
struct NameResponse {
    name: String,
}

#[derive(Deserialize)]
struct RecipesResponse {
    #[serde(default)]
    recipes: Vec<Recipe>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct PantryClient {
    client: reqwest::Client,
    base_url: String,
    retry_config: RetryConfig,
}

impl PantryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("PantryPal/0.1.0"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            retry_config: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(base_url: impl Into<String>, retry_config: RetryConfig) -> Self {
        let mut client = Self::new(base_url);
        client.retry_config = retry_config;
        client
    }

    pub fn default_base_url() -> &'static str {
        DEFAULT_API_BASE
    }

    /// Fetch the full item set for an owner. Retried, since a repeated GET
    /// is harmless.
    pub async fn fetch_items(&self, owner: &str) -> Result<Vec<ApiItem>> {
        let url = format!(
            "{}/pantry/get-items?user_id={}",
            self.base_url,
            urlencoding::encode(owner)
        );

        with_retry(&self.retry_config, ApiError::is_retryable, || async {
            let response = self.client.get(&url).send().await?;
            let body: ItemsResponse = Self::check(response).await?.json().await?;
            Ok(body.data)
        })
        .await
    }

    /// Persist a new item. Sent exactly once - the item store owns the
    /// optimistic copy and rolls it back if this fails.
    pub async fn add_item(&self, owner: &str, item: &ApiItem) -> Result<()> {
        let url = format!(
            "{}/pantry/add-item?user_id={}",
            self.base_url,
            urlencoding::encode(owner)
        );
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "item": item }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Full-record replace, keyed by the item's id. Sent exactly once.
    pub async fn update_item(&self, owner: &str, item: &ApiItem) -> Result<()> {
        let url = format!(
            "{}/pantry/update-item?user_id={}",
            self.base_url,
            urlencoding::encode(owner)
        );
        let response = self
            .client
            .put(&url)
            .json(&serde_json::json!({ "item": item }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Delete an item by id. Sent exactly once.
    pub async fn delete_item(&self, owner: &str, id: &str) -> Result<()> {
        let url = format!(
            "{}/pantry/delete-item?user_id={}&id={}",
            self.base_url,
            urlencoding::encode(owner),
            urlencoding::encode(id)
        );
        let response = self.client.delete(&url).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Ask the prediction service for an expiry date given what the item is
    /// and when it was bought. Returns the date as a `YYYY-MM-DD` string.
    pub async fn predict_expiry(
        &self,
        name: &str,
        category: &str,
        buy_date: &str,
    ) -> Result<String> {
        let url = format!(
            "{}/prediction/predict?name={}&category={}&buy_date={}",
            self.base_url,
            urlencoding::encode(name),
            urlencoding::encode(category),
            urlencoding::encode(buy_date)
        );

        with_retry(&self.retry_config, ApiError::is_retryable, || async {
            let response = self.client.get(&url).send().await?;
            let body: PredictionResponse = Self::check(response).await?.json().await?;
            Ok(body.predicted_expiry_date)
        })
        .await
    }

    /// Display name for the profile page.
    pub async fn get_name(&self, owner: &str) -> Result<String> {
        let url = format!(
            "{}/others/get-name?user_id={}",
            self.base_url,
            urlencoding::encode(owner)
        );

        with_retry(&self.retry_config, ApiError::is_retryable, || async {
            let response = self.client.get(&url).send().await?;
            let body: NameResponse = Self::check(response).await?.json().await?;
            Ok(body.name)
        })
        .await
    }

    pub async fn update_profile(&self, owner: &str, update: &ProfileUpdate) -> Result<()> {
        let url = format!(
            "{}/others/update-profile?user_id={}",
            self.base_url,
            urlencoding::encode(owner)
        );
        let response = self.client.put(&url).json(update).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn delete_profile(&self, owner: &str) -> Result<()> {
        let url = format!(
            "{}/others/delete-profile?user_id={}",
            self.base_url,
            urlencoding::encode(owner)
        );
        let response = self.client.delete(&url).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Recipe suggestions derived from the owner's current pantry.
    pub async fn get_recipes(&self, owner: &str) -> Result<Vec<Recipe>> {
        let url = format!(
            "{}/recipe/get-recipes?user_id={}",
            self.base_url,
            urlencoding::encode(owner)
        );

        with_retry(&self.retry_config, ApiError::is_retryable, || async {
            let response = self.client.get(&url).send().await?;
            let body: RecipesResponse = Self::check(response).await?.json().await?;
            Ok(body.recipes)
        })
        .await
    }

    /// Authenticate an existing user. On success the caller keeps
    /// `auth.user_id` as the session owner key.
    pub async fn login(&self, auth: &AuthRequest) -> Result<()> {
        self.post_auth("login", auth).await
    }

    /// Register a new user.
    pub async fn signup(&self, auth: &AuthRequest) -> Result<()> {
        self.post_auth("signup", auth).await
    }

    async fn post_auth(&self, endpoint: &str, auth: &AuthRequest) -> Result<()> {
        let url = format!("{}/auth/{}", self.base_url, endpoint);
        let response = self.client.post(&url).json(auth).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Map HTTP-level failures to `ApiError`, pulling the server's `message`
    /// field out of JSON error bodies when it sends one.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        let url = response.url().path().to_string();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| "request failed".to_string());

        // Keep the status so callers can tell a 500 from a 400.
        Err(ApiError::RequestFailed {
            message,
            status: status.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> ApiItem {
        ApiItem {
            id: "42".into(),
            name: "Milk".into(),
            quantity: 1.0,
            unit: "l".into(),
            category: "dairy".into(),
            expiry_date: "2026-09-01".into(),
            added_date: "2026-08-25".into(),
            notes: Some("half fat".into()),
        }
    }

    #[test]
    fn item_serializes_with_camel_case_dates() {
        let json = serde_json::to_value(sample_item()).unwrap();
        assert_eq!(json["expiryDate"], "2026-09-01");
        assert_eq!(json["addedDate"], "2026-08-25");
        assert!(json.get("expiry_date").is_none());
    }

    #[test]
    fn item_without_notes_omits_the_field() {
        let mut item = sample_item();
        item.notes = None;
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("notes"));
    }

    #[test]
    fn items_response_tolerates_missing_data() {
        let body: ItemsResponse = serde_json::from_str("{}").unwrap();
        assert!(body.data.is_empty());

        let body: ItemsResponse =
            serde_json::from_str(r#"{"data":[{"id":"1","name":"Eggs","quantity":12,"unit":"pieces","category":"general","expiryDate":"Auto","addedDate":"2026-08-20"}]}"#)
                .unwrap();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0].expiry_date, "Auto");
        assert_eq!(body.data[0].notes, None);
    }

    #[test]
    fn recipes_response_tolerates_missing_recipes() {
        let body: RecipesResponse = serde_json::from_str("{}").unwrap();
        assert!(body.recipes.is_empty());

        let body: RecipesResponse = serde_json::from_str(
            r#"{"recipes":[{"title":"Omelette","steps":["beat eggs","fry"],"picture_link":"http://x/y.jpg"}]}"#,
        )
        .unwrap();
        assert_eq!(body.recipes[0].steps.len(), 2);
    }

    #[test]
    fn retryability_follows_the_status() {
        assert!(ApiError::RequestFailed {
            message: "boom".into(),
            status: 500,
        }
        .is_retryable());
        assert!(ApiError::RequestFailed {
            message: "slow down".into(),
            status: 429,
        }
        .is_retryable());

        assert!(!ApiError::RequestFailed {
            message: "bad payload".into(),
            status: 400,
        }
        .is_retryable());
        assert!(!ApiError::Unauthorized.is_retryable());
        assert!(!ApiError::NotFound("/pantry/get-items".into()).is_retryable());
    }

    #[tokio::test]
    async fn unauthorized_is_never_retried() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let config = RetryConfig {
            max_retries: 3,
            base_delay_ms: 5,
            max_delay_ms: 20,
        };
        let calls = AtomicU32::new(0);

        let result = with_retry(&config, ApiError::is_retryable, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(ApiError::Unauthorized)
        })
        .await;

        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn profile_update_serializes_only_changed_fields() {
        let update = ProfileUpdate {
            name: Some("Ada".into()),
            password: None,
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("name"));
        assert!(!json.contains("password"));
    }
}
