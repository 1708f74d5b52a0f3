// HTTP client for the PantryPal backend
pub mod client;
pub mod retry;

// Re-export common types
pub use client::{
    ApiError, ApiItem, AuthRequest, PantryClient, ProfileUpdate, Recipe,
};
pub use retry::RetryConfig;
