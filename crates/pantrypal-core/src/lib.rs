// Domain logic lives here - everything the pages used to re-implement inline
pub mod adapters;
pub mod alerts;
pub mod config;
pub mod error;
pub mod expiry;
pub mod models;
pub mod session;
pub mod store;
pub mod sync;

pub use alerts::build_alerts;
pub use config::Config;
pub use error::Error;
pub use expiry::{classify, classify_str, Classification, Severity};
pub use models::{AlertEntry, Category, ExpiryDate, PantryItem, Unit, ValidationError};
pub use session::Session;
pub use store::{ItemStore, ListFilter};
pub use sync::{ExpiryPredictor, SyncAdapter, SyncError};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
