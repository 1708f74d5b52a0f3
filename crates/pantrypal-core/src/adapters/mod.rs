// Adapter implementations bridging the core traits to real transports
pub mod http;

pub use http::HttpSyncAdapter;
