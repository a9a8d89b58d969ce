pub mod net;

// Re-exports for convenience
pub use net::{default_http_client, FetchError, TitleEndpoint};
