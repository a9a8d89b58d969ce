mod api;
mod codec;
mod error;
mod maintenance;
mod redb_store;

pub use api::*;
pub use error::*;
pub use redb_store::RedbTitleStore;
