//! Local anime catalog: record models and JSON file persistence.

mod models;
mod store;

pub use models::*;
pub use store::{CatalogError, CatalogStore, JsonCatalogStore, SavePhase};
