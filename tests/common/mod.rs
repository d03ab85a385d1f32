//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{create_test_catalog, test_config, MockApi, EXAMPLE_SHOW_TITLE};
//!
//! #[test]
//! fn test_enrich() {
//!     let api = MockApi::spawn();
//!     let (_dir, path) = create_test_catalog(serde_json::json!([
//!         { "id": "1", "title": EXAMPLE_SHOW_TITLE }
//!     ]));
//!     let config = test_config(&api.base_url);
//!     // ... run the pipeline against `path`
//! }
//! ```

mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{create_test_catalog, read_catalog, test_config};
pub use server::MockApi;
