//! sonixd-core - list filtering, refresh and server login for the sonixd client
//!
//! Holds the per-view filter store, the sort catalogs for each server type,
//! the coordinator that reloads a virtualized grid after a filter change, the
//! header controls that drive it, and the credential validator used when a
//! server is added.

pub mod api;
pub mod config;
pub mod controls;
pub mod filter;
pub mod normalize;
pub mod query_cache;
pub mod refresh;
pub mod routes;
pub mod server;
pub mod sort;
pub mod timing;
pub mod validate;

pub use sonixd_common::{CardDisplayType, LibraryItem, ServerType, SortOrder};
