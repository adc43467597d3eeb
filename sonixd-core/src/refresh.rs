//! Reloads a virtualized album grid after a filter change.
//!
//! The grid's own refetch path can re-request pages with the filter it
//! captured before the change landed. Instead the coordinator resets the
//! grid, fetches page one with the new filter and pushes the items in
//! directly.

use crate::api::{AlbumListQuery, ApiError, LibraryApi, RawAlbumList};
use crate::filter::AlbumListFilter;
use crate::normalize::{normalize_album_list, NormalizedAlbum, NormalizedAlbumList};
use crate::query_cache::{QueryCache, QueryKey};
use crate::server::ServerConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const DEFAULT_PAGE_SIZE: u32 = 200;

pub type AlbumListCache = QueryCache<RawAlbumList>;

/// Imperative surface of the virtualized grid widget
pub trait GridHandle: Send + Sync {
    fn scroll_to(&self, offset: f64);
    fn reset_load_more_items_cache(&self);
    fn set_item_data(&self, items: Vec<NormalizedAlbum>);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The grid now shows `count` items for the new filter
    Applied { count: usize },
    /// Response had no items collection; grid left as is
    NoItems,
    /// A newer refresh started while this one was fetching
    Stale,
    Failed { message: String },
}

/// Refresh coordinator for one list view.
pub struct ListRefreshCoordinator {
    api: Arc<dyn LibraryApi>,
    cache: Arc<AlbumListCache>,
    page_size: u32,
    generation: AtomicU64,
    in_flight: Mutex<Option<CancellationToken>>,
}

impl ListRefreshCoordinator {
    pub fn new(api: Arc<dyn LibraryApi>, cache: Arc<AlbumListCache>, page_size: u32) -> Self {
        Self {
            api,
            cache,
            page_size,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetch and normalize one page through the query cache. Also backs the
    /// grid's lazy "load more" callback.
    pub async fn fetch_page(
        &self,
        server: &ServerConfig,
        skip: u32,
        take: u32,
        filter: &AlbumListFilter,
        cancel: CancellationToken,
    ) -> Result<NormalizedAlbumList, ApiError> {
        let query = AlbumListQuery::new(skip, take, filter.clone());
        let key = QueryKey::album_list(&server.id, &query);

        let raw = self
            .cache
            .fetch_query(&key, || self.api.get_album_list(server, &query, cancel))
            .await?;

        Ok(normalize_album_list(&raw, server))
    }

    /// Reset the grid and load page one for `filter`.
    ///
    /// Never fails: errors are logged and reported in the outcome. A refresh
    /// that is overtaken by a newer one cancels its fetch and leaves the grid
    /// to the newer refresh.
    pub async fn refresh(
        &self,
        server: &ServerConfig,
        filter: &AlbumListFilter,
        grid: &dyn GridHandle,
    ) -> RefreshOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();
        if let Some(previous) = self.in_flight.lock().unwrap().replace(cancel.clone()) {
            previous.cancel();
        }

        grid.scroll_to(0.0);
        grid.reset_load_more_items_cache();

        let result = self
            .fetch_page(server, 0, self.page_size, filter, cancel)
            .await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding refresh {} (superseded)", generation);
            return RefreshOutcome::Stale;
        }

        let list = match result {
            Ok(list) => list,
            Err(e) => {
                warn!("Album list refresh failed on {}: {}", server.name, e);
                return RefreshOutcome::Failed {
                    message: e.to_string(),
                };
            }
        };

        let Some(items) = list.items else {
            debug!("Album list response had no items, leaving grid untouched");
            return RefreshOutcome::NoItems;
        };

        let count = items.len();
        grid.set_item_data(items);
        RefreshOutcome::Applied { count }
    }
}
