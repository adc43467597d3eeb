//! Header controls of the list views.
//!
//! A control turns user input into a [`FilterPatch`], merges it into the
//! shared [`ListStore`](crate::filter::ListStore) and asks the view's
//! coordinator to reload the grid. Text and number inputs go through a
//! [`Debouncer`](crate::timing::Debouncer) owned by the control, so dropping
//! the control (leaving the view) drops any pending reload with it.

pub mod album_list_header;
pub mod search_header;
pub mod subsonic_album_filters;

pub use album_list_header::AlbumListHeader;
pub use search_header::{search_page_key, SearchHeader};
pub use subsonic_album_filters::{GenreListCache, GenreOption, SubsonicAlbumFilters};

use crate::filter::{AlbumListFilter, FilterPatch, SharedListStore};
use crate::refresh::{GridHandle, ListRefreshCoordinator, RefreshOutcome};
use crate::server::ServerConfig;
use std::sync::Arc;
use tracing::debug;

/// Store, coordinator and grid of one list view, bound to its page key.
#[derive(Clone)]
pub struct FilterPipeline {
    page_key: Arc<str>,
    store: SharedListStore,
    coordinator: Arc<ListRefreshCoordinator>,
    grid: Arc<dyn GridHandle>,
    server: Option<ServerConfig>,
}

impl FilterPipeline {
    pub fn new(
        page_key: impl Into<Arc<str>>,
        store: SharedListStore,
        coordinator: Arc<ListRefreshCoordinator>,
        grid: Arc<dyn GridHandle>,
        server: Option<ServerConfig>,
    ) -> Self {
        Self {
            page_key: page_key.into(),
            store,
            coordinator,
            grid,
            server,
        }
    }

    pub fn page_key(&self) -> &str {
        &self.page_key
    }

    /// Currently selected server, if any
    pub fn server(&self) -> Option<&ServerConfig> {
        self.server.as_ref()
    }

    pub fn store(&self) -> &SharedListStore {
        &self.store
    }

    pub fn filter(&self) -> AlbumListFilter {
        self.store.get(&self.page_key)
    }

    /// Merge `patch` and reload the grid. The merge always happens; the
    /// reload needs a server and is skipped (returning `None`) without one.
    pub async fn apply(&self, patch: &FilterPatch) -> Option<RefreshOutcome> {
        let filter = self.store.merge(&self.page_key, patch);
        let Some(server) = &self.server else {
            debug!("No server selected, {} not refreshed", self.page_key);
            return None;
        };
        Some(
            self.coordinator
                .refresh(server, &filter, self.grid.as_ref())
                .await,
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::FilterPipeline;
    use crate::api::{
        AlbumListQuery, ApiError, ClientAlbum, Genre, LibraryApi, MusicFolder, RawAlbumList,
        SubsonicAlbumList,
    };
    use crate::filter::ListStore;
    use crate::normalize::NormalizedAlbum;
    use crate::refresh::{AlbumListCache, GridHandle, ListRefreshCoordinator, DEFAULT_PAGE_SIZE};
    use crate::server::ServerConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    /// Library with two albums, two genres and one folder
    #[derive(Default)]
    pub struct StubApi {
        album_calls: AtomicUsize,
        pub queries: Mutex<Vec<AlbumListQuery>>,
    }

    impl StubApi {
        pub fn album_calls(&self) -> usize {
            self.album_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LibraryApi for StubApi {
        async fn get_album_list(
            &self,
            _server: &ServerConfig,
            query: &AlbumListQuery,
            _cancel: CancellationToken,
        ) -> Result<RawAlbumList, ApiError> {
            self.album_calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.clone());
            let albums: Vec<ClientAlbum> = serde_json::from_value(serde_json::json!([
                { "id": "al-1", "name": "Abbey Road" },
                { "id": "al-2", "name": "Kind of Blue" }
            ]))
            .unwrap();
            Ok(RawAlbumList::Subsonic(SubsonicAlbumList {
                albums: Some(albums),
                offset: query.start_index,
            }))
        }

        async fn get_genre_list(&self, _server: &ServerConfig) -> Result<Vec<Genre>, ApiError> {
            Ok(vec![
                Genre {
                    id: "rock".into(),
                    name: "rock".into(),
                },
                Genre {
                    id: "Ambient".into(),
                    name: "Ambient".into(),
                },
            ])
        }

        async fn get_music_folders(
            &self,
            _server: &ServerConfig,
        ) -> Result<Vec<MusicFolder>, ApiError> {
            Ok(vec![MusicFolder {
                id: "lib-1".into(),
                name: "Music".into(),
            }])
        }
    }

    #[derive(Default)]
    pub struct RecordingGrid {
        scrolls: AtomicUsize,
        pub items: Mutex<Vec<Vec<NormalizedAlbum>>>,
    }

    impl RecordingGrid {
        pub fn scrolls(&self) -> usize {
            self.scrolls.load(Ordering::SeqCst)
        }
    }

    impl GridHandle for RecordingGrid {
        fn scroll_to(&self, _offset: f64) {
            self.scrolls.fetch_add(1, Ordering::SeqCst);
        }
        fn reset_load_more_items_cache(&self) {}
        fn set_item_data(&self, items: Vec<NormalizedAlbum>) {
            self.items.lock().unwrap().push(items);
        }
    }

    /// Pipeline with a fresh store and a cache that never serves stale pages
    pub fn pipeline(
        page_key: &str,
        api: Arc<StubApi>,
        grid: Arc<RecordingGrid>,
        server: Option<ServerConfig>,
    ) -> FilterPipeline {
        let coordinator = ListRefreshCoordinator::new(
            api,
            Arc::new(AlbumListCache::new(Duration::ZERO)),
            DEFAULT_PAGE_SIZE,
        );
        FilterPipeline::new(
            page_key,
            Arc::new(ListStore::new()),
            Arc::new(coordinator),
            grid,
            server,
        )
    }
}
