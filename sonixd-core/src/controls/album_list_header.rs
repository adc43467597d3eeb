use super::FilterPipeline;
use crate::api::{ApiError, LibraryApi, MusicFolder};
use crate::config::Config;
use crate::filter::FilterPatch;
use crate::refresh::RefreshOutcome;
use crate::sort::{self, AlbumListSort, OrderDescriptor, SortDescriptor, ORDER_CATALOG};
use crate::timing::{Debouncer, Throttler};
use sonixd_common::{CardDisplayType, ServerType, SortOrder};
use std::sync::Arc;
use tracing::debug;

/// Sort, order, folder, view type, size slider and search box above the
/// album grid.
pub struct AlbumListHeader {
    pipeline: FilterPipeline,
    api: Arc<dyn LibraryApi>,
    search: Debouncer<String>,
    grid_size: Throttler<u32>,
}

impl AlbumListHeader {
    pub fn new(pipeline: FilterPipeline, api: Arc<dyn LibraryApi>, config: &Config) -> Self {
        let search_pipeline = pipeline.clone();
        let search = Debouncer::new(config.search_debounce(), move |term: String| {
            let pipeline = search_pipeline.clone();
            async move {
                pipeline.apply(&FilterPatch::search_term(term)).await;
            }
        });

        let store = pipeline.store().clone();
        let page_key = pipeline.page_key().to_string();
        let grid_size = Throttler::new(config.grid_size_throttle(), move |size: u32| {
            store.set_grid_size(&page_key, size);
        });

        Self {
            pipeline,
            api,
            search,
            grid_size,
        }
    }

    fn server_type(&self) -> Option<ServerType> {
        self.pipeline.server().map(|s| s.server_type)
    }

    /// Pick a sort together with its default order. Ignored when no server
    /// is selected.
    pub async fn set_sort_by(&self, value: AlbumListSort) -> Option<RefreshOutcome> {
        let Some(server_type) = self.server_type() else {
            debug!("Sort selection ignored, no server");
            return None;
        };
        let order = sort::default_order(server_type, value);
        self.pipeline.apply(&FilterPatch::sort(value, order)).await
    }

    pub async fn set_sort_order(&self, order: SortOrder) -> Option<RefreshOutcome> {
        self.pipeline.apply(&FilterPatch::sort_order(order)).await
    }

    pub async fn set_music_folder(&self, folder_id: impl Into<String>) -> Option<RefreshOutcome> {
        self.pipeline
            .apply(&FilterPatch::music_folder(folder_id))
            .await
    }

    pub fn set_view_type(&self, display: CardDisplayType) {
        self.pipeline
            .store()
            .set_display(self.pipeline.page_key(), display);
    }

    /// Debounced; an empty term clears the search.
    pub fn search(&self, term: impl Into<String>) {
        self.search.call(term.into());
    }

    /// Throttled write of the card size. Does not refetch.
    pub fn set_grid_size(&self, size: u32) {
        self.grid_size.call(size);
    }

    /// Label of the current sort for the sort button
    pub fn sort_by_label(&self) -> &'static str {
        sort::sort_by_label(self.server_type(), self.pipeline.filter().sort_by)
    }

    /// Empty when no server is selected
    pub fn sort_catalog(&self) -> &'static [SortDescriptor] {
        self.server_type().map(sort::sort_catalog).unwrap_or(&[])
    }

    pub fn order_catalog(&self) -> &'static [OrderDescriptor] {
        ORDER_CATALOG
    }

    /// The folder menu is only offered for Jellyfin.
    pub async fn music_folders(&self) -> Result<Vec<MusicFolder>, ApiError> {
        match self.pipeline.server() {
            Some(server) if server.server_type == ServerType::Jellyfin => {
                self.api.get_music_folders(server).await
            }
            _ => Ok(Vec::new()),
        }
    }
}
