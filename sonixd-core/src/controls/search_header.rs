use super::FilterPipeline;
use crate::config::Config;
use crate::filter::FilterPatch;
use crate::routes::generate_search_path;
use crate::timing::Debouncer;
use sonixd_common::LibraryItem;
use std::sync::{Arc, Mutex};

/// Store key of a search tab's list
pub fn search_page_key(item_type: LibraryItem) -> String {
    format!("search:{}", item_type.as_str())
}

/// Search box and tab bar of the search page.
pub struct SearchHeader {
    item_type: LibraryItem,
    query: Arc<Mutex<String>>,
    debouncer: Debouncer<String>,
}

impl SearchHeader {
    /// `pipeline` should be keyed by [`search_page_key`] of `item_type`.
    /// `initial_query` is the `query` parameter the page was opened with.
    pub fn new(
        item_type: LibraryItem,
        pipeline: FilterPipeline,
        initial_query: impl Into<String>,
        config: &Config,
    ) -> Self {
        let query = Arc::new(Mutex::new(initial_query.into()));
        let shared_query = query.clone();
        let debouncer = Debouncer::new(config.search_header_debounce(), move |term: String| {
            let pipeline = pipeline.clone();
            let query = shared_query.clone();
            async move {
                // Clearing the box keeps the last results
                if term.is_empty() {
                    return;
                }
                *query.lock().unwrap() = term.clone();
                pipeline.apply(&FilterPatch::search_term(term)).await;
            }
        });

        Self {
            item_type,
            query,
            debouncer,
        }
    }

    pub fn item_type(&self) -> LibraryItem {
        self.item_type
    }

    pub fn search(&self, term: impl Into<String>) {
        self.debouncer.call(term.into());
    }

    /// Value of the `query` parameter
    pub fn query(&self) -> String {
        self.query.lock().unwrap().clone()
    }

    /// Link of a tab, carrying the current query over.
    pub fn tab_path(&self, item_type: LibraryItem) -> String {
        let path = generate_search_path(item_type);
        let query = self.query();
        if query.is_empty() {
            return path;
        }
        format!("{}?query={}", path, urlencoding::encode(&query))
    }

    pub fn is_active_tab(&self, item_type: LibraryItem) -> bool {
        self.item_type == item_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::test_support::{pipeline, RecordingGrid, StubApi};
    use crate::server::ServerConfig;
    use sonixd_common::ServerType;
    use std::time::Duration;

    fn header(initial: &str) -> (SearchHeader, Arc<StubApi>, FilterPipeline) {
        let api = Arc::new(StubApi::default());
        let grid = Arc::new(RecordingGrid::default());
        let server = ServerConfig::new("nd", "http://nd", ServerType::Navidrome, "u", "t", "");
        let key = search_page_key(LibraryItem::Album);
        let pipeline = pipeline(&key, api.clone(), grid, Some(server));
        let header = SearchHeader::new(
            LibraryItem::Album,
            pipeline.clone(),
            initial,
            &Config::default(),
        );
        (header, api, pipeline)
    }

    #[tokio::test(start_paused = true)]
    async fn search_updates_query_and_refreshes_tab() {
        let (header, api, pipeline) = header("");

        header.search("miles");
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(header.query(), "miles");
        assert_eq!(pipeline.filter().search_term.as_deref(), Some("miles"));
        assert_eq!(pipeline.page_key(), "search:album");
        assert_eq!(api.album_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_term_is_ignored() {
        let (header, api, pipeline) = header("blue");

        header.search("");
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(header.query(), "blue");
        assert_eq!(pipeline.filter().search_term, None);
        assert_eq!(api.album_calls(), 0);
    }

    #[tokio::test]
    async fn tab_paths_carry_query() {
        let (with_query, _, _) = header("kind of blue");
        assert_eq!(
            with_query.tab_path(LibraryItem::Song),
            "/search/song?query=kind%20of%20blue"
        );
        assert!(with_query.is_active_tab(LibraryItem::Album));

        let (empty, _, _) = header("");
        assert_eq!(empty.tab_path(LibraryItem::AlbumArtist), "/search/albumArtist");
    }
}
