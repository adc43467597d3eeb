//! Per-view filter state.
//!
//! Each list view is identified by an opaque page key. Its filter is created
//! with defaults on first access and changed only through merge patches.

use crate::sort::AlbumListSort;
use serde::{Deserialize, Serialize};
use sonixd_common::{CardDisplayType, SortOrder};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Sort and filter criteria of an album list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumListFilter {
    pub sort_by: AlbumListSort,
    pub sort_order: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl Default for AlbumListFilter {
    fn default() -> Self {
        Self {
            sort_by: AlbumListSort::RecentlyAdded,
            sort_order: SortOrder::Desc,
            search_term: None,
            music_folder_id: None,
            genre: None,
            min_year: None,
            max_year: None,
            is_favorite: None,
        }
    }
}

impl AlbumListFilter {
    /// Overwrite the fields present in `patch`, leave the rest alone.
    pub fn apply(&mut self, patch: &FilterPatch) {
        if let Some(sort_by) = patch.sort_by {
            self.sort_by = sort_by;
        }
        if let Some(sort_order) = patch.sort_order {
            self.sort_order = sort_order;
        }
        if let Some(search_term) = &patch.search_term {
            self.search_term = search_term.clone();
        }
        if let Some(music_folder_id) = &patch.music_folder_id {
            self.music_folder_id = music_folder_id.clone();
        }
        if let Some(genre) = &patch.genre {
            self.genre = genre.clone();
        }
        if let Some(min_year) = patch.min_year {
            self.min_year = min_year;
        }
        if let Some(max_year) = patch.max_year {
            self.max_year = max_year;
        }
        if let Some(is_favorite) = patch.is_favorite {
            self.is_favorite = is_favorite;
        }
    }
}

/// Partial update of an [`AlbumListFilter`].
///
/// For optional facets the outer `Option` says whether the field is touched
/// and the inner one is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub sort_by: Option<AlbumListSort>,
    pub sort_order: Option<SortOrder>,
    pub search_term: Option<Option<String>>,
    pub music_folder_id: Option<Option<String>>,
    pub genre: Option<Option<String>>,
    pub min_year: Option<Option<u32>>,
    pub max_year: Option<Option<u32>>,
    pub is_favorite: Option<Option<bool>>,
}

impl FilterPatch {
    pub fn sort(sort_by: AlbumListSort, sort_order: SortOrder) -> Self {
        Self {
            sort_by: Some(sort_by),
            sort_order: Some(sort_order),
            ..Default::default()
        }
    }

    pub fn sort_order(sort_order: SortOrder) -> Self {
        Self {
            sort_order: Some(sort_order),
            ..Default::default()
        }
    }

    /// Empty terms clear the search.
    pub fn search_term(term: impl Into<String>) -> Self {
        let term = term.into();
        Self {
            search_term: Some((!term.is_empty()).then_some(term)),
            ..Default::default()
        }
    }

    pub fn music_folder(id: impl Into<String>) -> Self {
        Self {
            music_folder_id: Some(Some(id.into())),
            ..Default::default()
        }
    }

    pub fn genre(genre: Option<String>) -> Self {
        Self {
            genre: Some(genre),
            ..Default::default()
        }
    }

    pub fn min_year(year: Option<u32>) -> Self {
        Self {
            min_year: Some(year),
            ..Default::default()
        }
    }

    pub fn max_year(year: Option<u32>) -> Self {
        Self {
            max_year: Some(year),
            ..Default::default()
        }
    }

    pub fn favorite(is_favorite: Option<bool>) -> Self {
        Self {
            is_favorite: Some(is_favorite),
            ..Default::default()
        }
    }
}

/// Grid sizing of a list page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridState {
    /// Card size slider value (0..=100)
    pub size: u32,
}

impl Default for GridState {
    fn default() -> Self {
        Self { size: 50 }
    }
}

/// Everything a list page remembers between visits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPageState {
    pub filter: AlbumListFilter,
    pub display: CardDisplayType,
    pub grid: GridState,
}

/// Keyed store of list page state, shared by the controls of every list view.
#[derive(Debug, Default)]
pub struct ListStore {
    pages: Mutex<HashMap<String, ListPageState>>,
}

pub type SharedListStore = Arc<ListStore>;

impl ListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current filter of `page_key`, created with defaults if missing.
    pub fn get(&self, page_key: &str) -> AlbumListFilter {
        self.page(page_key).filter
    }

    /// Merge `patch` into the filter of `page_key` and return the result.
    pub fn merge(&self, page_key: &str, patch: &FilterPatch) -> AlbumListFilter {
        let mut pages = self.pages.lock().unwrap();
        let page = pages.entry(page_key.to_string()).or_default();
        page.filter.apply(patch);
        page.filter.clone()
    }

    pub fn page(&self, page_key: &str) -> ListPageState {
        let mut pages = self.pages.lock().unwrap();
        pages.entry(page_key.to_string()).or_default().clone()
    }

    pub fn set_display(&self, page_key: &str, display: CardDisplayType) {
        let mut pages = self.pages.lock().unwrap();
        pages.entry(page_key.to_string()).or_default().display = display;
    }

    pub fn set_grid_size(&self, page_key: &str, size: u32) {
        let mut pages = self.pages.lock().unwrap();
        pages.entry(page_key.to_string()).or_default().grid.size = size.min(100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_creates_default_state() {
        let store = ListStore::new();
        let filter = store.get("albums");
        assert_eq!(filter, AlbumListFilter::default());
        assert_eq!(filter.sort_by, AlbumListSort::RecentlyAdded);
        assert_eq!(filter.sort_order, SortOrder::Desc);
    }

    #[test]
    fn merge_overwrites_only_patched_fields() {
        let store = ListStore::new();
        store.merge("albums", &FilterPatch::genre(Some("Rock".into())));
        store.merge("albums", &FilterPatch::search_term("abbey"));

        let merged = store.merge("albums", &FilterPatch::sort_order(SortOrder::Asc));

        assert_eq!(merged.sort_order, SortOrder::Asc);
        assert_eq!(merged.genre.as_deref(), Some("Rock"));
        assert_eq!(merged.search_term.as_deref(), Some("abbey"));
        assert_eq!(merged.sort_by, AlbumListSort::RecentlyAdded);
        assert_eq!(store.get("albums"), merged);
    }

    #[test]
    fn merge_on_unseen_key_starts_from_defaults() {
        let store = ListStore::new();
        let merged = store.merge("fresh", &FilterPatch::min_year(Some(1990)));

        let expected = AlbumListFilter {
            min_year: Some(1990),
            ..Default::default()
        };
        assert_eq!(merged, expected);
    }

    #[test]
    fn inner_none_clears_a_facet() {
        let store = ListStore::new();
        store.merge("albums", &FilterPatch::favorite(Some(true)));
        let cleared = store.merge("albums", &FilterPatch::favorite(None));
        assert_eq!(cleared.is_favorite, None);
    }

    #[test]
    fn empty_search_term_clears_search() {
        assert_eq!(FilterPatch::search_term("").search_term, Some(None));
    }

    #[test]
    fn keys_are_independent() {
        let store = ListStore::new();
        store.merge("a", &FilterPatch::genre(Some("Jazz".into())));
        assert_eq!(store.get("b").genre, None);
    }

    #[test]
    fn store_does_not_enforce_genre_year_exclusivity() {
        let store = ListStore::new();
        store.merge("albums", &FilterPatch::genre(Some("Jazz".into())));
        let merged = store.merge("albums", &FilterPatch::min_year(Some(1970)));
        assert_eq!(merged.genre.as_deref(), Some("Jazz"));
        assert_eq!(merged.min_year, Some(1970));
    }

    #[test]
    fn page_state_tracks_display_and_grid_size() {
        let store = ListStore::new();
        store.set_display("albums", CardDisplayType::Card);
        store.set_grid_size("albums", 250);

        let page = store.page("albums");
        assert_eq!(page.display, CardDisplayType::Card);
        assert_eq!(page.grid.size, 100);
        assert_eq!(page.filter, AlbumListFilter::default());
    }
}
