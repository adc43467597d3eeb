use super::FilterPipeline;
use crate::api::{sort_genres, ApiError, Genre, LibraryApi};
use crate::config::Config;
use crate::filter::{AlbumListFilter, FilterPatch};
use crate::query_cache::{QueryCache, QueryKey};
use crate::refresh::RefreshOutcome;
use crate::timing::Debouncer;
use std::sync::Arc;

/// Largest year the year inputs accept
const MAX_YEAR: u32 = 5000;

pub type GenreListCache = QueryCache<Vec<Genre>>;

/// Entry of the genre select
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreOption {
    pub label: String,
    pub value: String,
}

/// Favorite switch, year range and genre select of the Subsonic filter
/// drawer.
///
/// Genre and year range are mutually exclusive in the UI only; the store
/// happily holds both.
pub struct SubsonicAlbumFilters {
    pipeline: FilterPipeline,
    api: Arc<dyn LibraryApi>,
    genres: Arc<GenreListCache>,
    genre: Debouncer<Option<String>>,
    min_year: Debouncer<Option<u32>>,
    max_year: Debouncer<Option<u32>>,
}

fn debounced_patch<T, F>(
    pipeline: &FilterPipeline,
    wait: std::time::Duration,
    to_patch: F,
) -> Debouncer<T>
where
    T: Send + 'static,
    F: Fn(T) -> FilterPatch + Send + Sync + 'static,
{
    let pipeline = pipeline.clone();
    Debouncer::new(wait, move |value: T| {
        let pipeline = pipeline.clone();
        let patch = to_patch(value);
        async move {
            pipeline.apply(&patch).await;
        }
    })
}

impl SubsonicAlbumFilters {
    pub fn new(
        pipeline: FilterPipeline,
        api: Arc<dyn LibraryApi>,
        genres: Arc<GenreListCache>,
        config: &Config,
    ) -> Self {
        let genre = debounced_patch(&pipeline, config.genre_debounce(), FilterPatch::genre);
        let min_year = debounced_patch(&pipeline, config.year_debounce(), FilterPatch::min_year);
        let max_year = debounced_patch(&pipeline, config.year_debounce(), FilterPatch::max_year);
        Self {
            pipeline,
            api,
            genres,
            genre,
            min_year,
            max_year,
        }
    }

    pub fn filter(&self) -> AlbumListFilter {
        self.pipeline.filter()
    }

    /// Genre select entries sorted by name. Empty without a server.
    pub async fn genre_options(&self) -> Result<Vec<GenreOption>, ApiError> {
        let Some(server) = self.pipeline.server() else {
            return Ok(Vec::new());
        };

        let mut genres = self
            .genres
            .fetch_query(&QueryKey::genre_list(&server.id), || {
                self.api.get_genre_list(server)
            })
            .await?;
        sort_genres(&mut genres);

        Ok(genres
            .into_iter()
            .map(|g| GenreOption {
                label: g.name,
                value: g.id,
            })
            .collect())
    }

    /// Debounced. An empty value clears the genre.
    pub fn set_genre(&self, value: impl Into<String>) {
        let value = value.into();
        self.genre.call((!value.is_empty()).then_some(value));
    }

    /// Debounced. 0 clears the bound.
    pub fn set_min_year(&self, year: u32) {
        self.min_year.call(year_bound(year));
    }

    /// Debounced. 0 clears the bound.
    pub fn set_max_year(&self, year: u32) {
        self.max_year.call(year_bound(year));
    }

    /// Applied immediately. Switching off clears the facet rather than
    /// filtering for non-favorites.
    pub async fn set_favorite(&self, favorite: bool) -> Option<RefreshOutcome> {
        self.pipeline
            .apply(&FilterPatch::favorite(favorite.then_some(true)))
            .await
    }

    pub fn year_inputs_disabled(&self) -> bool {
        self.filter().genre.is_some()
    }

    pub fn genre_select_disabled(&self) -> bool {
        let filter = self.filter();
        filter.min_year.is_some() || filter.max_year.is_some()
    }
}

fn year_bound(year: u32) -> Option<u32> {
    (year != 0).then_some(year.min(MAX_YEAR))
}
