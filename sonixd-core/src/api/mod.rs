//! Remote library access for both server families.
//!
//! [`LibraryApi`] is the seam the refresh coordinator and the filter controls
//! call through. [`HttpLibraryApi`] dispatches to the Subsonic or Jellyfin
//! client depending on the server type.

pub mod jellyfin;
pub mod subsonic;

use crate::filter::AlbumListFilter;
use crate::server::ServerConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio_util::sync::CancellationToken;

pub use jellyfin::{JellyfinAlbum, JellyfinClient, JellyfinItems};
pub use subsonic::{ClientAlbum, SubsonicAlbumList, SubsonicClient};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server error (code {code}): {message}")]
    Server { code: u32, message: String },
    #[error("unexpected response format")]
    Parse,
    #[error("request cancelled")]
    Cancelled,
    #[error("failed to encode query: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
}

/// Page request for an album list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumListQuery {
    pub limit: u32,
    pub start_index: u32,
    #[serde(flatten)]
    pub filter: AlbumListFilter,
}

impl AlbumListQuery {
    pub fn new(start_index: u32, limit: u32, filter: AlbumListFilter) -> Self {
        Self {
            limit,
            start_index,
            filter,
        }
    }
}

/// Album list as the server returned it, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum RawAlbumList {
    Subsonic(SubsonicAlbumList),
    Jellyfin(JellyfinItems),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicFolder {
    pub id: String,
    pub name: String,
}

#[async_trait]
pub trait LibraryApi: Send + Sync {
    /// Fetch one page of albums. Resolves to [`ApiError::Cancelled`] once
    /// `cancel` fires.
    async fn get_album_list(
        &self,
        server: &ServerConfig,
        query: &AlbumListQuery,
        cancel: CancellationToken,
    ) -> Result<RawAlbumList, ApiError>;

    /// All genres, sorted by name.
    async fn get_genre_list(&self, server: &ServerConfig) -> Result<Vec<Genre>, ApiError>;

    async fn get_music_folders(&self, server: &ServerConfig) -> Result<Vec<MusicFolder>, ApiError>;
}

/// [`LibraryApi`] over HTTP
#[derive(Clone, Default)]
pub struct HttpLibraryApi {
    http: reqwest::Client,
}

impl HttpLibraryApi {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

async fn cancellable<T>(
    cancel: CancellationToken,
    fut: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(ApiError::Cancelled),
        result = fut => result,
    }
}

#[async_trait]
impl LibraryApi for HttpLibraryApi {
    async fn get_album_list(
        &self,
        server: &ServerConfig,
        query: &AlbumListQuery,
        cancel: CancellationToken,
    ) -> Result<RawAlbumList, ApiError> {
        if server.server_type.is_subsonic_family() {
            let client = SubsonicClient::for_server(self.http.clone(), server);
            cancellable(cancel, client.get_album_list(query))
                .await
                .map(RawAlbumList::Subsonic)
        } else {
            let client = JellyfinClient::for_server(self.http.clone(), server);
            cancellable(cancel, client.get_album_list(query))
                .await
                .map(RawAlbumList::Jellyfin)
        }
    }

    async fn get_genre_list(&self, server: &ServerConfig) -> Result<Vec<Genre>, ApiError> {
        let mut genres = if server.server_type.is_subsonic_family() {
            SubsonicClient::for_server(self.http.clone(), server)
                .get_genres()
                .await?
        } else {
            JellyfinClient::for_server(self.http.clone(), server)
                .get_genres()
                .await?
        };
        sort_genres(&mut genres);
        Ok(genres)
    }

    async fn get_music_folders(&self, server: &ServerConfig) -> Result<Vec<MusicFolder>, ApiError> {
        if server.server_type.is_subsonic_family() {
            SubsonicClient::for_server(self.http.clone(), server)
                .get_music_folders()
                .await
        } else {
            JellyfinClient::for_server(self.http.clone(), server)
                .get_music_folders()
                .await
        }
    }
}

/// Case-insensitive sort by name
pub fn sort_genres(genres: &mut [Genre]) {
    genres.sort_by_key(|g| g.name.to_lowercase());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::AlbumListSort;

    #[test]
    fn query_serializes_flat_and_deterministic() {
        let query = AlbumListQuery::new(
            0,
            200,
            AlbumListFilter {
                sort_by: AlbumListSort::Name,
                genre: Some("Rock".into()),
                ..Default::default()
            },
        );
        let json = serde_json::to_string(&query).unwrap();
        assert_eq!(
            json,
            r#"{"limit":200,"startIndex":0,"sortBy":"name","sortOrder":"DESC","genre":"Rock"}"#
        );
    }

    #[test]
    fn genres_sort_ignoring_case() {
        let mut genres = vec![
            Genre {
                id: "2".into(),
                name: "rock".into(),
            },
            Genre {
                id: "1".into(),
                name: "Ambient".into(),
            },
            Genre {
                id: "3".into(),
                name: "Jazz".into(),
            },
        ];
        sort_genres(&mut genres);
        let names: Vec<_> = genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Ambient", "Jazz", "rock"]);
    }

    #[tokio::test]
    async fn cancellable_stops_on_cancel() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result: Result<(), ApiError> = cancellable(cancel, std::future::pending()).await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }
}
