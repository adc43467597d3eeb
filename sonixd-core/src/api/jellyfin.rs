//! Jellyfin REST client (albums, genres, library views).

use chrono::{Datelike, Utc};
use serde::Deserialize;
use tracing::debug;

use super::{AlbumListQuery, ApiError, Genre, MusicFolder};
use crate::server::ServerConfig;
use crate::sort::AlbumListSort;
use sonixd_common::SortOrder;

/// Header carrying the client identity on login
pub const AUTHORIZATION_HEADER: &str = "X-Emby-Authorization";
pub const CLIENT_AUTHORIZATION: &str =
    r#"MediaBrowser Client="Sonixd", Device="PC", DeviceId="Sonixd", Version="1.0.0-alpha1""#;
/// Header carrying the session token on every other request
pub const TOKEN_HEADER: &str = "X-MediaBrowser-Token";

const ALBUM_FIELDS: &str = "Genres,DateCreated,ChildCount,ParentId";
/// Earliest year an open "To year" range reaches back to
const YEAR_FLOOR: u32 = 1900;

pub struct JellyfinClient {
    server_url: String,
    token: String,
    user_id: String,
    http: reqwest::Client,
}

/// `/items` response
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct JellyfinItems {
    /// `None` when the response has no `Items` collection
    #[serde(default)]
    pub items: Option<Vec<JellyfinAlbum>>,
    #[serde(default)]
    pub total_record_count: u32,
    #[serde(default)]
    pub start_index: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct JellyfinAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub album_artist: Option<String>,
    #[serde(default)]
    pub production_year: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub child_count: Option<u32>,
    /// 100ns ticks
    #[serde(default)]
    pub run_time_ticks: Option<u64>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub user_data: Option<JellyfinUserData>,
    #[serde(default)]
    pub image_tags: Option<JellyfinImageTags>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct JellyfinUserData {
    #[serde(default)]
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct JellyfinImageTags {
    #[serde(default)]
    pub primary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NamedItem {
    id: String,
    name: String,
    #[serde(default)]
    collection_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NamedItems {
    #[serde(default)]
    items: Vec<NamedItem>,
}

impl JellyfinClient {
    pub fn new(server_url: &str, token: &str, user_id: &str, http: reqwest::Client) -> Self {
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            user_id: user_id.to_string(),
            http,
        }
    }

    pub fn for_server(http: reqwest::Client, server: &ServerConfig) -> Self {
        Self::new(&server.url, &server.credential, &server.user_id, http)
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.server_url, path);
        debug!("Jellyfin request: {} {:?}", url, params);
        let resp = self
            .http
            .get(&url)
            .header(TOKEN_HEADER, &self.token)
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    pub async fn get_album_list(&self, query: &AlbumListQuery) -> Result<JellyfinItems, ApiError> {
        let path = format!("/users/{}/items", self.user_id);
        self.get(&path, &album_list_params(query)).await
    }

    pub async fn get_genres(&self) -> Result<Vec<Genre>, ApiError> {
        let params = [
            ("UserId", self.user_id.clone()),
            ("SortBy", "SortName".to_string()),
            ("SortOrder", "Ascending".to_string()),
        ];
        let items: NamedItems = self.get("/musicgenres", &params).await?;
        Ok(items
            .items
            .into_iter()
            .map(|i| Genre {
                id: i.id,
                name: i.name,
            })
            .collect())
    }

    /// Library views whose collection type is music
    pub async fn get_music_folders(&self) -> Result<Vec<MusicFolder>, ApiError> {
        let path = format!("/users/{}/views", self.user_id);
        let items: NamedItems = self.get(&path, &[]).await?;
        Ok(items
            .items
            .into_iter()
            .filter(|i| i.collection_type.as_deref() == Some("music"))
            .map(|i| MusicFolder {
                id: i.id,
                name: i.name,
            })
            .collect())
    }
}

fn sort_by_param(sort: AlbumListSort) -> &'static str {
    match sort {
        AlbumListSort::AlbumArtist | AlbumListSort::Artist => "AlbumArtist,SortName",
        AlbumListSort::CommunityRating | AlbumListSort::Rating => "CommunityRating,SortName",
        AlbumListSort::CriticRating => "CriticRating,SortName",
        AlbumListSort::Duration => "Runtime,SortName",
        AlbumListSort::Favorited => "IsFavoriteOrLiked,SortName",
        AlbumListSort::Name => "SortName",
        AlbumListSort::PlayCount => "PlayCount,SortName",
        AlbumListSort::Random => "Random,SortName",
        AlbumListSort::RecentlyAdded => "DateCreated,SortName",
        AlbumListSort::RecentlyPlayed => "DatePlayed,SortName",
        AlbumListSort::ReleaseDate | AlbumListSort::Year => "ProductionYear,PremiereDate,SortName",
        AlbumListSort::SongCount => "ChildCount,SortName",
    }
}

pub(crate) fn album_list_params(query: &AlbumListQuery) -> Vec<(&'static str, String)> {
    let filter = &query.filter;
    let mut params = vec![
        ("IncludeItemTypes", "MusicAlbum".to_string()),
        ("Recursive", "true".to_string()),
        ("Fields", ALBUM_FIELDS.to_string()),
        ("ImageTypeLimit", "1".to_string()),
        ("StartIndex", query.start_index.to_string()),
        ("Limit", query.limit.to_string()),
        ("SortBy", sort_by_param(filter.sort_by).to_string()),
        (
            "SortOrder",
            match filter.sort_order {
                SortOrder::Asc => "Ascending",
                SortOrder::Desc => "Descending",
            }
            .to_string(),
        ),
    ];

    if let Some(term) = &filter.search_term {
        params.push(("SearchTerm", term.clone()));
    }
    if let Some(folder) = &filter.music_folder_id {
        params.push(("ParentId", folder.clone()));
    }
    if let Some(genre) = &filter.genre {
        params.push(("GenreIds", genre.clone()));
    }
    if filter.min_year.is_some() || filter.max_year.is_some() {
        let current_year = u32::try_from(Utc::now().year()).unwrap_or(YEAR_FLOOR);
        params.push((
            "Years",
            year_list(filter.min_year, filter.max_year, current_year),
        ));
    }
    if filter.is_favorite == Some(true) {
        params.push(("Filters", "IsFavorite".to_string()));
    }
    params
}

/// Comma list for `Years`. An open lower bound starts at [`YEAR_FLOOR`], an
/// open upper bound stops at `current_year`; the list is never empty.
pub(crate) fn year_list(min_year: Option<u32>, max_year: Option<u32>, current_year: u32) -> String {
    let min = min_year.unwrap_or_else(|| YEAR_FLOOR.min(max_year.unwrap_or(YEAR_FLOOR)));
    let max = max_year.unwrap_or_else(|| current_year.max(min));
    let (lo, hi) = (min.min(max), min.max(max));
    (lo..=hi)
        .map(|y| y.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Primary image URL of an item, if it has one.
pub(crate) fn image_url(server_url: &str, item_id: &str, tag: Option<&str>, size: u32) -> Option<String> {
    tag.map(|tag| {
        format!(
            "{}/items/{}/images/primary?fillHeight={size}&fillWidth={size}&quality=96&tag={}",
            server_url.trim_end_matches('/'),
            item_id,
            tag,
        )
    })
}
