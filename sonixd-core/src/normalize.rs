//! Converts server-specific album lists into the shape the grid renders.

use crate::api::{jellyfin, subsonic, ClientAlbum, JellyfinAlbum, RawAlbumList};
use crate::server::ServerConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sonixd_common::ServerType;

/// Cover size requested for grid cards
const IMAGE_SIZE: u32 = 300;
const TICKS_PER_SECOND: u64 = 10_000_000;

/// Album as displayed by the grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedAlbum {
    pub id: String,
    pub name: String,
    pub album_artist: Option<String>,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub song_count: Option<u32>,
    pub duration_secs: Option<u32>,
    pub is_favorite: bool,
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub server_type: ServerType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedAlbumList {
    /// `None` when the response had no items collection
    pub items: Option<Vec<NormalizedAlbum>>,
    pub start_index: u32,
    pub total_record_count: Option<u32>,
}

pub fn normalize_album_list(raw: &RawAlbumList, server: &ServerConfig) -> NormalizedAlbumList {
    match raw {
        RawAlbumList::Subsonic(list) => NormalizedAlbumList {
            items: list
                .albums
                .as_ref()
                .map(|albums| albums.iter().map(|a| normalize_subsonic(a, server)).collect()),
            start_index: list.offset,
            // getAlbumList2 reports no total
            total_record_count: None,
        },
        RawAlbumList::Jellyfin(items) => NormalizedAlbumList {
            items: items
                .items
                .as_ref()
                .map(|albums| albums.iter().map(|a| normalize_jellyfin(a, server)).collect()),
            start_index: items.start_index,
            total_record_count: Some(items.total_record_count),
        },
    }
}

fn normalize_subsonic(album: &ClientAlbum, server: &ServerConfig) -> NormalizedAlbum {
    NormalizedAlbum {
        id: album.id.clone(),
        name: album.name.clone(),
        album_artist: album.artist.clone(),
        year: album.year,
        genres: album.genre.iter().cloned().collect(),
        song_count: Some(album.song_count),
        duration_secs: Some(album.duration),
        is_favorite: album.starred.is_some(),
        image_url: album.cover_art.as_deref().map(|id| {
            subsonic::cover_art_url(&server.url, &server.credential, id, IMAGE_SIZE)
        }),
        created_at: album.created.as_deref().and_then(parse_timestamp),
        server_type: server.server_type,
    }
}

fn normalize_jellyfin(album: &JellyfinAlbum, server: &ServerConfig) -> NormalizedAlbum {
    NormalizedAlbum {
        id: album.id.clone(),
        name: album.name.clone(),
        album_artist: album.album_artist.clone(),
        year: album.production_year,
        genres: album.genres.clone(),
        song_count: album.child_count,
        duration_secs: album
            .run_time_ticks
            .map(|ticks| (ticks / TICKS_PER_SECOND) as u32),
        is_favorite: album.user_data.as_ref().is_some_and(|u| u.is_favorite),
        image_url: jellyfin::image_url(
            &server.url,
            &album.id,
            album.image_tags.as_ref().and_then(|t| t.primary.as_deref()),
            IMAGE_SIZE,
        ),
        created_at: album.date_created.as_deref().and_then(parse_timestamp),
        server_type: server.server_type,
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
