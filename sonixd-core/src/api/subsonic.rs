use serde::Deserialize;
use tracing::debug;

use super::{AlbumListQuery, ApiError, Genre, MusicFolder};
use crate::server::ServerConfig;
use crate::sort::AlbumListSort;
use sonixd_common::SortOrder;

pub const API_VERSION: &str = "1.13.0";
pub const CLIENT_NAME: &str = "sonixd";

/// Year bounds used when only one side of a year range is set
const YEAR_FLOOR: u32 = 0;
const YEAR_CEILING: u32 = 5000;

/// A client for Subsonic-compatible APIs (Subsonic, Navidrome).
///
/// Authenticates with the query-string token the credential validator
/// produced, so no password is kept around.
pub struct SubsonicClient {
    server_url: String,
    auth_token: String,
    http: reqwest::Client,
}

// -- Response envelope types --

#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    #[serde(rename = "subsonic-response")]
    subsonic_response: ResponseInner,
}

#[derive(Debug, Deserialize)]
struct ResponseInner {
    status: String,
    #[serde(flatten)]
    data: serde_json::Value,
}

// -- Client-side data types --

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(rename = "artistId", default)]
    pub artist_id: Option<String>,
    #[serde(rename = "songCount", default)]
    pub song_count: u32,
    #[serde(default)]
    pub duration: u32,
    pub year: Option<i32>,
    pub genre: Option<String>,
    #[serde(rename = "coverArt")]
    pub cover_art: Option<String>,
    /// ISO 8601 timestamp, present when the album is starred
    #[serde(default)]
    pub starred: Option<String>,
    #[serde(rename = "playCount", default)]
    pub play_count: Option<u32>,
    #[serde(rename = "userRating", default)]
    pub user_rating: Option<u8>,
    #[serde(default)]
    pub created: Option<String>,
}

/// One page of a Subsonic album list.
///
/// `albums` is `None` when the response carried no list object at all.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsonicAlbumList {
    pub albums: Option<Vec<ClientAlbum>>,
    pub offset: u32,
}

#[derive(Debug, Deserialize)]
struct ClientGenre {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ClientMusicFolder {
    id: serde_json::Value,
    #[serde(default)]
    name: Option<String>,
}

impl SubsonicClient {
    pub fn new(server_url: &str, auth_token: &str, http: reqwest::Client) -> Self {
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.to_string(),
            http,
        }
    }

    pub fn for_server(http: reqwest::Client, server: &ServerConfig) -> Self {
        Self::new(&server.url, &server.credential, http)
    }

    /// Build a full URL with the protocol and auth query params.
    fn build_url(&self, endpoint: &str, extra_params: &[(&str, String)]) -> Result<String, ApiError> {
        let mut url = rest_url(&self.server_url, endpoint, &self.auth_token);
        if !extra_params.is_empty() {
            url.push('&');
            url.push_str(&serde_urlencoded::to_string(extra_params)?);
        }
        Ok(url)
    }

    /// Fetch a URL and parse the Subsonic response envelope, returning the inner data.
    async fn request(&self, url: &str) -> Result<serde_json::Value, ApiError> {
        debug!("Subsonic request: {}", redact_token(url));
        let resp = self.http.get(url).send().await?.error_for_status()?;
        let envelope: ResponseEnvelope = resp.json().await?;
        parse_envelope(envelope)
    }

    pub async fn get_album_list(&self, query: &AlbumListQuery) -> Result<SubsonicAlbumList, ApiError> {
        if let Some(term) = &query.filter.search_term {
            return self.search_albums(term, query).await;
        }

        let url = self.build_url("getAlbumList2", &album_list_params(query))?;
        let data = self.request(&url).await?;

        // getAlbumList2 answers under "albumList2", some servers use "albumList".
        // Servers may omit the "album" key entirely when the list is empty.
        let albums = match data.get("albumList2").or_else(|| data.get("albumList")) {
            Some(list) => Some(parse_albums(list.get("album"))?),
            None => None,
        };

        Ok(SubsonicAlbumList {
            albums,
            offset: query.start_index,
        })
    }

    async fn search_albums(
        &self,
        term: &str,
        query: &AlbumListQuery,
    ) -> Result<SubsonicAlbumList, ApiError> {
        let mut params = vec![
            ("query", term.to_string()),
            ("albumCount", query.limit.to_string()),
            ("albumOffset", query.start_index.to_string()),
            ("artistCount", "0".to_string()),
            ("songCount", "0".to_string()),
        ];
        if let Some(folder) = &query.filter.music_folder_id {
            params.push(("musicFolderId", folder.clone()));
        }

        let url = self.build_url("search3", &params)?;
        let data = self.request(&url).await?;

        let albums = match data.get("searchResult3") {
            Some(result) => Some(parse_albums(result.get("album"))?),
            None => None,
        };

        Ok(SubsonicAlbumList {
            albums,
            offset: query.start_index,
        })
    }

    pub async fn get_genres(&self) -> Result<Vec<Genre>, ApiError> {
        let url = self.build_url("getGenres", &[])?;
        let data = self.request(&url).await?;

        // Response: {"genres": {"genre": [{"value": "Rock", "songCount": 3, "albumCount": 1}]}}
        let Some(arr) = data
            .get("genres")
            .and_then(|g| g.get("genre"))
            .and_then(|g| g.as_array())
        else {
            return Ok(Vec::new());
        };

        arr.iter()
            .map(|v| {
                let genre: ClientGenre =
                    serde_json::from_value(v.clone()).map_err(|_| ApiError::Parse)?;
                Ok(Genre {
                    id: genre.value.clone(),
                    name: genre.value,
                })
            })
            .collect()
    }

    pub async fn get_music_folders(&self) -> Result<Vec<MusicFolder>, ApiError> {
        let url = self.build_url("getMusicFolders", &[])?;
        let data = self.request(&url).await?;

        let Some(arr) = data
            .get("musicFolders")
            .and_then(|f| f.get("musicFolder"))
            .and_then(|f| f.as_array())
        else {
            return Ok(Vec::new());
        };

        arr.iter()
            .map(|v| {
                let folder: ClientMusicFolder =
                    serde_json::from_value(v.clone()).map_err(|_| ApiError::Parse)?;
                // Ids are numbers on most servers, strings on Navidrome
                let id = match folder.id {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                Ok(MusicFolder {
                    name: folder.name.unwrap_or_else(|| id.clone()),
                    id,
                })
            })
            .collect()
    }

    /// Build a cover art URL. Does not make a network request.
    pub fn cover_art_url(&self, id: &str, size: u32) -> String {
        cover_art_url(&self.server_url, &self.auth_token, id, size)
    }
}

fn parse_envelope(envelope: ResponseEnvelope) -> Result<serde_json::Value, ApiError> {
    let inner = envelope.subsonic_response;

    if inner.status != "ok" {
        let error = inner.data.get("error");
        let code = error
            .and_then(|e| e.get("code"))
            .and_then(|c| c.as_u64())
            .unwrap_or(0) as u32;
        let message = error
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        return Err(ApiError::Server { code, message });
    }

    Ok(inner.data)
}

fn parse_albums(value: Option<&serde_json::Value>) -> Result<Vec<ClientAlbum>, ApiError> {
    match value.and_then(|a| a.as_array()) {
        Some(arr) => arr
            .iter()
            .map(|v| serde_json::from_value(v.clone()).map_err(|_| ApiError::Parse))
            .collect(),
        None => Ok(Vec::new()),
    }
}

/// `<server>/rest/<endpoint>.view?v=..&c=..&f=json&<token>`
pub(crate) fn rest_url(server_url: &str, endpoint: &str, auth_token: &str) -> String {
    format!(
        "{}/rest/{}.view?v={}&c={}&f=json&{}",
        server_url, endpoint, API_VERSION, CLIENT_NAME, auth_token
    )
}

pub(crate) fn cover_art_url(server_url: &str, auth_token: &str, id: &str, size: u32) -> String {
    let mut url = rest_url(server_url.trim_end_matches('/'), "getCoverArt", auth_token);
    url.push_str(&format!("&id={}&size={}", urlencoding::encode(id), size));
    url
}

/// `getAlbumList2` parameters for a filter.
///
/// Genre and year are separate list types on the Subsonic API, which is why
/// the filter controls never let both be set. Sorts the API cannot express
/// fall back to alphabetical by name.
pub(crate) fn album_list_params(query: &AlbumListQuery) -> Vec<(&'static str, String)> {
    let filter = &query.filter;
    let mut params = Vec::new();

    if let Some(genre) = &filter.genre {
        params.push(("type", "byGenre".to_string()));
        params.push(("genre", genre.clone()));
    } else if filter.min_year.is_some() || filter.max_year.is_some() {
        push_year_range(
            &mut params,
            filter.min_year.unwrap_or(YEAR_FLOOR),
            filter.max_year.unwrap_or(YEAR_CEILING),
            filter.sort_order,
        );
    } else if filter.is_favorite == Some(true) {
        params.push(("type", "starred".to_string()));
    } else {
        let list_type = match filter.sort_by {
            AlbumListSort::AlbumArtist | AlbumListSort::Artist => "alphabeticalByArtist",
            AlbumListSort::Name => "alphabeticalByName",
            AlbumListSort::PlayCount => "frequent",
            AlbumListSort::Random => "random",
            AlbumListSort::Rating | AlbumListSort::CommunityRating | AlbumListSort::CriticRating => {
                "highest"
            }
            AlbumListSort::RecentlyAdded => "newest",
            AlbumListSort::RecentlyPlayed => "recent",
            AlbumListSort::Favorited => "starred",
            AlbumListSort::Year | AlbumListSort::ReleaseDate => {
                push_year_range(&mut params, YEAR_FLOOR, YEAR_CEILING, filter.sort_order);
                ""
            }
            AlbumListSort::Duration | AlbumListSort::SongCount => {
                debug!(
                    "getAlbumList2 cannot sort by {}, using alphabeticalByName",
                    filter.sort_by.as_str()
                );
                "alphabeticalByName"
            }
        };
        if !list_type.is_empty() {
            params.push(("type", list_type.to_string()));
        }
    }

    params.push(("size", query.limit.to_string()));
    params.push(("offset", query.start_index.to_string()));
    if let Some(folder) = &filter.music_folder_id {
        params.push(("musicFolderId", folder.clone()));
    }
    params
}

/// byYear lists run from `fromYear` to `toYear`; swapping them reverses the order.
fn push_year_range(params: &mut Vec<(&'static str, String)>, min: u32, max: u32, order: SortOrder) {
    let (from, to) = match order {
        SortOrder::Asc => (min, max),
        SortOrder::Desc => (max, min),
    };
    params.push(("type", "byYear".to_string()));
    params.push(("fromYear", from.to_string()));
    params.push(("toYear", to.to_string()));
}

pub(crate) fn md5_hex(input: &str) -> String {
    use md5::Digest;
    let hash = md5::Md5::digest(input.as_bytes());
    hex::encode(hash)
}

/// Generate a random alphanumeric salt string.
pub(crate) fn generate_salt() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    (0..16)
        .map(|_| {
            let idx = rng.random_range(0..36u8);
            if idx < 10 {
                (b'0' + idx) as char
            } else {
                (b'a' + idx - 10) as char
            }
        })
        .collect()
}

/// `u=<user>&p=<password>`
pub(crate) fn legacy_token(username: &str, password: &str) -> String {
    format!(
        "u={}&p={}",
        urlencoding::encode(username),
        urlencoding::encode(password)
    )
}

/// `u=<user>&s=<salt>&t=md5(password + salt)`
pub(crate) fn salted_token(username: &str, password: &str, salt: &str) -> String {
    let hash = md5_hex(&format!("{}{}", password, salt));
    format!("u={}&s={}&t={}", urlencoding::encode(username), salt, hash)
}

/// Hide credentials when logging URLs.
fn redact_token(url: &str) -> String {
    url.split('&')
        .map(|part| match part.split_once('=') {
            Some(("p" | "t" | "s", _)) => format!("{}=***", &part[..1]),
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::AlbumListFilter;
    use std::collections::HashMap;

    fn client() -> SubsonicClient {
        SubsonicClient::new(
            "http://localhost:4533/",
            &salted_token("admin", "pass", "abc123"),
            reqwest::Client::new(),
        )
    }

    fn params_map(params: &[(&'static str, String)]) -> HashMap<&'static str, String> {
        params.iter().cloned().collect()
    }

    fn query(filter: AlbumListFilter) -> AlbumListQuery {
        AlbumListQuery::new(0, 200, filter)
    }

    #[test]
    fn build_url_has_correct_structure() {
        let url = client().build_url("ping", &[]).unwrap();

        assert!(url.starts_with("http://localhost:4533/rest/ping.view?"));
        assert!(url.contains("u=admin"));
        assert!(url.contains("v=1.13.0"));
        assert!(url.contains("c=sonixd"));
        assert!(url.contains("f=json"));
        assert!(url.contains("s=abc123"));
        assert!(url.contains(&format!("t={}", md5_hex("passabc123"))));
    }

    #[test]
    fn build_url_encodes_extra_params() {
        let url = client()
            .build_url("search3", &[("query", "hello world".to_string())])
            .unwrap();

        assert!(url.contains("query=hello+world"));
    }

    #[test]
    fn legacy_token_carries_plain_password() {
        assert_eq!(legacy_token("admin", "secret"), "u=admin&p=secret");
        assert_eq!(legacy_token("user name", "p&ss"), "u=user%20name&p=p%26ss");
    }

    #[test]
    fn salted_token_matches_md5_of_password_plus_salt() {
        let token = salted_token("admin", "secret", "s4lt");
        assert_eq!(token, format!("u=admin&s=s4lt&t={}", md5_hex("secrets4lt")));
    }

    #[test]
    fn generate_salt_is_16_chars_alphanumeric() {
        for _ in 0..10 {
            let salt = generate_salt();
            assert_eq!(salt.len(), 16);
            assert!(salt.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn redacts_credentials() {
        let url = rest_url("http://h", "ping", &salted_token("admin", "pw", "salt"));
        let redacted = redact_token(&url);
        assert!(redacted.contains("u=admin"));
        assert!(redacted.contains("t=***"));
        assert!(redacted.contains("s=***"));
        assert!(!redacted.contains(&md5_hex("pwsalt")));
    }

    #[test]
    fn cover_art_url_contains_id_and_size() {
        let url = client().cover_art_url("al-1", 300);
        assert!(url.starts_with("http://localhost:4533/rest/getCoverArt.view?"));
        assert!(url.contains("id=al-1"));
        assert!(url.contains("size=300"));
    }

    #[test]
    fn sort_maps_to_list_type() {
        let params = params_map(&album_list_params(&query(AlbumListFilter {
            sort_by: AlbumListSort::PlayCount,
            ..Default::default()
        })));
        assert_eq!(params["type"], "frequent");
        assert_eq!(params["size"], "200");
        assert_eq!(params["offset"], "0");
    }

    #[test]
    fn genre_wins_over_sort() {
        let params = params_map(&album_list_params(&query(AlbumListFilter {
            sort_by: AlbumListSort::Name,
            genre: Some("Jazz".into()),
            ..Default::default()
        })));
        assert_eq!(params["type"], "byGenre");
        assert_eq!(params["genre"], "Jazz");
    }

    #[test]
    fn descending_year_range_is_swapped() {
        let params = params_map(&album_list_params(&query(AlbumListFilter {
            min_year: Some(1990),
            max_year: Some(1999),
            sort_order: SortOrder::Desc,
            ..Default::default()
        })));
        assert_eq!(params["type"], "byYear");
        assert_eq!(params["fromYear"], "1999");
        assert_eq!(params["toYear"], "1990");
    }

    #[test]
    fn open_year_range_uses_bounds() {
        let params = params_map(&album_list_params(&query(AlbumListFilter {
            min_year: Some(2000),
            sort_order: SortOrder::Asc,
            ..Default::default()
        })));
        assert_eq!(params["fromYear"], "2000");
        assert_eq!(params["toYear"], "5000");
    }

    #[test]
    fn favorite_lists_starred() {
        let params = params_map(&album_list_params(&query(AlbumListFilter {
            is_favorite: Some(true),
            music_folder_id: Some("3".into()),
            ..Default::default()
        })));
        assert_eq!(params["type"], "starred");
        assert_eq!(params["musicFolderId"], "3");
    }

    #[test]
    fn unsupported_sort_falls_back_to_name() {
        let params = params_map(&album_list_params(&query(AlbumListFilter {
            sort_by: AlbumListSort::SongCount,
            ..Default::default()
        })));
        assert_eq!(params["type"], "alphabeticalByName");
    }

    // -- Response parsing tests --

    fn envelope(json: serde_json::Value) -> ResponseEnvelope {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn parse_error_response() {
        let err = parse_envelope(envelope(serde_json::json!({
            "subsonic-response": {
                "status": "failed",
                "version": "1.13.0",
                "error": { "code": 40, "message": "Wrong username or password" }
            }
        })))
        .unwrap_err();

        match err {
            ApiError::Server { code, message } => {
                assert_eq!(code, 40);
                assert_eq!(message, "Wrong username or password");
            }
            other => panic!("expected Server error, got {:?}", other),
        }
    }

    #[test]
    fn parse_album_list_response() {
        let data = parse_envelope(envelope(serde_json::json!({
            "subsonic-response": {
                "status": "ok",
                "version": "1.13.0",
                "albumList2": {
                    "album": [
                        {"id": "al1", "name": "Abbey Road", "songCount": 17, "duration": 2834, "starred": "2020-01-01T00:00:00Z"},
                        {"id": "al2", "name": "Let It Be", "songCount": 12, "duration": 2100}
                    ]
                }
            }
        })))
        .unwrap();

        let albums = parse_albums(data["albumList2"].get("album")).unwrap();
        assert_eq!(albums.len(), 2);
        assert_eq!(albums[0].name, "Abbey Road");
        assert!(albums[0].starred.is_some());
        assert_eq!(albums[1].starred, None);
    }

    #[test]
    fn missing_album_key_is_empty_list() {
        assert!(parse_albums(None).unwrap().is_empty());
    }
}
