use serde::{Deserialize, Serialize};
use sonixd_common::ServerType;

/// A server the user has logged into.
///
/// `credential` is whatever the validator returned: the Subsonic query-string
/// token (`u=..&s=..&t=..` or `u=..&p=..`) or the Jellyfin access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub id: String,
    pub name: String,
    pub url: String,
    pub server_type: ServerType,
    pub username: String,
    pub credential: String,
    /// Empty for Subsonic-family servers
    #[serde(default)]
    pub user_id: String,
}

impl ServerConfig {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        server_type: ServerType,
        username: impl Into<String>,
        credential: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            url: url.into(),
            server_type,
            username: username.into(),
            credential: credential.into(),
            user_id: user_id.into(),
        }
    }

    /// Server URL without a trailing slash
    pub fn base_url(&self) -> &str {
        strip_trailing_slash(&self.url)
    }
}

/// Remove at most one trailing `/`.
pub fn strip_trailing_slash(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}
