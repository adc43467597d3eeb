use serde::{Deserialize, Serialize};

/// Kind of remote music server.
///
/// Subsonic and Navidrome speak the Subsonic REST API (token ping auth);
/// Jellyfin uses a bearer session obtained from `authenticatebyname`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerType {
    Subsonic,
    Navidrome,
    Jellyfin,
}

impl ServerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerType::Subsonic => "subsonic",
            ServerType::Navidrome => "navidrome",
            ServerType::Jellyfin => "jellyfin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "subsonic" => Some(ServerType::Subsonic),
            "navidrome" => Some(ServerType::Navidrome),
            "jellyfin" => Some(ServerType::Jellyfin),
            _ => None,
        }
    }

    /// Whether this server is reached through the Subsonic REST API.
    pub fn is_subsonic_family(&self) -> bool {
        matches!(self, ServerType::Subsonic | ServerType::Navidrome)
    }
}

impl std::fmt::Display for ServerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
