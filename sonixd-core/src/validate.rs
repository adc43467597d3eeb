//! Server credential validation.
//!
//! Subsonic-family servers are checked with a ping carrying the auth token
//! in the query string (legacy plain password or salted md5). Jellyfin logs
//! in through `authenticatebyname` and hands back a session token.
//! Exactly one request is made per validation.

use crate::api::jellyfin::{AUTHORIZATION_HEADER, CLIENT_AUTHORIZATION};
use crate::api::subsonic::{generate_salt, legacy_token, rest_url, salted_token};
use crate::api::ApiError;
use crate::server::strip_trailing_slash;
use serde::{Deserialize, Serialize};
use sonixd_common::ServerType;
use tracing::{info, warn};

/// What the user typed into the add-server form
#[derive(Debug, Clone)]
pub struct ServerCredentials {
    pub url: String,
    pub username: String,
    pub password: String,
    pub server_type: ServerType,
    /// Send the password itself instead of a salted hash (Subsonic only)
    pub legacy_auth: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialOutcome {
    /// `token` is the query-string credential (Subsonic family) or the
    /// access token (Jellyfin). `user_id` is empty for Subsonic.
    Authenticated { token: String, user_id: String },
    /// Login failed with a message worth showing
    Rejected { message: String },
    /// The server answered with something unrecognizable
    Unknown,
}

impl CredentialOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, CredentialOutcome::Authenticated { .. })
    }
}

#[derive(Debug, Serialize)]
struct JellyfinLogin<'a> {
    pw: &'a str,
    username: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JellyfinAuthResponse {
    access_token: Option<String>,
    user: Option<JellyfinUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JellyfinUser {
    id: String,
}

/// Validate credentials against the server they point at.
pub async fn validate_server_credential(
    http: &reqwest::Client,
    credentials: &ServerCredentials,
) -> CredentialOutcome {
    let url = strip_trailing_slash(&credentials.url);

    let result = match credentials.server_type {
        ServerType::Subsonic | ServerType::Navidrome => ping_subsonic(http, url, credentials).await,
        ServerType::Jellyfin => login_jellyfin(http, url, credentials).await,
    };

    let outcome = result.unwrap_or_else(|e| CredentialOutcome::Rejected {
        message: e.to_string(),
    });

    match &outcome {
        CredentialOutcome::Authenticated { .. } => info!(
            "Validated {} credentials for {} at {}",
            credentials.server_type, credentials.username, url
        ),
        CredentialOutcome::Rejected { message } => {
            warn!("{} rejected login for {}: {}", url, credentials.username, message)
        }
        CredentialOutcome::Unknown => {
            warn!("{} returned an unrecognized login response", url)
        }
    }

    outcome
}

async fn ping_subsonic(
    http: &reqwest::Client,
    url: &str,
    credentials: &ServerCredentials,
) -> Result<CredentialOutcome, ApiError> {
    let token = if credentials.legacy_auth {
        legacy_token(&credentials.username, &credentials.password)
    } else {
        salted_token(&credentials.username, &credentials.password, &generate_salt())
    };

    let body: serde_json::Value = http
        .get(rest_url(url, "ping", &token))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(classify_ping(&body, token))
}

fn classify_ping(body: &serde_json::Value, token: String) -> CredentialOutcome {
    let Some(inner) = body.get("subsonic-response") else {
        return CredentialOutcome::Unknown;
    };

    if inner.get("status").and_then(|s| s.as_str()) == Some("failed") {
        let message = inner
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        return CredentialOutcome::Rejected { message };
    }

    CredentialOutcome::Authenticated {
        token,
        user_id: String::new(),
    }
}

async fn login_jellyfin(
    http: &reqwest::Client,
    url: &str,
    credentials: &ServerCredentials,
) -> Result<CredentialOutcome, ApiError> {
    let body: JellyfinAuthResponse = http
        .post(format!("{}/users/authenticatebyname", url))
        .header(AUTHORIZATION_HEADER, CLIENT_AUTHORIZATION)
        .json(&JellyfinLogin {
            pw: &credentials.password,
            username: &credentials.username,
        })
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(match (body.access_token, body.user) {
        (Some(token), Some(user)) => CredentialOutcome::Authenticated {
            token,
            user_id: user.id,
        },
        _ => CredentialOutcome::Unknown,
    })
}
