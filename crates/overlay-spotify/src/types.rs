//! Spotify-specific request and response structures.

use serde::{Deserialize, Serialize};

/// Raw response of `GET /v1/me/player/currently-playing`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCurrentlyPlaying {
    #[serde(default)]
    pub is_playing: bool,
    pub progress_ms: Option<u64>,
    pub currently_playing_type: Option<String>,
    pub item: Option<RawPlayingItem>,
}

/// A track or an episode.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayingItem {
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub artists: Vec<RawArtist>,
    pub album: Option<RawAlbum>,
    /// Present on episodes only.
    pub show: Option<RawShow>,
    /// Present on episodes only.
    #[serde(default)]
    pub images: Vec<RawImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAlbum {
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<RawImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawShow {
    pub name: String,
    #[serde(default)]
    pub images: Vec<RawImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawImage {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Error body returned by the Web API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub status: Option<u16>,
    pub message: Option<String>,
}

/// Form body for exchanging an authorization code.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationCodeRequest<'a> {
    pub grant_type: &'static str,
    pub code: &'a str,
    pub redirect_uri: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

/// Form body for refreshing an access token.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshTokenRequest<'a> {
    pub grant_type: &'static str,
    pub refresh_token: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

/// Successful token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

/// Error body returned by the accounts service.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    pub error_description: Option<String>,
}
