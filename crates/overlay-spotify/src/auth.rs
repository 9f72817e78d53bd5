//! OAuth 2.0 authorization-code flow helpers.

use overlay_core::{Error, HttpError, Result};
use url::Url;

/// Accounts service host.
pub const ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";

/// Redirect registered in the Spotify developer dashboard.
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";

/// Scopes needed to read the playing item and control playback.
pub const DEFAULT_SCOPES: &[&str] = &[
    "user-read-currently-playing",
    "user-read-playback-state",
    "user-modify-playback-state",
];

/// Application credentials and redirect settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl AuthConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(ToString::to_string).collect(),
        }
    }

    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    /// Scopes as a single space-separated string.
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }
}

/// Build the URL the user opens to grant access.
pub fn authorize_url(config: &AuthConfig, state: &str) -> Result<Url> {
    authorize_url_with_base(ACCOUNTS_BASE_URL, config, state)
}

pub(crate) fn authorize_url_with_base(
    accounts_base: &str,
    config: &AuthConfig,
    state: &str,
) -> Result<Url> {
    let scope = config.scope();
    Url::parse_with_params(
        &format!("{accounts_base}/authorize"),
        &[
            ("response_type", "code"),
            ("client_id", config.client_id.as_str()),
            ("scope", scope.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("state", state),
        ],
    )
    .map_err(|e| Error::Http(HttpError::InvalidUrl(e.to_string())))
}
