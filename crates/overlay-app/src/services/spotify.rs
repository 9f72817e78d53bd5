//! Spotify session connecting the UI to the Web API.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dioxus::prelude::*;
use overlay_core::{Error, NowPlaying, OverlayText, PlaybackCommand, Result, Tokens};
use overlay_spotify::{AuthConfig, CallbackServer, SpotifyClient};
use overlay_store::{Config, TokenStore};
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::browser;
use crate::state::OverlayState;

/// How long the user has to finish authorizing in the browser.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

/// Owns the API client and the current tokens.
///
/// Only the session writes the tokens; the poller and the controls read
/// them through [`SpotifySession::access_token`].
#[derive(Clone)]
pub struct SpotifySession {
    client: SpotifyClient,
    store: Option<TokenStore>,
    tokens: Arc<RwLock<Option<Tokens>>>,
    /// Serializes refreshes so concurrent callers do not race the token endpoint.
    refresh_lock: Arc<tokio::sync::Mutex<()>>,
    poll_interval: Duration,
}

impl SpotifySession {
    /// Create a session from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let auth = AuthConfig::new(config.client_id.clone(), config.client_secret.clone())
            .with_redirect_uri(config.redirect_uri.clone());
        let client = SpotifyClient::new(auth)?;

        let store = match TokenStore::new() {
            Ok(store) => Some(store),
            Err(e) => {
                warn!("Tokens will not be persisted: {e}");
                None
            }
        };

        Ok(Self::with_parts(client, store)
            .with_poll_interval(Duration::from_secs(config.poll_interval_secs.max(1))))
    }

    pub fn with_parts(client: SpotifyClient, store: Option<TokenStore>) -> Self {
        Self {
            client,
            store,
            tokens: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(tokio::sync::Mutex::new(())),
            poll_interval: Duration::from_secs(2),
        }
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.read().is_some()
    }

    /// Reuse tokens saved by an earlier run.
    ///
    /// Stale or expired tokens are refreshed when possible. The saved file
    /// is only deleted when it is unreadable, cannot be refreshed, or the
    /// accounts service rejects the refresh token; other refresh failures
    /// keep the tokens so the next request tries again.
    /// Returns whether the session holds tokens afterwards.
    pub async fn restore(&self) -> bool {
        let Some(store) = &self.store else {
            return false;
        };

        let saved = match store.load() {
            Ok(Some(tokens)) => tokens,
            Ok(None) => return false,
            Err(e) => {
                warn!("Discarding unreadable tokens: {e}");
                discard_saved_tokens(store);
                return false;
            }
        };

        if saved.is_usable(Utc::now()) {
            info!("Using saved tokens");
            *self.tokens.write() = Some(saved);
            return true;
        }

        let Some(refresh_token) = saved.refresh_token.clone().filter(|t| !t.is_empty()) else {
            info!("Saved tokens are stale and cannot be refreshed");
            discard_saved_tokens(store);
            return false;
        };

        match self.client.refresh(&refresh_token).await {
            Ok(tokens) => {
                self.store_tokens(tokens);
                true
            }
            Err(Error::Auth(reason)) => {
                warn!("Saved refresh token was rejected: {reason}");
                discard_saved_tokens(store);
                false
            }
            Err(e) => {
                warn!("Failed to refresh saved tokens, will retry: {e}");
                *self.tokens.write() = Some(saved);
                true
            }
        }
    }

    /// Run the authorization-code flow through the browser.
    pub async fn login(&self) -> Result<()> {
        debug!("Starting authentication process");
        let state = Uuid::new_v4().simple().to_string();

        let server = CallbackServer::bind_redirect_uri(&self.client.auth().redirect_uri).await?;
        let url = self.client.authorize_url(&state)?;

        info!("Open this URL to authorize the overlay: {url}");
        if let Err(e) = browser::open(url.as_str()) {
            warn!("Could not open a browser: {e}");
        }

        let code = server.wait_for_code(state, LOGIN_TIMEOUT).await?;
        let tokens = self.client.exchange_code(&code).await?;
        self.store_tokens(tokens);

        info!("Successfully authenticated with Spotify");
        Ok(())
    }

    /// Current access token, refreshed first when it has expired.
    pub async fn access_token(&self) -> Result<String> {
        let current = self.tokens.read().clone();
        match current {
            Some(tokens) if !tokens.is_expired(Utc::now()) => Ok(tokens.access_token),
            Some(tokens) => self.refresh_tokens(&tokens.access_token).await,
            None => Err(Error::Auth("Not authenticated".to_string())),
        }
    }

    /// Replace `rejected` with a fresh access token.
    async fn refresh_tokens(&self, rejected: &str) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.tokens.read().clone();
        let Some(current) = current else {
            return Err(Error::Auth("Not authenticated".to_string()));
        };

        // Another caller may have refreshed while we waited for the lock
        if current.access_token != rejected && !current.is_expired(Utc::now()) {
            return Ok(current.access_token);
        }

        let refresh_token = current
            .refresh_token
            .ok_or_else(|| Error::Auth("No refresh token, please login again".to_string()))?;

        let tokens = self.client.refresh(&refresh_token).await?;
        let access_token = tokens.access_token.clone();
        self.store_tokens(tokens);
        Ok(access_token)
    }

    fn store_tokens(&self, tokens: Tokens) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&tokens) {
                error!("Error saving tokens: {e}");
            }
        }
        *self.tokens.write() = Some(tokens);
    }

    /// Fetch the currently playing item, refreshing the token once on 401.
    pub async fn now_playing(&self) -> Result<NowPlaying> {
        let token = self.access_token().await?;
        match self.client.currently_playing(&token).await {
            Err(e) if e.is_auth_error() => {
                debug!("Access token rejected, refreshing");
                let token = self.refresh_tokens(&token).await?;
                self.client.currently_playing(&token).await
            }
            other => other,
        }
    }

    /// Send a playback command, refreshing the token once on 401.
    pub async fn send_command(&self, command: PlaybackCommand) -> Result<()> {
        let token = self.access_token().await?;
        match self.client.send_command(&token, command).await {
            Err(e) if e.is_auth_error() => {
                debug!("Access token rejected, refreshing");
                let token = self.refresh_tokens(&token).await?;
                self.client.send_command(&token, command).await
            }
            other => other,
        }
    }
}

fn discard_saved_tokens(store: &TokenStore) {
    if let Err(e) = store.clear() {
        error!("Error removing saved tokens: {e}");
    }
}

/// Hook that logs in and keeps the overlay state in sync with Spotify.
/// This should be called in the App component.
pub fn use_now_playing_sync(session: SpotifySession, state: OverlayState) {
    let mut state = state;

    use_future(move || {
        let session = session.clone();
        async move {
            if session.restore().await {
                state.set_text(OverlayText::connected());
            } else {
                match session.login().await {
                    Ok(()) => state.set_text(OverlayText::connected()),
                    Err(e) => {
                        error!("Authentication failed: {e}");
                        state.apply_error(&e);
                    }
                }
            }
            state.authenticated.set(session.is_authenticated());

            loop {
                if *state.authenticated.peek() {
                    match session.now_playing().await {
                        Ok(now_playing) => state.apply_now_playing(&now_playing),
                        Err(e) => {
                            error!("Error updating track info: {e}");
                            state.apply_error(&e);
                        }
                    }
                }

                tokio::time::sleep(session.poll_interval()).await;
            }
        }
    });
}

/// Send a playback command and reflect the outcome in the overlay.
pub async fn run_command(session: SpotifySession, mut state: OverlayState, command: PlaybackCommand) {
    if !session.is_authenticated() {
        state.set_text(OverlayText::not_authenticated());
        return;
    }

    match session.send_command(command).await {
        Ok(()) => {
            if let Some(is_playing) = command.resulting_play_state() {
                state.is_playing.set(is_playing);
            }
        }
        Err(e) => {
            error!("Playback control failed: {e}");
            state.apply_control_error(&e);
        }
    }
}
