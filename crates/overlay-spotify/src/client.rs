//! Spotify HTTP client implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use overlay_core::{Error, HttpError, Result};
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER};
use reqwest::{RequestBuilder, StatusCode};
use tracing::{debug, warn};

use crate::auth::{AuthConfig, ACCOUNTS_BASE_URL};

const API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Connect and response timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of attempts for failed requests.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const BASE_RETRY_DELAY_MS: u64 = 500;

/// Block used when Spotify rate limits without a `Retry-After` header.
const DEFAULT_RATE_LIMIT_BLOCK: Duration = Duration::from_secs(5);

/// Spotify Web API and accounts service client.
#[derive(Clone)]
pub struct SpotifyClient {
    /// HTTP client for making requests.
    http: reqwest::Client,
    /// Application credentials.
    pub(crate) auth: AuthConfig,
    pub(crate) api_base: String,
    pub(crate) accounts_base: String,
    /// Rate limiter state.
    rate_limit_state: Arc<RwLock<RateLimitState>>,
}

#[derive(Debug, Default)]
struct RateLimitState {
    /// Time when we can make requests again (if rate limited).
    blocked_until: Option<Instant>,
}

impl RateLimitState {
    fn is_blocked(&self) -> bool {
        self.blocked_until.is_some_and(|until| Instant::now() < until)
    }

    fn block_for(&mut self, duration: Duration) {
        self.blocked_until = Some(Instant::now() + duration);
    }

    fn remaining_secs(&self) -> Option<u64> {
        self.blocked_until
            .map(|until| until.saturating_duration_since(Instant::now()).as_secs())
    }
}

/// When a failed request may be sent again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RetryPolicy {
    /// Resend after any retryable failure.
    Idempotent,
    /// Resend only when the connection was never established.
    ConnectOnly,
}

impl RetryPolicy {
    const fn allows(self, error: &Error) -> bool {
        match self {
            Self::Idempotent => error.is_retryable(),
            Self::ConnectOnly => matches!(error, Error::Http(HttpError::ConnectionFailed(_))),
        }
    }
}

/// Status and body of a completed request.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl SpotifyClient {
    /// Create a new client for the given application credentials.
    pub fn new(auth: AuthConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(DEFAULT_TIMEOUT)
            .timeout(DEFAULT_TIMEOUT)
            .pool_max_idle_per_host(4)
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            auth,
            api_base: API_BASE_URL.to_string(),
            accounts_base: ACCOUNTS_BASE_URL.to_string(),
            rate_limit_state: Arc::new(RwLock::new(RateLimitState::default())),
        })
    }

    /// Point the client at different hosts (used against local mock servers).
    #[must_use]
    pub fn with_base_urls(
        mut self,
        api_base: impl Into<String>,
        accounts_base: impl Into<String>,
    ) -> Self {
        self.api_base = api_base.into();
        self.accounts_base = accounts_base.into();
        self
    }

    pub const fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    /// Build the authorization URL for this client's credentials.
    pub fn authorize_url(&self, state: &str) -> Result<url::Url> {
        crate::auth::authorize_url_with_base(&self.accounts_base, &self.auth, state)
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    pub(crate) fn accounts_url(&self, path: &str) -> String {
        format!("{}/{}", self.accounts_base, path.trim_start_matches('/'))
    }

    /// Send a request, retrying transient failures the policy allows.
    ///
    /// Any HTTP status except 429 is returned to the caller; rate limiting
    /// blocks further requests until Spotify's `Retry-After` elapses.
    pub(crate) async fn execute<F>(
        &self,
        label: &str,
        policy: RetryPolicy,
        build: F,
    ) -> Result<RawResponse>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        {
            let state = self.rate_limit_state.read();
            if state.is_blocked() {
                return Err(Error::RateLimited {
                    retry_after_secs: state.remaining_secs(),
                });
            }
        }

        let mut last_error = None;
        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = Duration::from_millis(BASE_RETRY_DELAY_MS * 2u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
                debug!("Retry attempt {attempt} for {label} after {delay:?}");
            }

            match self.do_request(build(&self.http)).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!("Request {label} failed (attempt {attempt}): {e}");

                    if let Error::RateLimited { retry_after_secs } = &e {
                        let block = retry_after_secs
                            .map_or(DEFAULT_RATE_LIMIT_BLOCK, Duration::from_secs);
                        self.rate_limit_state.write().block_for(block);
                        return Err(e);
                    }

                    if !policy.allows(&e) {
                        return Err(e);
                    }

                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Network("Request failed".to_string())))
    }

    async fn do_request(&self, request: RequestBuilder) -> Result<RawResponse> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse().ok());

            return Err(Error::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response body: {e}")))?;

        Ok(RawResponse { status, body })
    }

    /// Whether requests are currently held back by rate limiting.
    pub fn is_rate_limited(&self) -> bool {
        self.rate_limit_state.read().is_blocked()
    }
}

fn map_transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Http(HttpError::Timeout)
    } else if e.is_connect() {
        Error::Http(HttpError::ConnectionFailed(e.to_string()))
    } else if e.is_builder() {
        Error::Http(HttpError::InvalidUrl(e.to_string()))
    } else {
        Error::Network(e.to_string())
    }
}
