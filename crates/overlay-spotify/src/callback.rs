//! Local HTTP listener that captures the OAuth redirect.
//!
//! Spotify redirects the browser to the configured redirect URI with
//! either `?code=..&state=..` or `?error=..`. The listener answers the
//! browser with a short HTML page and hands the code back to the caller.

use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use overlay_core::{Error, Result};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use url::{Host, Url};

/// Path Spotify redirects to by default.
pub const CALLBACK_PATH: &str = "/callback";

const SUCCESS_PAGE: &str = "<html><body><h2>Spotify Overlay</h2>\
    <p>Authorization complete. You can close this window.</p></body></html>";

const FAILURE_PAGE: &str = "<html><body><h2>Spotify Overlay</h2>\
    <p>Authorization was not granted. You can close this window.</p></body></html>";

/// Query parameters of a redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Parse the query string of a redirect.
pub fn parse_callback_query(query: &str) -> CallbackParams {
    let mut params = CallbackParams::default();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let value = Some(value.into_owned()).filter(|v| !v.is_empty());
        match key.as_ref() {
            "code" => params.code = value,
            "state" => params.state = value,
            "error" => params.error = value,
            _ => {}
        }
    }
    params
}

/// Address and path the listener must serve for `redirect_uri`.
///
/// The URI has to be plain `http` on a loopback host; `localhost` binds
/// `127.0.0.1`.
pub fn listen_target(redirect_uri: &str) -> Result<(SocketAddr, String)> {
    let url = Url::parse(redirect_uri)
        .map_err(|e| Error::Config(format!("Invalid redirect URI {redirect_uri}: {e}")))?;

    if url.scheme() != "http" {
        return Err(Error::Config(format!(
            "Redirect URI {redirect_uri} must use http"
        )));
    }

    let ip = match url.host() {
        Some(Host::Ipv4(ip)) if ip.is_loopback() => IpAddr::V4(ip),
        Some(Host::Ipv6(ip)) if ip.is_loopback() => IpAddr::V6(ip),
        Some(Host::Domain(domain)) if domain.eq_ignore_ascii_case("localhost") => {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
        _ => {
            return Err(Error::Config(format!(
                "Redirect URI {redirect_uri} must point at this machine"
            )))
        }
    };
    let port = url.port_or_known_default().unwrap_or(80);

    Ok((SocketAddr::new(ip, port), url.path().to_string()))
}

/// One-shot listener for the authorization redirect.
pub struct CallbackServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    path: String,
}

impl CallbackServer {
    /// Bind the listener for the address and path of `redirect_uri`.
    pub async fn bind_redirect_uri(redirect_uri: &str) -> Result<Self> {
        let (addr, path) = listen_target(redirect_uri)?;
        Ok(Self::bind(addr).await?.with_path(path))
    }

    /// Bind the listener, serving [`CALLBACK_PATH`].
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            Error::Auth(format!("Failed to bind callback listener on {addr}: {e}"))
        })?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "Callback listener started");
        Ok(Self {
            listener,
            local_addr,
            path: CALLBACK_PATH.to_string(),
        })
    }

    /// Serve redirects on `path` instead of [`CALLBACK_PATH`].
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve redirects until one carries a code for `expected_state`.
    ///
    /// Redirects with a different state are answered with 400 and ignored.
    pub async fn wait_for_code(self, expected_state: String, timeout: Duration) -> Result<String> {
        let (tx, mut rx) = mpsc::channel::<Result<String>>(1);
        let expected = Arc::new(Expected {
            path: self.path.clone(),
            state: expected_state,
        });

        let serve = async {
            loop {
                tokio::select! {
                    result = self.listener.accept() => {
                        match result {
                            Ok((stream, peer_addr)) => {
                                debug!(peer = %peer_addr, "Accepted callback connection");
                                let tx = tx.clone();
                                let expected = expected.clone();
                                tokio::spawn(async move {
                                    let service = service_fn(move |req| {
                                        handle_request(req, expected.clone(), tx.clone())
                                    });
                                    if let Err(e) = http1::Builder::new()
                                        .serve_connection(TokioIo::new(stream), service)
                                        .await
                                    {
                                        error!(peer = %peer_addr, error = %e, "Error serving callback connection");
                                    }
                                });
                            }
                            Err(e) => {
                                error!(error = %e, "Error accepting callback connection");
                            }
                        }
                    }
                    outcome = rx.recv() => {
                        return outcome.unwrap_or(Err(Error::Cancelled));
                    }
                }
            }
        };

        let outcome = tokio::time::timeout(timeout, serve).await.map_err(|_| {
            warn!("Timed out waiting for the authorization redirect");
            Error::Cancelled
        })?;
        info!("Callback listener stopped");
        outcome
    }
}

/// What a redirect must carry to be accepted.
struct Expected {
    path: String,
    state: String,
}

async fn handle_request(
    req: Request<Incoming>,
    expected: Arc<Expected>,
    tx: mpsc::Sender<Result<String>>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    if req.uri().path() != expected.path {
        return Ok(html_response(StatusCode::NOT_FOUND, "Not found"));
    }
    if req.method() != Method::GET {
        return Ok(html_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"));
    }

    let params = parse_callback_query(req.uri().query().unwrap_or(""));

    if params.state.as_deref() != Some(expected.state.as_str()) {
        warn!("Ignoring callback with unexpected state");
        return Ok(html_response(StatusCode::BAD_REQUEST, "State mismatch"));
    }

    if let Some(reason) = params.error {
        warn!(reason = %reason, "Authorization denied");
        let _ = tx.try_send(Err(Error::Auth(reason)));
        return Ok(html_response(StatusCode::OK, FAILURE_PAGE));
    }

    match params.code {
        Some(code) => {
            debug!("Received authorization code");
            let _ = tx.try_send(Ok(code));
            Ok(html_response(StatusCode::OK, SUCCESS_PAGE))
        }
        None => Ok(html_response(StatusCode::BAD_REQUEST, "Missing code")),
    }
}

fn html_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_callback_query() {
        let params = parse_callback_query("code=AQB%2Fx-y&state=abc");
        assert_eq!(params.code.as_deref(), Some("AQB/x-y"));
        assert_eq!(params.state.as_deref(), Some("abc"));
        assert!(params.error.is_none());

        let params = parse_callback_query("error=access_denied&state=abc&extra=1");
        assert_eq!(params.error.as_deref(), Some("access_denied"));
        assert!(params.code.is_none());

        assert_eq!(parse_callback_query(""), CallbackParams::default());
        assert!(parse_callback_query("code=").code.is_none());
    }

    async fn start() -> (SocketAddr, tokio::task::JoinHandle<Result<String>>) {
        let server = CallbackServer::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let addr = server.local_addr();
        let handle = tokio::spawn(server.wait_for_code("xyz".to_string(), Duration::from_secs(10)));
        (addr, handle)
    }

    #[tokio::test]
    async fn test_captures_code() {
        let (addr, handle) = start().await;
        let http = reqwest::Client::new();

        let missing = http
            .get(format!("http://{addr}/favicon.ico"))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status(), 404);

        let forged = http
            .get(format!("http://{addr}/callback?code=evil&state=other"))
            .send()
            .await
            .unwrap();
        assert_eq!(forged.status(), 400);

        let ok = http
            .get(format!("http://{addr}/callback?code=good-code&state=xyz"))
            .send()
            .await
            .unwrap();
        assert_eq!(ok.status(), 200);
        assert!(ok.text().await.unwrap().contains("Authorization complete"));

        assert_eq!(handle.await.unwrap().unwrap(), "good-code");
    }

    #[tokio::test]
    async fn test_denied() {
        let (addr, handle) = start().await;

        let response = reqwest::get(format!("http://{addr}/callback?error=access_denied&state=xyz"))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        match handle.await.unwrap() {
            Err(Error::Auth(reason)) => assert_eq!(reason, "access_denied"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_listen_target() {
        let (addr, path) = listen_target("http://127.0.0.1:8888/callback").unwrap();
        assert_eq!(addr, "127.0.0.1:8888".parse().unwrap());
        assert_eq!(path, "/callback");

        let (addr, path) = listen_target("http://localhost:9000/auth/cb").unwrap();
        assert_eq!(addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(path, "/auth/cb");

        let (addr, path) = listen_target("http://[::1]/").unwrap();
        assert_eq!(addr, "[::1]:80".parse().unwrap());
        assert_eq!(path, "/");

        assert!(matches!(
            listen_target("https://127.0.0.1:8888/callback"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            listen_target("http://example.com/callback"),
            Err(Error::Config(_))
        ));
        assert!(matches!(listen_target("not a uri"), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_custom_redirect_path() {
        let server = CallbackServer::bind_redirect_uri("http://127.0.0.1:0/cb")
            .await
            .unwrap();
        assert_eq!(server.path(), "/cb");
        let addr = server.local_addr();
        let handle = tokio::spawn(server.wait_for_code("s".to_string(), Duration::from_secs(10)));
        let http = reqwest::Client::new();

        let default_path = http
            .get(format!("http://{addr}/callback?code=abc&state=s"))
            .send()
            .await
            .unwrap();
        assert_eq!(default_path.status(), 404);

        let ok = http
            .get(format!("http://{addr}/cb?code=abc&state=s"))
            .send()
            .await
            .unwrap();
        assert_eq!(ok.status(), 200);
        assert_eq!(handle.await.unwrap().unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = CallbackServer::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let result = server
            .wait_for_code("xyz".to_string(), Duration::from_millis(50))
            .await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
