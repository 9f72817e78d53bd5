//! Token endpoint: authorization code exchange and refresh.

use chrono::Utc;
use overlay_core::{Error, Result, Tokens};
use tracing::{debug, info};

use crate::types::{
    AuthorizationCodeRequest, RefreshTokenRequest, TokenErrorResponse, TokenResponse,
};
use crate::client::RetryPolicy;
use crate::SpotifyClient;

/// Lifetime assumed when Spotify omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

impl SpotifyClient {
    /// Exchange the code captured by the callback listener for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<Tokens> {
        let form = AuthorizationCodeRequest {
            grant_type: "authorization_code",
            code,
            redirect_uri: &self.auth.redirect_uri,
            client_id: &self.auth.client_id,
            client_secret: &self.auth.client_secret,
        };

        let tokens = self.request_tokens("token-exchange", &form).await?;
        info!("Exchanged authorization code for tokens");
        Ok(tokens)
    }

    /// Obtain a fresh access token.
    ///
    /// Spotify may or may not rotate the refresh token; the old one is kept
    /// when the response has none.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Tokens> {
        let form = RefreshTokenRequest {
            grant_type: "refresh_token",
            refresh_token,
            client_id: &self.auth.client_id,
            client_secret: &self.auth.client_secret,
        };

        let mut tokens = self.request_tokens("token-refresh", &form).await?;
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(refresh_token.to_string());
        }
        info!("Access token refreshed");
        Ok(tokens)
    }

    /// Authorization codes are single use, so the form is only resent when
    /// it never reached the accounts service.
    async fn request_tokens<T: serde::Serialize>(&self, label: &str, form: &T) -> Result<Tokens> {
        let url = self.accounts_url("api/token");
        let response = self
            .execute(label, RetryPolicy::ConnectOnly, |http| {
                http.post(&url).form(form)
            })
            .await?;

        if response.status.is_server_error() {
            return Err(Error::from_status(
                response.status.as_u16(),
                response.body.trim().to_string(),
            ));
        }
        if !response.status.is_success() {
            let message = serde_json::from_str::<TokenErrorResponse>(&response.body)
                .map(|e| e.error_description.unwrap_or(e.error))
                .unwrap_or_else(|_| format!("token endpoint returned {}", response.status));
            return Err(Error::Auth(message));
        }

        let parsed: TokenResponse =
            serde_json::from_str(&response.body).map_err(|e| Error::Parse(e.to_string()))?;
        debug!(
            "Token response: type={:?} scope={:?} expires_in={:?}",
            parsed.token_type, parsed.scope, parsed.expires_in
        );

        let access_token = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Auth("Token response has no access token".to_string()))?;

        Ok(Tokens::new(
            access_token,
            parsed.refresh_token.filter(|t| !t.is_empty()),
            parsed.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS),
            Utc::now(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::client::tests::{http_response, mock_server, test_client};
    use chrono::Utc;
    use overlay_core::Error;

    #[tokio::test]
    async fn test_exchange_code() {
        let body = r#"{"access_token": "acc", "token_type": "Bearer", "expires_in": 3600,
            "refresh_token": "ref", "scope": "user-read-currently-playing"}"#;
        let (addr, mut requests) = mock_server(vec![http_response("200 OK", "", body)]).await;

        let tokens = test_client(addr).exchange_code("the-code").await.unwrap();
        assert_eq!(tokens.access_token, "acc");
        assert_eq!(tokens.refresh_token.as_deref(), Some("ref"));
        assert!(tokens.is_usable(Utc::now()));

        let request = requests.recv().await.unwrap();
        assert_eq!(request.request_line, "POST /api/token HTTP/1.1");
        assert!(request.body.contains("grant_type=authorization_code"));
        assert!(request.body.contains("code=the-code"));
        assert!(request.body.contains("client_id=client-id"));
        assert!(request
            .body
            .contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A8888%2Fcallback"));
    }

    #[tokio::test]
    async fn test_refresh_keeps_old_refresh_token() {
        let body = r#"{"access_token": "new-acc", "token_type": "Bearer", "expires_in": 3600}"#;
        let (addr, mut requests) = mock_server(vec![http_response("200 OK", "", body)]).await;

        let tokens = test_client(addr).refresh("old-ref").await.unwrap();
        assert_eq!(tokens.access_token, "new-acc");
        assert_eq!(tokens.refresh_token.as_deref(), Some("old-ref"));

        let request = requests.recv().await.unwrap();
        assert!(request.body.contains("grant_type=refresh_token"));
        assert!(request.body.contains("refresh_token=old-ref"));
    }

    #[tokio::test]
    async fn test_huge_expires_in_is_clamped() {
        let body = r#"{"access_token": "acc", "expires_in": 9223372036854775807}"#;
        let (addr, _requests) = mock_server(vec![http_response("200 OK", "", body)]).await;

        let before = Utc::now();
        let tokens = test_client(addr).exchange_code("c").await.unwrap();
        assert_eq!(tokens.access_token, "acc");
        assert!(tokens.expires_at <= before + chrono::TimeDelta::hours(25));
        assert!(tokens.is_usable(Utc::now()));
    }

    #[tokio::test]
    async fn test_token_errors() {
        let (addr, _requests) = mock_server(vec![
            http_response(
                "400 Bad Request",
                "",
                r#"{"error": "invalid_grant", "error_description": "Invalid authorization code"}"#,
            ),
            http_response("200 OK", "", r#"{"token_type": "Bearer"}"#),
        ])
        .await;
        let client = test_client(addr);

        match client.exchange_code("bad").await {
            Err(Error::Auth(msg)) => assert_eq!(msg, "Invalid authorization code"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            client.exchange_code("code").await,
            Err(Error::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_code_exchange_is_not_replayed() {
        let body = r#"{"access_token": "acc", "expires_in": 3600}"#;
        let (addr, mut requests) =
            mock_server(vec![String::new(), http_response("200 OK", "", body)]).await;

        let result = test_client(addr).exchange_code("single-use").await;
        assert!(matches!(result, Err(Error::Network(_))));

        assert!(requests.recv().await.is_some());
        assert!(requests.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_server_error_is_not_a_rejection() {
        let (addr, _requests) =
            mock_server(vec![http_response("503 Service Unavailable", "", "")]).await;

        match test_client(addr).refresh("ref").await {
            Err(Error::Api { status, .. }) => assert_eq!(status, 503),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
