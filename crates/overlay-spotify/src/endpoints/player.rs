//! Player endpoints: the currently playing item and remote control.

use overlay_core::{CommandMethod, Error, NowPlaying, PlaybackCommand, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tracing::debug;

use crate::client::RetryPolicy;
use crate::parser::{parse_api_error_message, parse_currently_playing};
use crate::SpotifyClient;

impl SpotifyClient {
    /// Get what the user is currently playing.
    ///
    /// Returns an idle snapshot when nothing is playing (HTTP 204).
    pub async fn currently_playing(&self, access_token: &str) -> Result<NowPlaying> {
        let url = self.api_url("me/player/currently-playing");

        let response = self
            .execute("currently-playing", RetryPolicy::Idempotent, |http| {
                http.get(&url).bearer_auth(access_token)
            })
            .await?;

        match response.status {
            StatusCode::OK if response.body.trim().is_empty() => Ok(NowPlaying::idle()),
            StatusCode::OK => parse_currently_playing(&response.body),
            StatusCode::NO_CONTENT => Ok(NowPlaying::idle()),
            status => Err(Error::from_status(
                status.as_u16(),
                parse_api_error_message(&response.body),
            )),
        }
    }

    /// Send a playback command to the active device.
    pub async fn send_command(&self, access_token: &str, command: PlaybackCommand) -> Result<()> {
        let url = self.api_url(&format!("me/player/{}", command.endpoint()));
        debug!("Sending {} command to Spotify API", command.endpoint());

        // Previous and next are not idempotent
        let policy = match command.method() {
            CommandMethod::Put => RetryPolicy::Idempotent,
            CommandMethod::Post => RetryPolicy::ConnectOnly,
        };

        let response = self
            .execute(command.endpoint(), policy, |http| {
                let request = match command.method() {
                    CommandMethod::Post => http.post(&url),
                    CommandMethod::Put => http.put(&url),
                };
                request
                    .bearer_auth(access_token)
                    .header(CONTENT_TYPE, "application/json")
                    .body("")
            })
            .await?;

        match response.status {
            StatusCode::OK | StatusCode::ACCEPTED | StatusCode::NO_CONTENT => {
                debug!("Command {} succeeded", command.endpoint());
                Ok(())
            }
            status => Err(Error::from_status(
                status.as_u16(),
                parse_api_error_message(&response.body),
            )),
        }
    }
}
