//! Response parsers for Spotify Web API responses.

use overlay_core::{AlbumImage, Duration, Error, NowPlaying, Position, Result, Track};

use crate::types::{ApiErrorResponse, RawCurrentlyPlaying, RawImage, RawPlayingItem};

/// Parse the body of a `currently-playing` response.
pub fn parse_currently_playing(body: &str) -> Result<NowPlaying> {
    let raw: RawCurrentlyPlaying =
        serde_json::from_str(body).map_err(|e| Error::Parse(e.to_string()))?;
    Ok(convert_currently_playing(raw))
}

pub fn convert_currently_playing(raw: RawCurrentlyPlaying) -> NowPlaying {
    let progress = Position::from_millis(raw.progress_ms.unwrap_or(0));

    match raw.item {
        Some(item) => NowPlaying::playing(convert_item(item), raw.is_playing, progress),
        // Ads and private sessions come back without an item
        None => NowPlaying {
            track: None,
            is_playing: raw.is_playing,
            progress,
        },
    }
}

fn convert_item(item: RawPlayingItem) -> Track {
    let is_episode = item.item_type.as_deref() == Some("episode");

    let (artists, album, images) = if is_episode {
        let show = item.show;
        let artists = show.as_ref().map(|s| vec![s.name.clone()]).unwrap_or_default();
        let images = if item.images.is_empty() {
            show.map(|s| s.images).unwrap_or_default()
        } else {
            item.images
        };
        (artists, None, images)
    } else {
        let artists = item.artists.into_iter().map(|a| a.name).collect();
        let (album, images) = item
            .album
            .map(|a| (a.name, a.images))
            .unwrap_or_default();
        (artists, album, images)
    };

    Track {
        id: item.id,
        title: item.name,
        artists,
        album,
        images: images.into_iter().map(convert_image).collect(),
        duration: Duration::from_millis(item.duration_ms.unwrap_or(0)),
    }
}

fn convert_image(image: RawImage) -> AlbumImage {
    AlbumImage::new(image.url, image.width, image.height)
}

/// Pull the human-readable message out of a Web API error body.
pub fn parse_api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(|r| r.error.message)
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PLAYING: &str = r#"{
        "timestamp": 1700000000000,
        "progress_ms": 42000,
        "is_playing": true,
        "currently_playing_type": "track",
        "item": {
            "id": "4uLU6hMCjMI75M1A2tKUQC",
            "name": "Never Gonna Give You Up",
            "type": "track",
            "duration_ms": 213573,
            "artists": [{"name": "Rick Astley"}, {"name": "Guest"}],
            "album": {
                "name": "Whenever You Need Somebody",
                "images": [
                    {"url": "https://i.scdn.co/image/large", "width": 640, "height": 640},
                    {"url": "https://i.scdn.co/image/small", "width": 64, "height": 64}
                ]
            }
        }
    }"#;

    #[test]
    fn test_parse_playing_track() {
        let np = parse_currently_playing(PLAYING).unwrap();
        assert!(np.is_playing);
        assert_eq!(np.progress.as_millis(), 42000);

        let track = np.track.unwrap();
        assert_eq!(track.title, "Never Gonna Give You Up");
        assert_eq!(track.artist_name(), "Rick Astley");
        assert_eq!(track.artists_display(), "Rick Astley, Guest");
        assert_eq!(track.album.as_deref(), Some("Whenever You Need Somebody"));
        assert_eq!(track.art_url(), Some("https://i.scdn.co/image/large"));
        assert_eq!(track.duration.format(), "3:33");
    }

    #[test]
    fn test_parse_paused_without_images() {
        let body = r#"{
            "is_playing": false,
            "item": {"name": "Local Song", "artists": [], "album": {"name": null, "images": []}}
        }"#;
        let np = parse_currently_playing(body).unwrap();
        assert!(!np.is_playing);
        let track = np.track.unwrap();
        assert_eq!(track.artist_name(), "");
        assert!(track.art_url().is_none());
        assert!(track.id.is_none());
    }

    #[test]
    fn test_parse_null_item() {
        let body = r#"{"is_playing": true, "currently_playing_type": "ad", "item": null}"#;
        let np = parse_currently_playing(body).unwrap();
        assert!(np.is_idle());
        assert!(np.is_playing);
    }

    #[test]
    fn test_parse_episode() {
        let body = r#"{
            "is_playing": true,
            "currently_playing_type": "episode",
            "item": {
                "id": "ep1",
                "name": "Episode 12",
                "type": "episode",
                "duration_ms": 3600000,
                "images": [],
                "show": {
                    "name": "The Podcast",
                    "images": [{"url": "https://i.scdn.co/image/show", "width": 300, "height": 300}]
                }
            }
        }"#;
        let track = parse_currently_playing(body).unwrap().track.unwrap();
        assert_eq!(track.artist_name(), "The Podcast");
        assert_eq!(track.art_url(), Some("https://i.scdn.co/image/show"));
        assert_eq!(track.duration.format(), "1:00:00");
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_currently_playing("{not json"),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            parse_currently_playing(r#"{"item": {"artists": []}}"#),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error": {"status": 404, "message": "Player command failed: No active device found"}}"#;
        assert_eq!(
            parse_api_error_message(body),
            "Player command failed: No active device found"
        );
        assert_eq!(parse_api_error_message(" plain text "), "plain text");
    }
}
