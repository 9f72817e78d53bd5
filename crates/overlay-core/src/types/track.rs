//! Track type representing the item Spotify is playing.

use serde::{Deserialize, Serialize};

use super::Duration;

/// A single track or podcast episode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    /// Spotify ID (absent for local files).
    pub id: Option<String>,
    /// Track title.
    pub title: String,
    /// Artist name(s). For episodes this holds the show name.
    pub artists: Vec<String>,
    /// Album name (if available).
    pub album: Option<String>,
    /// Album artwork at the sizes Spotify offers.
    pub images: Vec<AlbumImage>,
    /// Track duration.
    pub duration: Duration,
}

impl Track {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            artists: Vec::new(),
            album: None,
            images: Vec::new(),
            duration: Duration::default(),
        }
    }

    #[must_use]
    pub fn with_artist(mut self, name: impl Into<String>) -> Self {
        self.artists.push(name.into());
        self
    }

    /// Get the primary artist name.
    pub fn artist_name(&self) -> &str {
        self.artists.first().map_or("", String::as_str)
    }

    /// Get all artist names joined.
    pub fn artists_display(&self) -> String {
        self.artists.join(", ")
    }

    /// Get the URL of the largest album image.
    pub fn art_url(&self) -> Option<&str> {
        self.images
            .iter()
            .max_by_key(|img| img.area())
            .map(|img| img.url.as_str())
    }
}

/// Album artwork reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlbumImage {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl AlbumImage {
    pub fn new(url: impl Into<String>, width: Option<u32>, height: Option<u32>) -> Self {
        Self {
            url: url.into(),
            width,
            height,
        }
    }

    fn area(&self) -> u64 {
        u64::from(self.width.unwrap_or(0)) * u64::from(self.height.unwrap_or(0))
    }
}
