//! Playback snapshot and remote-control commands.

use serde::{Deserialize, Serialize};

use super::{Position, Track};

/// What Spotify reports as currently playing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NowPlaying {
    /// The playing item, `None` when nothing is loaded.
    pub track: Option<Track>,
    /// Whether playback is running (false when paused).
    pub is_playing: bool,
    /// Progress into the current item.
    pub progress: Position,
}

impl NowPlaying {
    /// Nothing is playing.
    pub fn idle() -> Self {
        Self::default()
    }

    pub const fn playing(track: Track, is_playing: bool, progress: Position) -> Self {
        Self {
            track: Some(track),
            is_playing,
            progress,
        }
    }

    pub const fn is_idle(&self) -> bool {
        self.track.is_none()
    }
}

/// HTTP method used by a player endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandMethod {
    Post,
    Put,
}

/// A remote-control command for the active Spotify device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    Previous,
    Next,
    Play,
    Pause,
}

impl PlaybackCommand {
    /// Resolve the play/pause button into a concrete command.
    pub const fn toggle(is_playing: bool) -> Self {
        if is_playing {
            Self::Pause
        } else {
            Self::Play
        }
    }

    /// Endpoint path under `/me/player/`.
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Previous => "previous",
            Self::Next => "next",
            Self::Play => "play",
            Self::Pause => "pause",
        }
    }

    pub const fn method(self) -> CommandMethod {
        match self {
            Self::Previous | Self::Next => CommandMethod::Post,
            Self::Play | Self::Pause => CommandMethod::Put,
        }
    }

    /// Play state after the command succeeds, if it changes it.
    pub const fn resulting_play_state(self) -> Option<bool> {
        match self {
            Self::Play => Some(true),
            Self::Pause => Some(false),
            Self::Previous | Self::Next => None,
        }
    }
}
