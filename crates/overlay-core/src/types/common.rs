//! Common types shared across the application.

use serde::{Deserialize, Serialize};

/// Duration in seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Duration(pub u64);

impl Duration {
    pub const fn from_seconds(seconds: u64) -> Self {
        Self(seconds)
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis / 1000)
    }

    pub const fn as_seconds(&self) -> u64 {
        self.0
    }

    /// Format as MM:SS or HH:MM:SS.
    pub fn format(&self) -> String {
        let total_secs = self.0;
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;

        if hours > 0 {
            format!("{hours}:{minutes:02}:{seconds:02}")
        } else {
            format!("{minutes}:{seconds:02}")
        }
    }
}

impl From<u64> for Duration {
    fn from(seconds: u64) -> Self {
        Self(seconds)
    }
}

/// Playback position in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position(pub u64);

impl Position {
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Format as MM:SS or HH:MM:SS.
    pub fn format(&self) -> String {
        Duration::from_seconds(self.0 / 1000).format()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_format() {
        assert_eq!(Duration::from_seconds(65).format(), "1:05");
        assert_eq!(Duration::from_seconds(3661).format(), "1:01:01");
        assert_eq!(Duration::from_seconds(0).format(), "0:00");
    }

    #[test]
    fn test_position_format() {
        assert_eq!(Position::from_millis(125_900).format(), "2:05");
        assert_eq!(Duration::from_millis(215_000).as_seconds(), 215);
    }
}
