//! On-disk token persistence.

use std::io::Write;
use std::path::{Path, PathBuf};

use overlay_core::{Error, Result, Tokens};
use tracing::{debug, info};

const TOKENS_FILE: &str = "tokens.json";

/// Stores the OAuth tokens between runs.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Create a token store in the platform data directory.
    pub fn new() -> Result<Self> {
        Self::with_path(crate::default_data_dir()?)
    }

    /// Create a token store in a custom directory.
    pub fn with_path(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::Storage(format!("Failed to create token directory: {e}"))
        })?;
        Ok(Self {
            path: dir.join(TOKENS_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load saved tokens, `None` if nothing was saved yet.
    pub fn load(&self) -> Result<Option<Tokens>> {
        if !self.path.exists() {
            debug!("No saved tokens at {}", self.path.display());
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let tokens = serde_json::from_str(&contents)
            .map_err(|e| Error::Storage(format!("Corrupt token file: {e}")))?;
        info!("Tokens loaded successfully.");
        Ok(Some(tokens))
    }

    /// Save tokens, replacing the previous file atomically.
    ///
    /// The file is only readable by the current user; a failed save leaves
    /// no temporary file behind.
    pub fn save(&self, tokens: &Tokens) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut file = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| Error::Storage(format!("Failed to create token file: {e}")))?;
        file.write_all(&serde_json::to_vec_pretty(tokens)?)?;
        file.as_file().sync_all()?;
        file.persist(&self.path)
            .map_err(|e| Error::Storage(format!("Failed to save tokens: {}", e.error)))?;
        info!("Tokens saved successfully.");
        Ok(())
    }

    /// Forget saved tokens.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Saved tokens removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!("Failed to remove tokens: {e}"))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::with_path(dir.path()).unwrap();
        assert!(store.load().unwrap().is_none());

        let tokens = Tokens::new("acc", Some("ref".into()), 3600, Utc::now());
        store.save(&tokens).unwrap();
        assert_eq!(store.load().unwrap(), Some(tokens));
        assert_eq!(entries(dir.path()), vec![TOKENS_FILE.to_string()]);
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::with_path(dir.path()).unwrap();
        store
            .save(&Tokens::new("acc", Some("ref".into()), 3600, Utc::now()))
            .unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_failed_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::with_path(dir.path()).unwrap();
        // A non-empty directory where the file should go makes the rename fail
        std::fs::create_dir(store.path()).unwrap();
        std::fs::write(store.path().join("keep"), "x").unwrap();

        let result = store.save(&Tokens::new("acc", None, 3600, Utc::now()));
        assert!(matches!(result, Err(Error::Storage(_))));
        assert_eq!(entries(dir.path()), vec![TOKENS_FILE.to_string()]);
    }

    #[test]
    fn test_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::with_path(dir.path()).unwrap();

        store
            .save(&Tokens::new("first", None, 3600, Utc::now()))
            .unwrap();
        store
            .save(&Tokens::new("second", None, 3600, Utc::now()))
            .unwrap();
        assert_eq!(store.load().unwrap().unwrap().access_token, "second");
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::with_path(dir.path()).unwrap();
        std::fs::write(store.path(), r#"{"access_token": "only"}"#).unwrap();
        assert!(matches!(store.load(), Err(Error::Storage(_))));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::with_path(dir.path()).unwrap();
        store.clear().unwrap();

        store
            .save(&Tokens::new("acc", None, 3600, Utc::now()))
            .unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
