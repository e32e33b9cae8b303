//! Options for opening a [`SqlStore`](super::SqlStore)

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Actor recorded in `created_by`/`updated_by` when none is configured
pub const DEFAULT_ACTOR: &str = "system";

/// Default file name of the database inside the data directory
pub const DEFAULT_DB_FILE: &str = "cfgstore.db";

/// Options for opening a [`SqlStore`](super::SqlStore)
#[derive(Debug, Clone)]
pub struct SqlStoreOptions {
    /// Database file. `None` opens a private in-memory database.
    pub path: Option<PathBuf>,

    /// Name stamped into the audit columns of everything this store writes
    pub actor: String,

    /// How long a statement waits for a lock held by another connection
    pub busy_timeout: Duration,

    /// Use write-ahead logging (file databases only)
    pub wal: bool,
}

impl Default for SqlStoreOptions {
    fn default() -> Self {
        Self {
            path: None,
            actor: DEFAULT_ACTOR.into(),
            busy_timeout: Duration::from_secs(5),
            wal: true,
        }
    }
}

impl SqlStoreOptions {
    /// Create a new builder for SqlStoreOptions
    ///
    /// # Example
    /// ```rust
    /// use cfgstore::SqlStoreOptions;
    ///
    /// let options = SqlStoreOptions::builder()
    ///     .path("~/.local/share/my-app/settings.db")
    ///     .actor("deploy-bot")
    ///     .build();
    ///
    /// assert_eq!(options.actor, "deploy-bot");
    /// ```
    pub fn builder() -> SqlStoreOptionsBuilder {
        SqlStoreOptionsBuilder::new()
    }

    /// Options for a private in-memory database
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Display form of the database location, used in errors and logs
    pub(crate) fn location(&self) -> String {
        self.path
            .as_deref()
            .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string())
    }

    /// Check the options before a connection is opened.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Options`] if the actor is blank or the path names a
    /// directory.
    pub fn validate(&self) -> Result<()> {
        if self.actor.trim().is_empty() {
            return Err(Error::Options("actor must not be empty".into()));
        }

        if let Some(path) = &self.path {
            if path.as_os_str().is_empty() {
                return Err(Error::Options("database path must not be empty".into()));
            }
            if path.is_dir() {
                return Err(Error::Options(format!(
                    "database path '{}' is a directory",
                    path.display()
                )));
            }
        }

        Ok(())
    }
}

/// Builder for creating SqlStoreOptions with a fluent API
#[derive(Debug, Clone)]
pub struct SqlStoreOptionsBuilder {
    path: Option<PathBuf>,
    in_memory: bool,
    actor: String,
    busy_timeout: Duration,
    wal: bool,
}

impl Default for SqlStoreOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlStoreOptionsBuilder {
    pub fn new() -> Self {
        let defaults = SqlStoreOptions::default();
        Self {
            path: None,
            in_memory: false,
            actor: defaults.actor,
            busy_timeout: defaults.busy_timeout,
            wal: defaults.wal,
        }
    }

    /// Set the database file
    ///
    /// Supports `~` expansion for home directory.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(expand_home(path.into()));
        self.in_memory = false;
        self
    }

    /// Open a private in-memory database instead of a file
    pub fn in_memory(mut self) -> Self {
        self.path = None;
        self.in_memory = true;
        self
    }

    /// Set the actor recorded in `created_by`/`updated_by` (default: "system")
    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    /// Set the busy timeout (default: 5 seconds)
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Enable or disable write-ahead logging (default: enabled)
    pub fn wal(mut self, enabled: bool) -> Self {
        self.wal = enabled;
        self
    }

    /// Build the SqlStoreOptions
    ///
    /// If neither a path nor in-memory mode is set, the database lives in the
    /// system data directory.
    pub fn build(self) -> SqlStoreOptions {
        let path = if self.in_memory {
            None
        } else {
            Some(self.path.unwrap_or_else(default_path))
        };

        SqlStoreOptions {
            path,
            actor: self.actor,
            busy_timeout: self.busy_timeout,
            wal: self.wal,
        }
    }
}

fn expand_home(path: PathBuf) -> PathBuf {
    if !path.starts_with("~") {
        return path;
    }
    match dirs::home_dir() {
        Some(home) => home.join(path.strip_prefix("~").unwrap_or(Path::new(""))),
        None => path,
    }
}

fn default_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("cfgstore"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DB_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let options = SqlStoreOptions::builder().build();

        assert_eq!(options.actor, DEFAULT_ACTOR);
        assert_eq!(options.busy_timeout, Duration::from_secs(5));
        assert!(options.wal);
        assert!(options.path.unwrap().ends_with(DEFAULT_DB_FILE));
    }

    #[test]
    fn test_builder_in_memory() {
        let options = SqlStoreOptions::builder()
            .path("/tmp/ignored.db")
            .in_memory()
            .actor("tests")
            .build();

        assert!(options.path.is_none());
        assert_eq!(options.location(), ":memory:");
        assert_eq!(options.actor, "tests");
    }

    #[test]
    fn test_tilde_expansion() {
        let options = SqlStoreOptions::builder().path("~/settings.db").build();
        let path = options.path.unwrap();

        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("settings.db"));
        }
    }

    #[test]
    fn test_validate_rejects_blank_actor() {
        let options = SqlStoreOptions::builder().in_memory().actor("  ").build();
        assert!(matches!(options.validate(), Err(Error::Options(_))));
    }

    #[test]
    fn test_validate_rejects_directory_path() {
        let dir = tempfile::tempdir().unwrap();
        let options = SqlStoreOptions::builder().path(dir.path()).build();

        assert!(matches!(options.validate(), Err(Error::Options(_))));
    }
}
