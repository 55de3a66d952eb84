//! Command-line configuration: TOML file, environment and flag overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "studymaster.toml";
/// Environment variable overriding the database URL.
pub const DB_URL_ENV: &str = "STUDYMASTER_DB_URL";

const MEMORY_URL: &str = "sqlite::memory:";

/// Top-level studymaster configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// `SQLite` URL or plain file path for the deck store.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// Shuffle cards when an interactive study session starts.
    #[serde(default)]
    pub shuffle: bool,
}

fn default_db_url() -> String {
    "sqlite://studymaster.sqlite3".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_url: default_db_url(),
            shuffle: false,
        }
    }
}

impl AppConfig {
    /// Load from an explicit path, or from `studymaster.toml` if present.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file just yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) if p.exists() => Some(p.to_path_buf()),
            Some(p) => bail!("config file not found: {}", p.display()),
            None => Some(PathBuf::from(CONFIG_FILE_NAME)).filter(|p| p.exists()),
        };

        match path {
            Some(path) => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config: {}", path.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("failed to parse config: {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply the environment value and then the `--db` flag, flag winning.
    #[must_use]
    pub fn with_overrides(mut self, env_db_url: Option<String>, flag_db_url: Option<String>) -> Self {
        if let Some(url) = flag_db_url.or(env_db_url).filter(|u| !u.trim().is_empty()) {
            self.db_url = url;
        }
        self
    }

    /// Database URL in the `sqlite://<absolute path>` form.
    #[must_use]
    pub fn database_url(&self) -> String {
        normalize_sqlite_url(&self.db_url)
    }
}

/// Turn `foo.db`, `sqlite:foo.db` or `sqlite://foo.db` into an absolute
/// `sqlite://` URL. In-memory and `file:` URLs pass through.
#[must_use]
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == MEMORY_URL || trimmed.starts_with("sqlite:file:") {
        return trimmed.to_string();
    }

    let path_str = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create parent directories for a file-backed database.
pub fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid database url: {db_url}");
    }

    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_no_file() {
        let config = AppConfig::default();
        assert_eq!(config.db_url, "sqlite://studymaster.sqlite3");
        assert!(!config.shuffle);
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn reads_toml_with_partial_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studymaster.toml");
        std::fs::write(&path, "shuffle = true\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert!(config.shuffle);
        assert_eq!(config.db_url, default_db_url());
    }

    #[test]
    fn rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "db_url = [").unwrap();
        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn flag_beats_env_beats_file() {
        let base = AppConfig::default();
        let env = base
            .clone()
            .with_overrides(Some("sqlite://env.db".into()), None);
        assert_eq!(env.db_url, "sqlite://env.db");

        let flag = base
            .clone()
            .with_overrides(Some("sqlite://env.db".into()), Some("flag.db".into()));
        assert_eq!(flag.db_url, "flag.db");

        let blank = base.with_overrides(Some("  ".into()), None);
        assert_eq!(blank.db_url, default_db_url());
    }

    #[test]
    fn normalizes_urls() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:file:memdb?mode=memory&cache=shared"),
            "sqlite:file:memdb?mode=memory&cache=shared"
        );
        assert_eq!(normalize_sqlite_url("sqlite:///tmp/a.db"), "sqlite:///tmp/a.db");
        assert_eq!(normalize_sqlite_url("/tmp/b.db"), "sqlite:///tmp/b.db");

        let relative = normalize_sqlite_url("sqlite:c.db");
        assert!(relative.starts_with("sqlite:///"));
        assert!(relative.ends_with("/c.db"));
    }

    #[test]
    fn prepares_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested/deeper/study.db");
        let url = format!("sqlite://{}", db.display());

        prepare_sqlite_file(&url).unwrap();
        assert!(db.parent().unwrap().is_dir());
        prepare_sqlite_file("sqlite::memory:").unwrap();
    }
}
