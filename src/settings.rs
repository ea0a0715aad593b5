use crate::error::{Result, WatchError};
use crate::filter::IgnoreFilter;
use anyhow::Context;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const SETTINGS_FILE_NAME: &str = ".watchssh_config.json";

/// Persisted user settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub ignored_users: Vec<String>,
}

impl Settings {
    /// Append a user, keeping order. Returns false if already present.
    pub fn add_ignored_user(&mut self, username: &str) -> bool {
        if username.is_empty() || self.ignored_users.iter().any(|u| u == username) {
            return false;
        }
        self.ignored_users.push(username.to_string());
        true
    }

    /// Returns false if the user was not in the list.
    pub fn remove_ignored_user(&mut self, username: &str) -> bool {
        let before = self.ignored_users.len();
        self.ignored_users.retain(|u| u != username);
        self.ignored_users.len() != before
    }
}

/// JSON settings document at a fixed per-user path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// `~/.watchssh_config.json`
    pub fn default_path() -> PathBuf {
        dirs::home_dir().unwrap_or_default().join(SETTINGS_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings. A missing file is an empty default.
    pub fn load(&self) -> Result<Settings> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", self.path.display());
                return Ok(Settings::default());
            }
            Err(source) => {
                return Err(WatchError::SettingsRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents).map_err(|source| WatchError::SettingsMalformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Overwrite the whole document.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let write_error = |source| WatchError::SettingsWrite {
            path: self.path.clone(),
            source,
        };

        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| write_error(std::io::Error::new(ErrorKind::InvalidData, e)))?;
        std::fs::write(&self.path, json + "\n").map_err(write_error)?;

        info!(
            "Saved {} ignored user(s) to {}",
            settings.ignored_users.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Reload the ignore list into `filter` whenever the settings file is
    /// created or modified. The watch lasts as long as the returned watcher.
    ///
    /// A reload that fails keeps the current set.
    pub fn watch(&self, filter: IgnoreFilter) -> anyhow::Result<RecommendedWatcher> {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .with_context(|| format!("Invalid settings path: {}", self.path.display()))?;
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let store = self.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    warn!("Settings watch error: {}", e);
                    return;
                }
            };

            if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                return;
            }
            if !event
                .paths
                .iter()
                .any(|p| p.file_name() == Some(file_name.as_os_str()))
            {
                return;
            }

            match store.load() {
                Ok(settings) => {
                    debug!("Reloaded {} ignored user(s)", settings.ignored_users.len());
                    filter.replace(settings.ignored_users);
                }
                Err(e) => warn!("{}; keeping the current ignore list", e),
            }
        })?;

        watcher
            .watch(&directory, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", directory.display()))?;

        Ok(watcher)
    }
}
