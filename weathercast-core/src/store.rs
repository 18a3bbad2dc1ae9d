//! Persistence of the most recently resolved place name.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::config::project_dirs;

/// Single-value store: last write wins.
pub trait LastPlaceStore: Send + Sync + Debug {
    fn load(&self) -> Option<String>;

    fn save(&self, name: &str);
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredState {
    last_searched_place: Option<String>,
}

/// Stores the place under the `last_searched_place` key of a TOML file.
#[derive(Debug, Clone)]
pub struct FileLastPlaceStore {
    path: PathBuf,
}

impl FileLastPlaceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `state.toml` in the platform data directory.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(project_dirs()?.data_dir().join("state.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoredState> {
        if !self.path.exists() {
            return Ok(StoredState::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file: {}", self.path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse state file: {}", self.path.display()))
    }

    fn write(&self, state: &StoredState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create state directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(state).context("Failed to serialize state to TOML")?;

        fs::write(&self.path, toml)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))
    }
}

impl LastPlaceStore for FileLastPlaceStore {
    fn load(&self) -> Option<String> {
        match self.read() {
            Ok(state) => state.last_searched_place.filter(|name| !name.trim().is_empty()),
            Err(e) => {
                tracing::warn!("Ignoring unreadable last place: {e:#}");
                None
            }
        }
    }

    fn save(&self, name: &str) {
        let state = StoredState { last_searched_place: Some(name.to_string()) };
        if let Err(e) = self.write(&state) {
            tracing::warn!("Failed to persist last place: {e:#}");
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryLastPlaceStore {
    value: Mutex<Option<String>>,
}

impl MemoryLastPlaceStore {
    pub fn with_value(name: &str) -> Self {
        Self { value: Mutex::new(Some(name.to_string())) }
    }
}

impl LastPlaceStore for MemoryLastPlaceStore {
    fn load(&self) -> Option<String> {
        self.value.lock().ok().and_then(|v| (*v).clone())
    }

    fn save(&self, name: &str) {
        if let Ok(mut value) = self.value.lock() {
            *value = Some(name.to_string());
        }
    }
}
