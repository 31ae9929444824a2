// SPDX-License-Identifier: MPL-2.0

use crate::config::APP_ID;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to write preferences: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize preferences: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Unknown stored values fall back to light
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    #[default]
    #[serde(other)]
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Device-local state that survives restarts and never leaves the machine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
    /// Favorited company ids, in the order they were added
    #[serde(default)]
    pub favorites: Vec<String>,
    #[serde(default)]
    pub push_enabled: bool,
    #[serde(default)]
    pub selected_city: Option<String>,
}

impl Preferences {
    pub fn is_favorite(&self, company_id: &str) -> bool {
        self.favorites.iter().any(|f| f == company_id)
    }
}

/// Preferences bound to their file; every change is written through.
pub struct PreferenceStore {
    path: PathBuf,
    prefs: Preferences,
}

impl PreferenceStore {
    /// ~/.config/io.github.guiadigital.Guia/preferences.json
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push(APP_ID);
            p.push("preferences.json");
            p
        })
    }

    pub fn open_default() -> Result<Self, PreferencesError> {
        let path = Self::default_path().ok_or(PreferencesError::NoConfigDir)?;
        Ok(Self::open(path))
    }

    /// Load from `path`; a missing or unreadable file yields defaults
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = Self::load(&path);
        Self { path, prefs }
    }

    fn load(path: &Path) -> Preferences {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("ignoring corrupt preferences at {}: {}", path.display(), e);
                Preferences::default()
            }),
            Err(_) => Preferences::default(),
        }
    }

    fn save(&self) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.prefs)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn get(&self) -> &Preferences {
        &self.prefs
    }

    pub fn theme(&self) -> Theme {
        self.prefs.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), PreferencesError> {
        self.prefs.theme = theme;
        self.save()
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, PreferencesError> {
        let theme = self.prefs.theme.toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    /// Add the id when absent, remove it when present. Returns whether the
    /// company is a favorite afterwards.
    pub fn toggle_favorite(&mut self, company_id: &str) -> Result<bool, PreferencesError> {
        let now_favorite = if self.prefs.is_favorite(company_id) {
            self.prefs.favorites.retain(|f| f != company_id);
            false
        } else {
            self.prefs.favorites.push(company_id.to_string());
            true
        };
        self.save()?;
        Ok(now_favorite)
    }

    pub fn set_push_enabled(&mut self, enabled: bool) -> Result<(), PreferencesError> {
        self.prefs.push_enabled = enabled;
        self.save()
    }

    pub fn set_selected_city(&mut self, city: &str) -> Result<(), PreferencesError> {
        self.prefs.selected_city = Some(city.to_string());
        self.save()
    }
}
