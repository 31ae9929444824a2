// SPDX-License-Identifier: MPL-2.0

//! The application value: store handle, device preferences, offline cache
//! and the synchronized directory, wired together.

use crate::admin::{self, AdminError, EntityForm, EntityKind, SaveKind};
use crate::cache::{CacheDb, CacheError, SnapshotCache};
use crate::config::find_city;
use crate::relay::{self, PushError};
use crate::state::{
    Directory, PreferenceStore, Preferences, PreferencesError, Snapshot, SyncOutcome, Theme,
};
use crate::supabase::DirectoryStore;
use crate::sync::sync_city;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("unknown city: {0}")]
    UnknownCity(String),
    #[error("no city selected")]
    NoCity,
    #[error(transparent)]
    Preferences(#[from] PreferencesError),
    #[error(transparent)]
    Admin(#[from] AdminError),
    #[error(transparent)]
    Push(#[from] PushError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

pub struct GuiaApp<S: DirectoryStore> {
    store: S,
    prefs: PreferenceStore,
    cache: Option<CacheDb>,
    directory: Mutex<Directory>,
}

impl<S: DirectoryStore> GuiaApp<S> {
    /// Build the app and seed the directory from the offline cache for the
    /// remembered city, if there is one.
    pub fn new(store: S, prefs: PreferenceStore, cache: Option<CacheDb>) -> Self {
        let mut directory = Directory::new();

        if let Some(city) = prefs.get().selected_city.as_deref()
            && let Some(db) = &cache
        {
            match SnapshotCache::new(db).load(city) {
                Ok(Some(snapshot)) => {
                    tracing::debug!(city, "hydrated directory from cache");
                    directory.hydrate(city, snapshot);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("failed to read snapshot cache: {e}"),
            }
        }

        Self {
            store,
            prefs,
            cache,
            directory: Mutex::new(directory),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn preferences(&self) -> &Preferences {
        self.prefs.get()
    }

    pub fn city(&self) -> Option<&str> {
        self.prefs.get().selected_city.as_deref()
    }

    pub fn directory(&self) -> MutexGuard<'_, Directory> {
        self.directory.lock().unwrap()
    }

    /// Copy of the current snapshot, for callers that must not hold the lock
    pub fn snapshot(&self) -> Snapshot {
        self.directory().snapshot().clone()
    }

    /// Remember `city` and load its data
    pub async fn select_city(&mut self, city: &str) -> Result<SyncOutcome, AppError> {
        if find_city(city).is_none() {
            return Err(AppError::UnknownCity(city.to_string()));
        }
        self.prefs.set_selected_city(city)?;
        self.refresh().await
    }

    /// Re-run the sync for the selected city and cache what came back
    pub async fn refresh(&self) -> Result<SyncOutcome, AppError> {
        let city = self.city().ok_or(AppError::NoCity)?.to_string();
        let outcome = sync_city(&self.store, &self.directory, &city).await;

        if let SyncOutcome::Applied(report) = &outcome
            && !report.updated.is_empty()
            && let Some(db) = &self.cache
        {
            let snapshot = self.snapshot();
            if let Err(e) = SnapshotCache::new(db).store(&city, &snapshot, &report.updated) {
                tracing::warn!("failed to cache snapshot: {e}");
            }
        }
        Ok(outcome)
    }

    /// Drop the cached copy of the selected city
    pub fn clear_cached(&self) -> Result<(), AppError> {
        let city = self.city().ok_or(AppError::NoCity)?;
        if let Some(db) = &self.cache {
            SnapshotCache::new(db).clear_city(city)?;
        }
        Ok(())
    }

    pub fn toggle_favorite(&mut self, company_id: &str) -> Result<bool, AppError> {
        Ok(self.prefs.toggle_favorite(company_id)?)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, AppError> {
        Ok(self.prefs.toggle_theme()?)
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), AppError> {
        Ok(self.prefs.set_theme(theme)?)
    }

    /// Register `subscription` with the relay and remember that push is on
    pub async fn enable_push(&mut self, relay_url: &Url, subscription: &Value) -> Result<(), AppError> {
        relay::subscribe(relay_url, subscription).await?;
        self.prefs.set_push_enabled(true)?;
        Ok(())
    }

    /// Save an admin form for the selected city, then refetch
    pub async fn save(&self, form: &EntityForm) -> Result<SaveKind, AppError> {
        let city = self.city().ok_or(AppError::NoCity)?.to_string();
        let kind = admin::submit(&self.store, form, &city).await?;
        self.refresh().await?;
        Ok(kind)
    }

    /// Delete a record after confirmation, then refetch
    pub async fn remove(&self, kind: EntityKind, id: &str, confirmed: bool) -> Result<bool, AppError> {
        let deleted = admin::delete(&self.store, kind, id, confirmed).await?;
        if deleted {
            self.refresh().await?;
        }
        Ok(deleted)
    }
}
