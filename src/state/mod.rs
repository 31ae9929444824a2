// SPDX-License-Identifier: MPL-2.0

mod directory;
pub mod preferences;

pub use directory::{Directory, Snapshot, SyncBatch, SyncOutcome, SyncReport, SyncTicket};
pub use preferences::{PreferenceStore, Preferences, PreferencesError, Theme};
