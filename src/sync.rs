// SPDX-License-Identifier: MPL-2.0

//! City-scoped synchronization: six concurrent queries, each applied on its
//! own so one failing collection never blocks the rest.

use crate::config::ALL_CITIES;
use crate::model::{AdminContact, Alert, Banner, Company, Notification, OnCallDuty};
use crate::state::{Directory, SyncBatch, SyncOutcome};
use crate::supabase::{
    AdminSettingsRow, AlertRow, BannerRow, ClientError, CompanyRow, DirectoryStore,
    NotificationRow, OnCallRow, Query, Table,
};
use serde::de::DeserializeOwned;
use std::sync::Mutex;

/// The query issued for `table` when `city` is selected
pub fn city_query(table: Table, city: &str) -> Query {
    match table {
        Table::Companies => Query::new().eq("city", city).order("name", true),
        Table::Alerts | Table::Notifications => {
            Query::new().eq("city", city).order("created_at", false)
        }
        Table::OnCall | Table::AdminSettings => Query::new().eq("city", city),
        Table::Banners => Query::new()
            .any_of("city", &[city, ALL_CITIES])
            .order("order_index", true),
    }
}

async fn fetch_list<S, R, T>(store: &S, table: Table, city: &str) -> Result<Vec<T>, ClientError>
where
    S: DirectoryStore,
    R: DeserializeOwned,
    T: From<R>,
{
    let rows: Vec<R> = store.select_rows(table, &city_query(table, city)).await?;
    Ok(rows.into_iter().map(T::from).collect())
}

async fn fetch_single<S, R, T>(
    store: &S,
    table: Table,
    city: &str,
) -> Result<Option<T>, ClientError>
where
    S: DirectoryStore,
    R: DeserializeOwned,
    T: From<R>,
{
    let row: Option<R> = store
        .select_maybe_single(table, &city_query(table, city))
        .await?;
    Ok(row.map(T::from))
}

/// Dispatch all six queries at once and collect every outcome
pub async fn fetch_batch<S: DirectoryStore>(store: &S, city: &str) -> SyncBatch {
    let (companies, alerts, on_call, settings, notifications, banners) = tokio::join!(
        fetch_list::<_, CompanyRow, Company>(store, Table::Companies, city),
        fetch_list::<_, AlertRow, Alert>(store, Table::Alerts, city),
        fetch_single::<_, OnCallRow, OnCallDuty>(store, Table::OnCall, city),
        fetch_single::<_, AdminSettingsRow, AdminContact>(store, Table::AdminSettings, city),
        fetch_list::<_, NotificationRow, Notification>(store, Table::Notifications, city),
        fetch_list::<_, BannerRow, Banner>(store, Table::Banners, city),
    );

    SyncBatch {
        companies,
        alerts,
        on_call,
        settings,
        notifications,
        banners,
    }
}

/// Refresh `directory` for `city`. The lock is only taken to issue the ticket
/// and to apply the finished batch, never across the network calls.
pub async fn sync_city<S: DirectoryStore>(
    store: &S,
    directory: &Mutex<Directory>,
    city: &str,
) -> SyncOutcome {
    let ticket = directory.lock().unwrap().begin_sync(city);
    tracing::info!(city, seq = ticket.seq(), "syncing directory");

    let batch = fetch_batch(store, city).await;
    let outcome = directory.lock().unwrap().apply(&ticket, batch);

    if let SyncOutcome::Applied(report) = &outcome {
        tracing::info!(
            city,
            updated = report.updated.len(),
            failed = report.failed.len(),
            "sync complete"
        );
    }
    outcome
}
