// SPDX-License-Identifier: MPL-2.0

mod client;
#[cfg(test)]
pub mod memory;
mod query;
mod types;

pub use client::GuiaClient;
pub use query::{Filter, Order, Query, Table};
pub use types::{
    AdminSettingsRow, AlertRow, BannerRow, CompanyRow, NotificationRow, OnCallRow, Session,
    SocialRow,
};

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Auth(String),
    #[error("network error: {0}")]
    Network(String),
    /// Error reported by the store itself; the message is shown verbatim.
    #[error("{message}")]
    Remote { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid store url: {0}")]
    InvalidUrl(String),
}

/// The table operations the directory needs from the hosted store.
///
/// `GuiaClient` talks to the real service; tests use an in-memory table set.
#[allow(async_fn_in_trait)]
pub trait DirectoryStore {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>, ClientError>;

    async fn insert(&self, table: Table, row: &Value) -> Result<(), ClientError>;

    async fn update(&self, table: Table, id: &str, row: &Value) -> Result<(), ClientError>;

    async fn delete(&self, table: Table, id: &str) -> Result<(), ClientError>;

    /// Select and decode rows. A row that cannot be decoded is logged and
    /// skipped; the rest of the collection is still returned.
    async fn select_rows<T: DeserializeOwned>(
        &self,
        table: Table,
        query: &Query,
    ) -> Result<Vec<T>, ClientError> {
        let rows = self.select(table, query).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    tracing::warn!(%table, "skipping undecodable row: {e}");
                    None
                }
            })
            .collect())
    }

    /// Zero rows is `None`; more than one is an error.
    async fn select_maybe_single<T: DeserializeOwned>(
        &self,
        table: Table,
        query: &Query,
    ) -> Result<Option<T>, ClientError> {
        let mut rows: Vec<T> = self.select_rows(table, query).await?;
        match rows.len() {
            0 | 1 => Ok(rows.pop()),
            n => Err(ClientError::InvalidResponse(format!(
                "expected at most one {table} row, got {n}"
            ))),
        }
    }
}
