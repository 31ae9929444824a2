// SPDX-License-Identifier: MPL-2.0

use crate::cache::{CacheDb, CacheError};
use crate::state::Snapshot;
use crate::supabase::Table;
use rusqlite::{OptionalExtension, params};
use serde::de::DeserializeOwned;

/// Offline copy of each city's last fetched collections
pub struct SnapshotCache<'a> {
    db: &'a CacheDb,
}

impl<'a> SnapshotCache<'a> {
    pub fn new(db: &'a CacheDb) -> Self {
        Self { db }
    }

    /// Persist the given collections of `snapshot` for `city` (upserts)
    pub fn store(&self, city: &str, snapshot: &Snapshot, tables: &[Table]) -> Result<(), CacheError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;
        let now = CacheDb::now();

        for table in tables {
            let payload = match table {
                Table::Companies => serde_json::to_string(&snapshot.companies)?,
                Table::Alerts => serde_json::to_string(&snapshot.alerts)?,
                Table::OnCall => serde_json::to_string(&snapshot.on_call)?,
                Table::AdminSettings => serde_json::to_string(&snapshot.settings)?,
                Table::Notifications => serde_json::to_string(&snapshot.notifications)?,
                Table::Banners => serde_json::to_string(&snapshot.banners)?,
            };

            tx.execute(
                r#"
                INSERT INTO snapshots (city, collection, payload, fetched_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(city, collection) DO UPDATE SET
                    payload = excluded.payload,
                    fetched_at = excluded.fetched_at
                "#,
                params![city, table.name(), payload, now],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Rebuild a snapshot for `city`. Collections never cached keep their
    /// defaults; `None` when nothing at all is cached for the city.
    pub fn load(&self, city: &str) -> Result<Option<Snapshot>, CacheError> {
        let mut snapshot = Snapshot::default();
        let mut found = false;

        for table in Table::ALL {
            match table {
                Table::Companies => found |= self.read_into(city, table, &mut snapshot.companies)?,
                Table::Alerts => found |= self.read_into(city, table, &mut snapshot.alerts)?,
                Table::OnCall => found |= self.read_into(city, table, &mut snapshot.on_call)?,
                Table::AdminSettings => {
                    found |= self.read_into(city, table, &mut snapshot.settings)?
                }
                Table::Notifications => {
                    found |= self.read_into(city, table, &mut snapshot.notifications)?
                }
                Table::Banners => found |= self.read_into(city, table, &mut snapshot.banners)?,
            }
        }

        Ok(found.then_some(snapshot))
    }

    fn read_into<T: DeserializeOwned>(
        &self,
        city: &str,
        table: Table,
        target: &mut T,
    ) -> Result<bool, CacheError> {
        let payload: Option<String> = self
            .db
            .conn()
            .query_row(
                "SELECT payload FROM snapshots WHERE city = ? AND collection = ?",
                params![city, table.name()],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => {
                *target = serde_json::from_str(&json)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Forget everything cached for a city
    pub fn clear_city(&self, city: &str) -> Result<(), CacheError> {
        self.db
            .conn()
            .execute("DELETE FROM snapshots WHERE city = ?", [city])?;
        Ok(())
    }
}
