// SPDX-License-Identifier: MPL-2.0

//! Last fetched snapshot of the city-scoped collections.
//!
//! Every sync takes a ticket from `Directory::begin_sync`. Tickets are
//! numbered; only a batch carrying the newest ticket may write, so a slow
//! response for a previously selected city can never overwrite newer state.

use crate::model::{AdminContact, Alert, Banner, Company, Notification, OnCallDuty};
use crate::supabase::{ClientError, Table};

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub companies: Vec<Company>,
    pub alerts: Vec<Alert>,
    /// `None` until a row exists for the city; views show a placeholder
    pub on_call: Option<OnCallDuty>,
    pub settings: AdminContact,
    pub notifications: Vec<Notification>,
    pub banners: Vec<Banner>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            companies: Vec::new(),
            alerts: Vec::new(),
            on_call: None,
            settings: AdminContact::fallback(),
            notifications: Vec::new(),
            banners: Banner::fallback(),
        }
    }
}

/// One fetch result per collection, each independent of the others
#[derive(Debug)]
pub struct SyncBatch {
    pub companies: Result<Vec<Company>, ClientError>,
    pub alerts: Result<Vec<Alert>, ClientError>,
    pub on_call: Result<Option<OnCallDuty>, ClientError>,
    pub settings: Result<Option<AdminContact>, ClientError>,
    pub notifications: Result<Vec<Notification>, ClientError>,
    pub banners: Result<Vec<Banner>, ClientError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTicket {
    seq: u64,
    city: String,
}

impl SyncTicket {
    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What a batch did to the snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub updated: Vec<Table>,
    pub failed: Vec<(Table, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Applied(SyncReport),
    /// A newer sync was issued while this one was in flight
    Superseded,
}

#[derive(Debug, Default)]
pub struct Directory {
    city: Option<String>,
    snapshot: Snapshot,
    refreshing: bool,
    latest_seq: u64,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn begin_sync(&mut self, city: &str) -> SyncTicket {
        self.latest_seq += 1;
        self.city = Some(city.to_string());
        self.refreshing = true;
        SyncTicket {
            seq: self.latest_seq,
            city: city.to_string(),
        }
    }

    pub fn is_current(&self, ticket: &SyncTicket) -> bool {
        ticket.seq == self.latest_seq
    }

    /// Apply a completed batch. Each collection is written only if its own
    /// fetch succeeded; failures are logged and leave the old data in place.
    pub fn apply(&mut self, ticket: &SyncTicket, batch: SyncBatch) -> SyncOutcome {
        if !self.is_current(ticket) {
            tracing::debug!(
                seq = ticket.seq,
                latest = self.latest_seq,
                city = %ticket.city,
                "discarding superseded sync"
            );
            return SyncOutcome::Superseded;
        }

        let mut report = SyncReport::default();

        fn settle<T>(
            report: &mut SyncReport,
            table: Table,
            city: &str,
            result: Result<T, ClientError>,
            write: impl FnOnce(T),
        ) {
            match result {
                Ok(value) => {
                    write(value);
                    report.updated.push(table);
                }
                Err(e) => {
                    tracing::warn!(%city, %table, "sync failed: {}", e);
                    report.failed.push((table, e.to_string()));
                }
            }
        }

        let city = ticket.city.as_str();
        let snap = &mut self.snapshot;
        settle(&mut report, Table::Companies, city, batch.companies, |v| {
            snap.companies = v
        });
        settle(&mut report, Table::Alerts, city, batch.alerts, |v| {
            snap.alerts = v
        });
        settle(&mut report, Table::OnCall, city, batch.on_call, |v| {
            snap.on_call = v
        });
        // No settings row keeps whatever contact was shown before
        settle(&mut report, Table::AdminSettings, city, batch.settings, |v| {
            if let Some(settings) = v {
                snap.settings = settings;
            }
        });
        settle(
            &mut report,
            Table::Notifications,
            city,
            batch.notifications,
            |v| snap.notifications = v,
        );
        settle(&mut report, Table::Banners, city, batch.banners, |v| {
            snap.banners = v
        });

        self.refreshing = false;
        SyncOutcome::Applied(report)
    }

    /// Seed the snapshot from the offline cache. Ignored once a sync for a
    /// different city has been issued.
    pub fn hydrate(&mut self, city: &str, cached: Snapshot) {
        if self.city.as_deref().is_some_and(|c| c != city) {
            return;
        }
        self.city = Some(city.to_string());
        self.snapshot = cached;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Social;

    fn company(id: &str, city: &str) -> Company {
        Company {
            id: id.to_string(),
            name: format!("Empresa {id}"),
            phone: String::new(),
            category: "Serviços".to_string(),
            description: None,
            address: None,
            logo: String::new(),
            is_featured: false,
            social: Social::default(),
            city: city.to_string(),
            created_at: None,
        }
    }

    fn batch_with_companies(companies: Vec<Company>) -> SyncBatch {
        SyncBatch {
            companies: Ok(companies),
            alerts: Ok(Vec::new()),
            on_call: Ok(None),
            settings: Ok(None),
            notifications: Ok(Vec::new()),
            banners: Ok(Vec::new()),
        }
    }

    #[test]
    fn test_defaults_before_first_sync() {
        let dir = Directory::new();
        assert!(dir.city().is_none());
        assert!(!dir.is_refreshing());
        assert_eq!(dir.snapshot().banners.len(), 2);
        assert_eq!(dir.snapshot().settings.phone, "(14) 99755-0000");
    }

    #[test]
    fn test_superseded_batch_is_discarded() {
        let mut dir = Directory::new();
        let first = dir.begin_sync("bernardino");
        let second = dir.begin_sync("ourinhos");

        let outcome = dir.apply(&second, batch_with_companies(vec![company("o1", "ourinhos")]));
        assert!(matches!(outcome, SyncOutcome::Applied(_)));
        assert!(!dir.is_refreshing());

        // The older response arrives late
        let outcome = dir.apply(&first, batch_with_companies(vec![company("b1", "bernardino")]));
        assert_eq!(outcome, SyncOutcome::Superseded);
        assert_eq!(dir.snapshot().companies[0].id, "o1");
        assert_eq!(dir.city(), Some("ourinhos"));
    }

    #[test]
    fn test_stale_batch_does_not_clear_refreshing() {
        let mut dir = Directory::new();
        let first = dir.begin_sync("bernardino");
        let _second = dir.begin_sync("ipaussu");
        dir.apply(&first, batch_with_companies(Vec::new()));
        assert!(dir.is_refreshing());
    }

    #[test]
    fn test_one_failure_leaves_others_updated() {
        let mut dir = Directory::new();
        let ticket = dir.begin_sync("chavantes");
        let mut batch = batch_with_companies(vec![company("c1", "chavantes")]);
        batch.alerts = Err(ClientError::Network("timed out".to_string()));
        batch.banners = Ok(Vec::new());

        let SyncOutcome::Applied(report) = dir.apply(&ticket, batch) else {
            panic!("expected applied");
        };
        assert_eq!(report.updated.len(), 5);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, Table::Alerts);
        assert_eq!(dir.snapshot().companies.len(), 1);
        assert!(dir.snapshot().banners.is_empty());
        assert!(!dir.is_refreshing());
    }

    #[test]
    fn test_missing_settings_keep_prior_and_missing_on_call_clears() {
        let mut dir = Directory::new();
        let ticket = dir.begin_sync("bernardino");
        let mut batch = batch_with_companies(Vec::new());
        batch.on_call = Ok(Some(OnCallDuty {
            id: Some("p1".to_string()),
            pharmacy_name: "Farmácia Central".to_string(),
            phone: String::new(),
            address: String::new(),
            city: "bernardino".to_string(),
            updated_at: None,
        }));
        let mut contact = AdminContact::fallback();
        contact.email = "bernardino@guia.com".to_string();
        batch.settings = Ok(Some(contact));
        dir.apply(&ticket, batch);
        assert!(dir.snapshot().on_call.is_some());

        let ticket = dir.begin_sync("ipaussu");
        dir.apply(&ticket, batch_with_companies(Vec::new()));
        assert!(dir.snapshot().on_call.is_none());
        assert_eq!(dir.snapshot().settings.email, "bernardino@guia.com");
    }

    #[test]
    fn test_hydrate_respects_selected_city() {
        let mut dir = Directory::new();
        let mut cached = Snapshot::default();
        cached.companies.push(company("x", "ourinhos"));
        dir.hydrate("ourinhos", cached.clone());
        assert_eq!(dir.snapshot().companies.len(), 1);

        dir.begin_sync("ipaussu");
        dir.hydrate("ourinhos", Snapshot::default());
        assert_eq!(dir.snapshot().companies.len(), 1);
        assert_eq!(dir.city(), Some("ipaussu"));
    }
}
