// SPDX-License-Identifier: MPL-2.0

//! In-memory directory records.
//!
//! Rows from the store are normalized on the way in: timestamps become epoch
//! milliseconds, `order_index` becomes `order`, and a missing social column
//! becomes three empty handles.

use crate::supabase::{
    AdminSettingsRow, AlertRow, BannerRow, CompanyRow, NotificationRow, OnCallRow, SocialRow,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Social {
    pub whatsapp: String,
    pub instagram: String,
    pub facebook: String,
}

impl From<Option<SocialRow>> for Social {
    fn from(row: Option<SocialRow>) -> Self {
        let row = row.unwrap_or_default();
        Self {
            whatsapp: row.whatsapp.unwrap_or_default(),
            instagram: row.instagram.unwrap_or_default(),
            facebook: row.facebook.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub category: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub logo: String,
    pub is_featured: bool,
    pub social: Social,
    pub city: String,
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub active: bool,
    pub city: String,
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub id: String,
    pub image_url: String,
    pub link: Option<String>,
    pub active: bool,
    pub order: i64,
    /// Owning city, or `all`
    pub city: String,
    pub created_at: Option<i64>,
}

/// The pharmacy open outside normal hours in one city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnCallDuty {
    pub id: Option<String>,
    pub pharmacy_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub updated_at: Option<i64>,
}

/// Support contact shown in the footer and on the plans page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminContact {
    pub id: Option<String>,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub social: Social,
    pub city: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    Oferta,
    Evento,
    Cidade,
    Urgente,
    #[serde(other)]
    Other,
}

impl NotificationCategory {
    fn parse(raw: &str) -> Self {
        match raw {
            "oferta" => Self::Oferta,
            "evento" => Self::Evento,
            "cidade" => Self::Cidade,
            "urgente" => Self::Urgente,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub category: NotificationCategory,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub city: String,
    pub created_at: Option<i64>,
}

/// Parse an RFC 3339 timestamp into epoch milliseconds
pub fn epoch_millis(timestamp: Option<&str>) -> Option<i64> {
    let timestamp = timestamp?;
    match chrono::DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => Some(dt.timestamp_millis()),
        // Columns without a zone are taken as UTC
        Err(e) => ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(timestamp, fmt).ok())
            .map(|naive| naive.and_utc().timestamp_millis())
            .or_else(|| {
                tracing::debug!("unparseable timestamp {:?}: {}", timestamp, e);
                None
            }),
    }
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Self {
            created_at: epoch_millis(row.created_at.as_deref()),
            id: row.id,
            name: row.name,
            phone: row.phone,
            category: row.category,
            description: row.description,
            address: row.address,
            logo: row.logo.unwrap_or_default(),
            is_featured: row.is_featured,
            social: row.social.into(),
            city: row.city,
        }
    }
}

impl From<AlertRow> for Alert {
    fn from(row: AlertRow) -> Self {
        Self {
            created_at: epoch_millis(row.created_at.as_deref()),
            id: row.id,
            title: row.title,
            description: row.description,
            image_url: row.image_url,
            link: row.link,
            active: row.active,
            city: row.city,
        }
    }
}

impl From<BannerRow> for Banner {
    fn from(row: BannerRow) -> Self {
        Self {
            created_at: epoch_millis(row.created_at.as_deref()),
            id: row.id,
            image_url: row.image_url,
            link: row.link,
            active: row.active,
            order: row.order_index,
            city: row.city,
        }
    }
}

impl From<OnCallRow> for OnCallDuty {
    fn from(row: OnCallRow) -> Self {
        Self {
            updated_at: epoch_millis(row.updated_at.as_deref()),
            id: row.id,
            pharmacy_name: row.pharmacy_name,
            phone: row.phone,
            address: row.address,
            city: row.city,
        }
    }
}

impl From<AdminSettingsRow> for AdminContact {
    fn from(row: AdminSettingsRow) -> Self {
        Self {
            id: row.id,
            phone: row.phone,
            email: row.email,
            address: row.address,
            social: row.social.into(),
            city: row.city,
        }
    }
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            created_at: epoch_millis(row.created_at.as_deref()),
            category: NotificationCategory::parse(&row.category),
            id: row.id,
            title: row.title,
            message: row.message,
            image_url: row.image_url,
            link: row.link,
            city: row.city,
        }
    }
}

impl AdminContact {
    /// Contact shown before any settings row has been fetched
    pub fn fallback() -> Self {
        Self {
            id: None,
            phone: "(14) 99755-0000".to_string(),
            email: "suporte@guiabc.com".to_string(),
            address: "Bernardino de Campos, SP • Brasil".to_string(),
            social: Social {
                whatsapp: "5514997550000".to_string(),
                ..Social::default()
            },
            city: "bernardino".to_string(),
        }
    }
}

impl Banner {
    /// Global banners shown before the first sync completes
    pub fn fallback() -> Vec<Self> {
        vec![
            Self {
                id: "b1".to_string(),
                image_url: "https://images.unsplash.com/photo-1623033290314-d73e9cf839bb?auto=format&fit=crop&q=80&w=1200&h=400".to_string(),
                link: Some("/planos".to_string()),
                active: true,
                order: 1,
                city: crate::config::ALL_CITIES.to_string(),
                created_at: None,
            },
            Self {
                id: "b2".to_string(),
                image_url: "https://images.unsplash.com/photo-1555396273-367ea4eb4db5?auto=format&fit=crop&q=80&w=1200&h=400".to_string(),
                link: Some("/plantao".to_string()),
                active: true,
                order: 2,
                city: crate::config::ALL_CITIES.to_string(),
                created_at: None,
            },
        ]
    }
}
