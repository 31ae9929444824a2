// SPDX-License-Identifier: MPL-2.0

//! Typed admin forms, one per editable entity kind.

use crate::config::ALL_CITIES;
use crate::supabase::Table;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};

static LEADING_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").unwrap());

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyForm {
    pub id: Option<String>,
    pub name: String,
    pub phone: String,
    pub category: String,
    pub description: String,
    pub address: String,
    /// Image reference; uploads arrive here as a data URL
    pub logo: String,
    pub is_featured: bool,
    pub instagram: String,
    pub facebook: String,
    /// Empty means the city currently selected
    pub city: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BannerForm {
    pub id: Option<String>,
    pub image_url: String,
    pub link: String,
    pub active: bool,
    /// Raw order field; anything unparseable counts as 0
    pub order: String,
    /// Show in every city instead of the current one
    pub global: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertForm {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub link: String,
    pub active: bool,
    pub city: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnCallForm {
    pub id: Option<String>,
    pub pharmacy_name: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsForm {
    pub id: Option<String>,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub whatsapp: String,
    pub instagram: String,
    pub facebook: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityForm {
    Company(CompanyForm),
    Banner(BannerForm),
    Alert(AlertForm),
    OnCall(OnCallForm),
    Settings(SettingsForm),
}

/// Entity kinds that can be deleted from the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Company,
    Banner,
    Alert,
}

impl EntityKind {
    pub fn table(self) -> Table {
        match self {
            EntityKind::Company => Table::Companies,
            EntityKind::Banner => Table::Banners,
            EntityKind::Alert => Table::Alerts,
        }
    }
}

fn city_or(current: &str, field: &str) -> String {
    if field.trim().is_empty() {
        current.to_string()
    } else {
        field.trim().to_string()
    }
}

/// Leading integer of the order field; trailing text is ignored and a
/// field without one reads as 0
fn parse_order(field: &str) -> i64 {
    LEADING_INT
        .captures(field)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

impl EntityForm {
    pub fn table(&self) -> Table {
        match self {
            EntityForm::Company(_) => Table::Companies,
            EntityForm::Banner(_) => Table::Banners,
            EntityForm::Alert(_) => Table::Alerts,
            EntityForm::OnCall(_) => Table::OnCall,
            EntityForm::Settings(_) => Table::AdminSettings,
        }
    }

    /// Identity of the record being edited; `None` means create
    pub fn id(&self) -> Option<&str> {
        match self {
            EntityForm::Company(f) => f.id.as_deref(),
            EntityForm::Banner(f) => f.id.as_deref(),
            EntityForm::Alert(f) => f.id.as_deref(),
            EntityForm::OnCall(f) => f.id.as_deref(),
            EntityForm::Settings(f) => f.id.as_deref(),
        }
        .filter(|id| !id.is_empty())
    }

    /// Row payload in the store's column names. `now` is stamped into
    /// `updated_at` for on-call records.
    pub fn to_row(&self, current_city: &str, now: chrono::DateTime<chrono::Utc>) -> Value {
        match self {
            EntityForm::Company(f) => json!({
                "name": f.name,
                "phone": f.phone,
                "category": f.category,
                "description": f.description,
                "address": f.address,
                "logo": f.logo,
                "is_featured": f.is_featured,
                "city": city_or(current_city, &f.city),
                "social": {
                    // The listing phone doubles as the WhatsApp number
                    "whatsapp": f.phone,
                    "instagram": f.instagram,
                    "facebook": f.facebook,
                },
            }),
            EntityForm::Banner(f) => json!({
                "image_url": f.image_url,
                "link": f.link,
                "active": f.active,
                "order_index": parse_order(&f.order),
                "city": if f.global { ALL_CITIES } else { current_city },
            }),
            EntityForm::Alert(f) => json!({
                "title": f.title,
                "description": f.description,
                "image_url": f.image_url,
                "link": f.link,
                "active": f.active,
                "city": city_or(current_city, &f.city),
            }),
            EntityForm::OnCall(f) => json!({
                "pharmacy_name": f.pharmacy_name,
                "phone": f.phone,
                "address": f.address,
                "city": current_city,
                "updated_at": now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            }),
            EntityForm::Settings(f) => json!({
                "phone": f.phone,
                "email": f.email,
                "address": f.address,
                "social": {
                    "whatsapp": f.whatsapp,
                    "instagram": f.instagram,
                    "facebook": f.facebook,
                },
                "city": current_city,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc.with_ymd_and_hms(2024, 6, 1, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_company_row_defaults_city_and_copies_phone_to_whatsapp() {
        let form = EntityForm::Company(CompanyForm {
            name: "Mercado Bom Preço".to_string(),
            phone: "(14) 3346-5555".to_string(),
            category: "Mercado".to_string(),
            is_featured: true,
            instagram: "bompreco".to_string(),
            ..CompanyForm::default()
        });
        let row = form.to_row("ipaussu", now());
        assert_eq!(row["city"], "ipaussu");
        assert_eq!(row["is_featured"], true);
        assert_eq!(row["social"]["whatsapp"], "(14) 3346-5555");
        assert_eq!(row["social"]["instagram"], "bompreco");
        assert_eq!(form.table(), Table::Companies);
        assert!(form.id().is_none());
    }

    #[test]
    fn test_explicit_city_wins() {
        let form = EntityForm::Alert(AlertForm {
            title: "Falta de água".to_string(),
            city: "ourinhos".to_string(),
            active: true,
            ..AlertForm::default()
        });
        assert_eq!(form.to_row("bernardino", now())["city"], "ourinhos");
    }

    #[test]
    fn test_banner_global_and_order_parsing() {
        let mut banner = BannerForm {
            image_url: "data:image/png;base64,AA==".to_string(),
            order: " 3 ".to_string(),
            global: true,
            active: true,
            ..BannerForm::default()
        };
        let row = EntityForm::Banner(banner.clone()).to_row("chavantes", now());
        assert_eq!(row["city"], "all");
        assert_eq!(row["order_index"], 3);

        banner.global = false;
        banner.order = "primeiro".to_string();
        let row = EntityForm::Banner(banner).to_row("chavantes", now());
        assert_eq!(row["city"], "chavantes");
        assert_eq!(row["order_index"], 0);
    }

    #[test]
    fn test_order_keeps_leading_integer() {
        assert_eq!(parse_order("3a"), 3);
        assert_eq!(parse_order(" -2x"), -2);
        assert_eq!(parse_order("+7"), 7);
        assert_eq!(parse_order("12 banners"), 12);
        assert_eq!(parse_order("primeiro"), 0);
        assert_eq!(parse_order(""), 0);

        let banner = BannerForm {
            order: "3a".to_string(),
            ..BannerForm::default()
        };
        let row = EntityForm::Banner(banner).to_row("chavantes", now());
        assert_eq!(row["order_index"], 3);
    }

    #[test]
    fn test_on_call_stamps_updated_at() {
        let form = EntityForm::OnCall(OnCallForm {
            id: Some("7".to_string()),
            pharmacy_name: "Farmácia Central".to_string(),
            ..OnCallForm::default()
        });
        let row = form.to_row("bernardino", now());
        assert_eq!(row["updated_at"], "2024-06-01T15:30:00.000Z");
        assert_eq!(form.id(), Some("7"));
    }

    #[test]
    fn test_empty_id_means_create() {
        let form = EntityForm::Settings(SettingsForm {
            id: Some(String::new()),
            ..SettingsForm::default()
        });
        assert!(form.id().is_none());
        assert_eq!(form.table(), Table::AdminSettings);
    }
}
