// SPDX-License-Identifier: MPL-2.0

use std::net::SocketAddr;

pub const APP_ID: &str = "io.github.guiadigital.Guia";
pub const APP_NAME: &str = "Guia Digital";

pub const DEFAULT_SUPABASE_URL: &str = "https://xtpvdeqfqokkrdlhvrrx.supabase.co";
pub const DEFAULT_SUPABASE_ANON_KEY: &str = "sb_publishable_ZL1HhCHSh-0iVNA1dP37-w_KX27D-W-";

pub const DEFAULT_RELAY_PORT: u16 = 3000;
pub const DEFAULT_VAPID_SUBJECT: &str = "mailto:example@yourdomain.com";

/// City tag for banners shown in every city
pub const ALL_CITIES: &str = "all";

/// A city the directory has a local guide for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct City {
    pub id: &'static str,
    pub name: &'static str,
    pub state: &'static str,
}

pub const SUPPORTED_CITIES: &[City] = &[
    City {
        id: "bernardino",
        name: "Bernardino de Campos",
        state: "SP",
    },
    City {
        id: "santacruz",
        name: "Santa Cruz do Rio Pardo",
        state: "SP",
    },
    City {
        id: "ipaussu",
        name: "Ipaussu",
        state: "SP",
    },
    City {
        id: "chavantes",
        name: "Chavantes",
        state: "SP",
    },
    City {
        id: "ourinhos",
        name: "Ourinhos",
        state: "SP",
    },
];

pub fn find_city(id: &str) -> Option<&'static City> {
    SUPPORTED_CITIES.iter().find(|c| c.id == id)
}

/// Runtime configuration read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub vapid: Option<VapidKeys>,
    pub relay_addr: SocketAddr,
}

/// VAPID key pair used to sign push messages
#[derive(Debug, Clone)]
pub struct VapidKeys {
    pub public_key: String,
    pub private_key: String,
    pub subject: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            tracing::warn!("failed to load .env: {}", e);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Push stays unconfigured unless both halves of the key pair exist.
        let vapid = match (get("VITE_VAPID_PUBLIC_KEY"), get("VAPID_PRIVATE_KEY")) {
            (Some(public_key), Some(private_key)) => Some(VapidKeys {
                public_key,
                private_key,
                subject: get("VAPID_SUBJECT").unwrap_or_else(|| DEFAULT_VAPID_SUBJECT.to_string()),
            }),
            _ => None,
        };

        let port = get("PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_RELAY_PORT);

        Self {
            supabase_url: get("VITE_SUPABASE_URL")
                .unwrap_or_else(|| DEFAULT_SUPABASE_URL.to_string()),
            supabase_anon_key: get("VITE_SUPABASE_ANON_KEY")
                .unwrap_or_else(|| DEFAULT_SUPABASE_ANON_KEY.to_string()),
            vapid,
            relay_addr: SocketAddr::from(([0, 0, 0, 0], port)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = config_from(&[]);
        assert_eq!(config.supabase_url, DEFAULT_SUPABASE_URL);
        assert_eq!(config.relay_addr.port(), 3000);
        assert!(config.vapid.is_none());
    }

    #[test]
    fn test_vapid_requires_both_keys() {
        let config = config_from(&[("VITE_VAPID_PUBLIC_KEY", "pub")]);
        assert!(config.vapid.is_none());

        let config = config_from(&[("VITE_VAPID_PUBLIC_KEY", "pub"), ("VAPID_PRIVATE_KEY", "")]);
        assert!(config.vapid.is_none());

        let config = config_from(&[("VITE_VAPID_PUBLIC_KEY", "pub"), ("VAPID_PRIVATE_KEY", "priv")]);
        let vapid = config.vapid.expect("vapid configured");
        assert_eq!(vapid.private_key, "priv");
        assert_eq!(vapid.subject, DEFAULT_VAPID_SUBJECT);
    }

    #[test]
    fn test_port_override_and_garbage() {
        assert_eq!(config_from(&[("PORT", "8080")]).relay_addr.port(), 8080);
        assert_eq!(config_from(&[("PORT", "nope")]).relay_addr.port(), 3000);
    }

    #[test]
    fn test_find_city() {
        assert_eq!(find_city("ourinhos").map(|c| c.name), Some("Ourinhos"));
        assert!(find_city("all").is_none());
    }
}
