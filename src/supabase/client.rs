// SPDX-License-Identifier: MPL-2.0

use crate::config::AppConfig;
use crate::supabase::query::{Query, Table};
use crate::supabase::types::Session;
use crate::supabase::{ClientError, DirectoryStore};
use once_cell::sync::Lazy;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;
use tokio::sync::watch;
use url::Url;

/// Message the auth service returns for a wrong email/password pair
const INVALID_CREDENTIALS: &str = "Invalid login credentials";
const INVALID_CREDENTIALS_PT: &str = "E-mail ou senha incorretos";

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .pool_max_idle_per_host(6)
        .pool_idle_timeout(Duration::from_secs(90))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(5))
        .build()
        .expect("failed to create HTTP client")
});

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    user: TokenUser,
}

#[derive(Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Error bodies differ between the REST and auth services; take whichever
/// human-readable field is present.
#[derive(Deserialize, Default)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Client for the hosted table store and its auth service.
///
/// Reads use the anon key; once signed in, writes carry the session's
/// access token so row-level policies see the admin user.
pub struct GuiaClient {
    base_url: Url,
    anon_key: String,
    session: RwLock<Option<Session>>,
    session_tx: watch::Sender<Option<Session>>,
}

impl GuiaClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, ClientError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        // Url::join drops the last path segment unless it ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let (session_tx, _) = watch::channel(None);
        Ok(Self {
            base_url,
            anon_key: anon_key.to_string(),
            session: RwLock::new(None),
            session_tx,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::new(&config.supabase_url, &config.supabase_anon_key)
    }

    pub fn rest_url(&self, table: Table) -> Result<Url, ClientError> {
        self.endpoint(&format!("rest/v1/{}", table.name()))
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    fn bearer(&self) -> String {
        self.session
            .read()
            .unwrap()
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        HTTP_CLIENT
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = HTTP_CLIENT
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let message = error_message(response).await;
            return Err(ClientError::Auth(localize_auth_error(&message)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        let session = Session {
            user_id: token.user.id,
            email: token.user.email,
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        };

        self.set_session(Some(session.clone()));
        tracing::info!(user = %session.user_id, "signed in");
        Ok(session)
    }

    /// Revoke the session remotely and forget it locally. The local session is
    /// cleared even when the revoke call fails.
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        let Some(session) = self.session() else {
            return Ok(());
        };

        let url = self.endpoint("auth/v1/logout")?;
        let result = HTTP_CLIENT
            .post(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await;

        self.set_session(None);

        match result {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => Err(ClientError::Auth(error_message(response).await)),
            Err(e) => Err(ClientError::Network(e.to_string())),
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.session.read().unwrap().clone()
    }

    /// Observe sign-in / sign-out transitions
    pub fn subscribe_session(&self) -> watch::Receiver<Option<Session>> {
        self.session_tx.subscribe()
    }

    fn set_session(&self, session: Option<Session>) {
        *self.session.write().unwrap() = session.clone();
        self.session_tx.send_replace(session);
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(response).await;
        Err(ClientError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

impl DirectoryStore for GuiaClient {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>, ClientError> {
        let mut url = self.rest_url(table)?;
        url.query_pairs_mut().extend_pairs(query.to_params());

        let response = self.execute(self.request(Method::GET, url)).await?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn insert(&self, table: Table, row: &Value) -> Result<(), ClientError> {
        let url = self.rest_url(table)?;
        let builder = self
            .request(Method::POST, url)
            .header("Prefer", "return=minimal")
            .json(&[row]);
        self.execute(builder).await?;
        Ok(())
    }

    async fn update(&self, table: Table, id: &str, row: &Value) -> Result<(), ClientError> {
        let mut url = self.rest_url(table)?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        let builder = self
            .request(Method::PATCH, url)
            .header("Prefer", "return=minimal")
            .json(row);
        self.execute(builder).await?;
        Ok(())
    }

    async fn delete(&self, table: Table, id: &str) -> Result<(), ClientError> {
        let mut url = self.rest_url(table)?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        self.execute(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    parse_error_message(status, &text)
}

fn parse_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| status.to_string())
}

fn localize_auth_error(message: &str) -> String {
    if message == INVALID_CREDENTIALS {
        INVALID_CREDENTIALS_PT.to_string()
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_url_keeps_base_path() {
        let client = GuiaClient::new("https://example.supabase.co", "anon").unwrap();
        assert_eq!(
            client.rest_url(Table::OnCall).unwrap().as_str(),
            "https://example.supabase.co/rest/v1/on_call"
        );

        let proxied = GuiaClient::new("http://localhost:8000/supabase", "anon").unwrap();
        assert_eq!(
            proxied.rest_url(Table::Banners).unwrap().as_str(),
            "http://localhost:8000/supabase/rest/v1/banners"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            GuiaClient::new("not a url", "anon"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_error_message_prefers_json_fields() {
        let body = r#"{"code":"23502","message":"null value in column \"name\""}"#;
        assert_eq!(
            parse_error_message(StatusCode::BAD_REQUEST, body),
            "null value in column \"name\""
        );

        let auth = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(
            parse_error_message(StatusCode::BAD_REQUEST, auth),
            "Invalid login credentials"
        );

        assert_eq!(
            parse_error_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(
            parse_error_message(StatusCode::BAD_GATEWAY, ""),
            "502 Bad Gateway"
        );
    }

    #[test]
    fn test_invalid_credentials_are_localized() {
        assert_eq!(
            localize_auth_error("Invalid login credentials"),
            "E-mail ou senha incorretos"
        );
        assert_eq!(
            localize_auth_error("Email not confirmed"),
            "Email not confirmed"
        );
    }

    #[test]
    fn test_session_watch_starts_signed_out() {
        let client = GuiaClient::new("https://example.supabase.co", "anon").unwrap();
        let rx = client.subscribe_session();
        assert!(rx.borrow().is_none());
        assert!(client.session().is_none());
        assert_eq!(client.bearer(), "anon");
    }

    #[test]
    fn test_set_session_notifies_subscribers() {
        let client = GuiaClient::new("https://example.supabase.co", "anon").unwrap();
        let mut rx = client.subscribe_session();
        client.set_session(Some(Session {
            user_id: "u1".to_string(),
            email: Some("admin@guia.com".to_string()),
            access_token: "jwt".to_string(),
            refresh_token: "r".to_string(),
        }));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().map(|s| s.user_id.as_str()), Some("u1"));
        assert_eq!(client.bearer(), "jwt");
    }
}
