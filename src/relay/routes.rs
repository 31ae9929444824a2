// SPDX-License-Identifier: MPL-2.0

//! Request routing for the relay, kept free of any server types so every
//! route can be exercised directly.

use crate::relay::push::PushDelivery;
use serde::Deserialize;
use serde_json::{Value, json};
use std::io::Read;

/// Largest request body accepted (50 MiB)
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct RelayResponse {
    pub status: u16,
    /// JSON body; `None` for empty responses
    pub body: Option<Value>,
}

impl RelayResponse {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }

    pub fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    pub fn payload_too_large() -> Self {
        Self::error(413, "Payload too large")
    }

    pub fn bad_request() -> Self {
        Self::error(400, "Invalid JSON")
    }

    pub fn body_text(&self) -> String {
        self.body.as_ref().map(Value::to_string).unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct SendRequest {
    #[serde(default)]
    subscription: Value,
    #[serde(default)]
    payload: Value,
}

/// An empty body reads as `{}`
fn parse_body(body: &[u8]) -> Result<Value, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    serde_json::from_slice(body)
}

/// Read at most `limit` bytes. `Ok(None)` means the body was larger.
pub fn read_limited(reader: impl Read, limit: usize) -> std::io::Result<Option<Vec<u8>>> {
    let mut body = Vec::new();
    reader.take(limit as u64 + 1).read_to_end(&mut body)?;
    Ok((body.len() <= limit).then_some(body))
}

pub async fn handle<P: PushDelivery>(
    push: &P,
    method: &str,
    url: &str,
    body: &[u8],
) -> RelayResponse {
    let path = url.split('?').next().unwrap_or(url);

    if method.eq_ignore_ascii_case("OPTIONS") {
        return RelayResponse::no_content();
    }

    match (method, path) {
        ("GET", "/api/health") => RelayResponse::json(200, json!({ "status": "ok" })),
        ("POST", "/api/subscribe") => {
            let Ok(subscription) = parse_body(body) else {
                return RelayResponse::bad_request();
            };
            tracing::info!(%subscription, "new subscription received");
            RelayResponse::json(201, json!({}))
        }
        ("POST", "/api/send-notification") => {
            let Ok(value) = parse_body(body) else {
                return RelayResponse::bad_request();
            };
            let request: SendRequest = match serde_json::from_value(value) {
                Ok(request) => request,
                Err(_) => return RelayResponse::bad_request(),
            };

            match push
                .deliver(&request.subscription, &request.payload.to_string())
                .await
            {
                Ok(()) => RelayResponse::json(200, json!({ "success": true })),
                Err(e) => {
                    tracing::error!("error sending notification: {e}");
                    RelayResponse::error(500, "Failed to send notification")
                }
            }
        }
        _ => RelayResponse::error(404, "Not found"),
    }
}
