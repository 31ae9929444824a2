// SPDX-License-Identifier: MPL-2.0

//! Client side of push enablement: hand a browser subscription to the relay.

use crate::relay::PushError;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Shown for every failure; the cause only goes to the log
pub const SUBSCRIBE_FAILED: &str =
    "Não foi possível ativar as notificações. Verifique as permissões do seu navegador.";

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .expect("failed to create HTTP client")
});

/// POST `subscription` to `{relay}/api/subscribe`
pub async fn subscribe(relay: &Url, subscription: &Value) -> Result<(), PushError> {
    let url = relay.join("api/subscribe").map_err(|e| {
        tracing::error!("invalid relay url: {e}");
        PushError::Subscribe
    })?;

    let result = HTTP_CLIENT.post(url).json(subscription).send().await;
    match result {
        Ok(response) if response.status().is_success() => {
            tracing::info!("push subscription registered");
            Ok(())
        }
        Ok(response) => {
            tracing::error!(status = %response.status(), "push subscription rejected");
            Err(PushError::Subscribe)
        }
        Err(e) => {
            tracing::error!("push subscription failed: {e}");
            Err(PushError::Subscribe)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_unreachable_relay_reports_generic_message() {
        let relay = Url::parse("http://127.0.0.1:9/").unwrap();
        let err = subscribe(&relay, &json!({"endpoint": "https://push.example/1"}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), SUBSCRIBE_FAILED);
    }
}
