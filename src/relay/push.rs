// SPDX-License-Identifier: MPL-2.0

use crate::config::VapidKeys;
use serde_json::Value;
use thiserror::Error;
use web_push::{
    ContentEncoding, IsahcWebPushClient, SubscriptionInfo, VapidSignatureBuilder, WebPushClient,
    WebPushError, WebPushMessageBuilder,
};

#[derive(Error, Debug)]
pub enum PushError {
    #[error("push delivery is not configured")]
    NotConfigured,
    #[error("invalid push subscription: {0}")]
    InvalidSubscription(String),
    #[error("web push error: {0}")]
    WebPush(#[from] WebPushError),
    #[error("{}", crate::relay::SUBSCRIBE_FAILED)]
    Subscribe,
}

/// Something that can deliver one notification payload to one subscription
#[allow(async_fn_in_trait)]
pub trait PushDelivery {
    async fn deliver(&self, subscription: &Value, payload: &str) -> Result<(), PushError>;
}

/// VAPID-signed delivery. Without keys every send fails with
/// `NotConfigured`, but construction still succeeds.
pub struct WebPushDelivery {
    keys: Option<VapidKeys>,
    client: IsahcWebPushClient,
}

impl WebPushDelivery {
    pub fn new(keys: Option<VapidKeys>) -> Result<Self, PushError> {
        match &keys {
            Some(keys) => tracing::info!(
                public_key = %keys.public_key,
                subject = %keys.subject,
                "web push configured"
            ),
            None => tracing::warn!("VAPID keys not set; notifications cannot be sent"),
        }
        Ok(Self {
            keys,
            client: IsahcWebPushClient::new()?,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.keys.is_some()
    }
}

impl PushDelivery for WebPushDelivery {
    async fn deliver(&self, subscription: &Value, payload: &str) -> Result<(), PushError> {
        let keys = self.keys.as_ref().ok_or(PushError::NotConfigured)?;
        let info: SubscriptionInfo = serde_json::from_value(subscription.clone())
            .map_err(|e| PushError::InvalidSubscription(e.to_string()))?;

        let mut signature = VapidSignatureBuilder::from_base64(&keys.private_key, &info)?;
        signature.add_claim("sub", keys.subject.as_str());

        let mut message = WebPushMessageBuilder::new(&info);
        message.set_payload(ContentEncoding::Aes128Gcm, payload.as_bytes());
        message.set_vapid_signature(signature.build()?);

        self.client.send(message.build()?).await?;
        tracing::debug!(endpoint = %info.endpoint, "notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_unconfigured_delivery_fails() {
        let push = WebPushDelivery::new(None).unwrap();
        assert!(!push.is_configured());
        let err = push
            .deliver(&json!({"endpoint": "https://push.example/abc"}), "{}")
            .await
            .unwrap_err();
        assert!(matches!(err, PushError::NotConfigured));
    }

    #[tokio::test]
    async fn test_malformed_subscription_is_rejected_before_sending() {
        let push = WebPushDelivery::new(Some(VapidKeys {
            public_key: "pub".to_string(),
            private_key: "priv".to_string(),
            subject: "mailto:test@example.com".to_string(),
        }))
        .unwrap();
        let err = push
            .deliver(&json!({"endpoint": 42}), "{}")
            .await
            .unwrap_err();
        assert!(matches!(err, PushError::InvalidSubscription(_)));
    }
}
