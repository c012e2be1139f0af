//! Payment gateway client and checkout signature checks.
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, warn};

use crate::errors::ServiceError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Smallest currency unit (paise).
    pub amount: i64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Public key handed to the checkout widget.
    fn key_id(&self) -> &str;
    async fn create_order(&self, amount: i64, receipt: &str) -> Result<GatewayOrder, ServiceError>;
    /// Checkout callback check: hex HMAC-SHA256 of `"{order_id}|{payment_id}"`.
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;
}

/// Hex HMAC-SHA256 over `"{order_id}|{payment_id}"`.
pub fn sign(secret: &str, order_id: &str, payment_id: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time comparison against the expected signature.
pub fn signature_matches(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(given) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    mac.verify_slice(&given).is_ok()
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

/// Razorpay orders API over HTTPS with basic auth.
pub struct RazorpayGateway {
    client: reqwest::Client,
    api_base: String,
    key_id: String,
    key_secret: String,
    currency: String,
}

impl RazorpayGateway {
    pub fn new(cfg: &configs::PaymentConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            key_id: cfg.key_id.clone(),
            key_secret: cfg.key_secret.clone(),
            currency: cfg.currency.clone(),
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn key_id(&self) -> &str { &self.key_id }

    async fn create_order(&self, amount: i64, receipt: &str) -> Result<GatewayOrder, ServiceError> {
        if self.key_id.is_empty() || self.key_secret.is_empty() {
            return Err(ServiceError::Gateway("payment keys are not configured".into()));
        }
        let url = format!("{}/orders", self.api_base);
        let body = CreateOrderBody { amount, currency: &self.currency, receipt };
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Gateway(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(%status, body = %text, "gateway order rejected");
            return Err(ServiceError::Gateway(format!("order creation failed with status {status}")));
        }
        let order: GatewayOrder = resp.json().await.map_err(|e| ServiceError::Gateway(e.to_string()))?;
        debug!(order_id = %order.id, amount = order.amount, "gateway order created");
        Ok(order)
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        signature_matches(&self.key_secret, order_id, payment_id, signature)
    }
}

/// Deterministic offline gateway for tests and local runs
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    pub struct MockGateway {
        pub secret: String,
        counter: AtomicU64,
    }

    impl MockGateway {
        pub fn new(secret: impl Into<String>) -> Self {
            Self { secret: secret.into(), counter: AtomicU64::new(0) }
        }
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        fn key_id(&self) -> &str { "rzp_test_mock" }

        async fn create_order(&self, amount: i64, _receipt: &str) -> Result<GatewayOrder, ServiceError> {
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(GatewayOrder { id: format!("order_mock_{n}"), amount, currency: "INR".into() })
        }

        fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
            signature_matches(&self.secret, order_id, payment_id, signature)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_roundtrip() {
        let sig = sign("secret", "order_1", "pay_1").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(signature_matches("secret", "order_1", "pay_1", &sig));
        assert!(!signature_matches("secret", "order_1", "pay_2", &sig));
        assert!(!signature_matches("other", "order_1", "pay_1", &sig));
        assert!(!signature_matches("secret", "order_1", "pay_1", "not-hex"));
    }

    #[test]
    fn known_vector() {
        // HMAC-SHA256(key="key", "The quick brown fox jumps over the lazy dog")
        let mut mac = HmacSha256::new_from_slice(b"key").unwrap();
        mac.update(b"The quick brown fox jumps over the lazy dog");
        assert_eq!(
            hex::encode(mac.finalize().into_bytes()),
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[tokio::test]
    async fn mock_orders_are_sequential() {
        let g = mock::MockGateway::new("s");
        let a = g.create_order(50_000, "r1").await.unwrap();
        let b = g.create_order(50_000, "r2").await.unwrap();
        assert_eq!(a.id, "order_mock_1");
        assert_eq!(b.id, "order_mock_2");
        assert_eq!(a.amount, 50_000);
    }
}
