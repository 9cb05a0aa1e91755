//! Payment service - Gateway orders and checkout signature verification.

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::DEFAULT_CURRENCY;
use crate::errors::{AppError, AppResult};
use crate::infra::{OrderRequest, PaymentGateway};

type HmacSha256 = Hmac<Sha256>;

/// Order details handed to the checkout widget
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    #[schema(example = "order_NbRtC6bZJ5Wqz1")]
    pub order_id: String,
    /// Minor currency units
    #[schema(example = 250000)]
    pub amount: u64,
    #[schema(example = "INR")]
    pub currency: String,
    pub key_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedPayment {
    pub order_id: String,
    pub payment_id: String,
}

/// Convert a major-unit amount to minor units (paise for INR).
pub fn to_minor_units(amount: f64) -> AppResult<u64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::bad_request("Invalid amount"));
    }
    Ok((amount * 100.0).round() as u64)
}

/// Hex HMAC-SHA256 of `order_id|payment_id`, as the gateway computes it.
pub fn sign_payment(key_secret: &str, order_id: &str, payment_id: &str) -> AppResult<String> {
    let mut mac = HmacSha256::new_from_slice(key_secret.as_bytes())
        .map_err(|e| AppError::internal(format!("Invalid HMAC key: {}", e)))?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check a checkout signature in constant time.
pub fn verify_payment_signature(
    key_secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(key_secret.as_bytes()) else {
        return false;
    };
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// Gateway callback fields; any may be missing from the request
#[derive(Debug, Clone, Default)]
pub struct PaymentConfirmation {
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
}

impl PaymentConfirmation {
    /// All three fields, non-blank
    pub fn complete(&self) -> Option<(&str, &str, &str)> {
        fn field(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }
        Some((
            field(&self.order_id)?,
            field(&self.payment_id)?,
            field(&self.signature)?,
        ))
    }
}

#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Create a gateway order for a checkout amount in major units
    async fn create_order(
        &self,
        amount: f64,
        currency: Option<String>,
        receipt: Option<String>,
    ) -> AppResult<CreatedOrder>;

    /// Verify a completed checkout
    fn verify_payment(&self, confirmation: PaymentConfirmation) -> AppResult<VerifiedPayment>;
}

pub struct PaymentProcessor {
    gateway: Option<Arc<dyn PaymentGateway>>,
    key_secret: Option<String>,
}

impl PaymentProcessor {
    pub fn new(gateway: Option<Arc<dyn PaymentGateway>>, key_secret: Option<String>) -> Self {
        Self {
            gateway,
            key_secret,
        }
    }
}

#[async_trait]
impl PaymentService for PaymentProcessor {
    async fn create_order(
        &self,
        amount: f64,
        currency: Option<String>,
        receipt: Option<String>,
    ) -> AppResult<CreatedOrder> {
        let amount = to_minor_units(amount)?;
        let gateway = self
            .gateway
            .as_ref()
            .ok_or(AppError::NotConfigured("Payment gateway"))?;

        let request = OrderRequest {
            amount,
            currency: currency
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            receipt: receipt
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| format!("receipt_{}", Utc::now().timestamp_millis())),
            payment_capture: 1,
        };

        let order = gateway.create_order(request).await?;
        tracing::info!(order_id = %order.id, amount = order.amount, "Payment order created");

        Ok(CreatedOrder {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id: gateway.key_id(),
        })
    }

    fn verify_payment(&self, confirmation: PaymentConfirmation) -> AppResult<VerifiedPayment> {
        let (order_id, payment_id, signature) = confirmation
            .complete()
            .ok_or_else(|| AppError::bad_request("Missing payment verification details"))?;

        let key_secret = self
            .key_secret
            .as_deref()
            .ok_or(AppError::NotConfigured("Payment gateway"))?;

        if !verify_payment_signature(key_secret, order_id, payment_id, signature) {
            tracing::warn!(order_id = %order_id, "Payment signature mismatch");
            return Err(AppError::bad_request(
                "Payment verification failed - Invalid signature",
            ));
        }

        tracing::info!(order_id = %order_id, payment_id = %payment_id, "Payment verified");
        Ok(VerifiedPayment {
            order_id: order_id.to_string(),
            payment_id: payment_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{GatewayOrder, MockPaymentGateway};

    const SECRET: &str = "rzp_test_secret";

    fn confirmation(signature: &str) -> PaymentConfirmation {
        PaymentConfirmation {
            order_id: Some("order_123".into()),
            payment_id: Some("pay_456".into()),
            signature: Some(signature.into()),
        }
    }

    #[test]
    fn test_signature_round_trip_and_tamper() {
        let signature = sign_payment(SECRET, "order_123", "pay_456").unwrap();
        assert_eq!(signature.len(), 64);
        assert!(verify_payment_signature(SECRET, "order_123", "pay_456", &signature));
        assert!(!verify_payment_signature(SECRET, "order_123", "pay_457", &signature));
        assert!(!verify_payment_signature("other", "order_123", "pay_456", &signature));
        assert!(!verify_payment_signature(SECRET, "order_123", "pay_456", "not-hex"));
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(to_minor_units(2500.0).unwrap(), 250_000);
        assert_eq!(to_minor_units(99.99).unwrap(), 9999);
        assert!(to_minor_units(0.0).is_err());
        assert!(to_minor_units(-5.0).is_err());
    }

    #[test]
    fn test_verify_missing_fields() {
        let processor = PaymentProcessor::new(None, Some(SECRET.into()));
        let err = processor
            .verify_payment(PaymentConfirmation {
                order_id: Some("order_123".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing payment verification details");
    }

    #[test]
    fn test_blank_confirmation_fields_count_as_missing() {
        let blank = PaymentConfirmation {
            order_id: Some(" order_1 ".into()),
            payment_id: Some("   ".into()),
            signature: Some("sig".into()),
        };
        assert_eq!(blank.complete(), None);

        let full = PaymentConfirmation {
            payment_id: Some("pay_1".into()),
            ..blank
        };
        assert_eq!(full.complete(), Some(("order_1", "pay_1", "sig")));
    }

    #[test]
    fn test_verify_payment() {
        let processor = PaymentProcessor::new(None, Some(SECRET.into()));
        let signature = sign_payment(SECRET, "order_123", "pay_456").unwrap();

        let verified = processor.verify_payment(confirmation(&signature)).unwrap();
        assert_eq!(verified.payment_id, "pay_456");

        let err = processor.verify_payment(confirmation("deadbeef")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Payment verification failed - Invalid signature"
        );
    }

    #[tokio::test]
    async fn test_create_order_uses_minor_units_and_default_currency() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_order()
            .withf(|order| {
                order.amount == 199_900
                    && order.currency == "INR"
                    && order.receipt.starts_with("receipt_")
                    && order.payment_capture == 1
            })
            .returning(|order| {
                Ok(GatewayOrder {
                    id: "order_abc".into(),
                    amount: order.amount,
                    currency: order.currency,
                })
            });
        gateway
            .expect_key_id()
            .returning(|| "rzp_test_key".to_string());

        let processor = PaymentProcessor::new(Some(Arc::new(gateway)), Some(SECRET.into()));
        let order = processor.create_order(1999.0, None, None).await.unwrap();
        assert_eq!(order.order_id, "order_abc");
        assert_eq!(order.amount, 199_900);
        assert_eq!(order.key_id, "rzp_test_key");
    }

    #[tokio::test]
    async fn test_create_order_without_gateway() {
        let processor = PaymentProcessor::new(None, None);
        let err = processor.create_order(100.0, None, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotConfigured(_)));
    }
}
