//! Razorpay orders API client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{RazorpayConfig, HTTP_CLIENT_TIMEOUT_SECONDS, RAZORPAY_API_BASE};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Order creation payload, amount in minor units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
    /// 1 = capture automatically once authorized
    pub payment_capture: u8,
}

/// Order as returned by the gateway
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
}

/// Payment gateway seam; the HTTP client in production, a mock in tests.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Public key id handed to the checkout widget
    fn key_id(&self) -> String;

    async fn create_order(&self, order: OrderRequest) -> AppResult<GatewayOrder>;
}

/// reqwest-backed Razorpay client
pub struct RazorpayClient {
    http: Client,
    config: RazorpayConfig,
    base_url: String,
}

impl RazorpayClient {
    pub fn new(config: RazorpayConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_CLIENT_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| AppError::internal(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http,
            config,
            base_url: RAZORPAY_API_BASE.to_string(),
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    fn key_id(&self) -> String {
        self.config.key_id.clone()
    }

    async fn create_order(&self, order: OrderRequest) -> AppResult<GatewayOrder> {
        let url = format!("{}/orders", self.base_url);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&order)
            .send()
            .await
            .map_err(|e| AppError::gateway(format!("Razorpay network error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::gateway(format!(
                "Razorpay order creation failed ({}): {}",
                status, body
            )));
        }

        let created: GatewayOrder = response
            .json()
            .await
            .map_err(|e| AppError::gateway(format!("Invalid Razorpay order response: {}", e)))?;

        tracing::info!(order_id = %created.id, amount = created.amount, "Payment order created");
        Ok(created)
    }
}
