//! Google OAuth 2.0 authorization-code client.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::config::{
    GoogleOAuthConfig, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, GOOGLE_USERINFO_URL,
    HTTP_CLIENT_TIMEOUT_SECONDS,
};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Profile fields read from the userinfo endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GoogleProfile {
    /// Stable Google account id
    pub sub: String,
    pub email: String,
    /// Missing counts as unverified
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Identity provider seam for Google sign-in.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Consent screen URL the browser is redirected to
    fn authorization_url(&self) -> AppResult<String>;

    /// Exchange an authorization code for the signed-in profile
    async fn exchange_code(&self, code: &str) -> AppResult<GoogleProfile>;
}

/// reqwest-backed Google client
pub struct GoogleOAuthClient {
    http: Client,
    config: GoogleOAuthConfig,
}

impl GoogleOAuthClient {
    pub fn new(config: GoogleOAuthConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_CLIENT_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| AppError::internal(format!("HTTP client build failed: {}", e)))?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuthClient {
    fn authorization_url(&self) -> AppResult<String> {
        let url = Url::parse_with_params(
            GOOGLE_AUTH_URL,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", "profile email"),
                ("prompt", "select_account"),
            ],
        )
        .map_err(|e| AppError::internal(format!("Invalid Google auth URL: {}", e)))?;

        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> AppResult<GoogleProfile> {
        let token: TokenResponse = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::gateway(format!("Google token request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::gateway(format!("Google token exchange rejected: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::gateway(format!("Invalid Google token response: {}", e)))?;

        let profile: GoogleProfile = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| AppError::gateway(format!("Google userinfo request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::gateway(format!("Google userinfo rejected: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::gateway(format!("Invalid Google profile: {}", e)))?;

        Ok(profile)
    }
}
