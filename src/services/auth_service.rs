//! Authentication service - Signup, login, JWT issuing and Google sign-in.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user_service::register_local_user;
use crate::config::{Config, DEFAULT_PROFILE_IMAGE};
use crate::domain::user::username_from_google;
use crate::domain::{AuthProvider, NewUser, Password, User, UserChanges, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{GoogleProfile, IdentityProvider, UnitOfWork};

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Returned by signup and login
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "johndoe")]
    pub username: String,
    #[schema(example = "user@example.com")]
    pub email: String,
    pub role: UserRole,
    pub image: String,
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
}

/// Validated signup request
#[derive(Debug, Clone)]
pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a user or hotel owner and sign them in
    async fn signup(&self, input: SignupInput) -> AppResult<AuthResponse>;

    /// Login and return JWT token
    async fn login(&self, email: String, password: String) -> AppResult<AuthResponse>;

    /// Profile of the authenticated user
    async fn current_user(&self, id: Uuid) -> AppResult<User>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Google consent screen URL
    fn google_authorization_url(&self) -> AppResult<String>;

    /// Finish Google sign-in and return a JWT
    async fn google_login(&self, code: String) -> AppResult<String>;
}

/// Issue a JWT for a user
pub fn generate_token(user: &User, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(token)
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

fn auth_response(user: User, config: &Config) -> AppResult<AuthResponse> {
    let token = generate_token(&user, config)?;
    Ok(AuthResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
        image: user.image,
        token,
    })
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
    google: Option<Arc<dyn IdentityProvider>>,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, config: Config, google: Option<Arc<dyn IdentityProvider>>) -> Self {
        Self {
            uow,
            config,
            google,
        }
    }

    fn google(&self) -> AppResult<&Arc<dyn IdentityProvider>> {
        self.google
            .as_ref()
            .ok_or(AppError::NotConfigured("Google sign-in"))
    }

    /// Find the account for a Google profile, linking or creating as needed.
    async fn upsert_google_user(&self, profile: GoogleProfile) -> AppResult<User> {
        let users = self.uow.users();

        if let Some(user) = users.find_by_google_id(&profile.sub).await? {
            return Ok(user);
        }

        // The email is what links to or creates a local account
        if !profile.email_verified {
            tracing::warn!(
                google_id = %profile.sub,
                "Google sign-in rejected: email not verified"
            );
            return Err(AppError::forbidden("Google account email is not verified"));
        }

        let email = profile.email.trim().to_lowercase();
        if let Some(existing) = users.find_by_email(&email).await? {
            if existing.google_id.is_some() {
                return Ok(existing);
            }
            let image = profile.picture.unwrap_or(existing.image);
            let linked = users
                .update(
                    existing.id,
                    UserChanges {
                        google_id: Some(profile.sub),
                        auth_provider: Some(AuthProvider::Google),
                        image: Some(image),
                        ..Default::default()
                    },
                )
                .await?;
            tracing::info!(user_id = %linked.id, "Linked Google account");
            return Ok(linked);
        }

        let user = users
            .create(NewUser {
                username: username_from_google(&email, &profile.sub),
                email,
                password_hash: None,
                google_id: Some(profile.sub),
                auth_provider: AuthProvider::Google,
                role: UserRole::User,
                image: Some(
                    profile
                        .picture
                        .unwrap_or_else(|| DEFAULT_PROFILE_IMAGE.to_string()),
                ),
            })
            .await?;
        tracing::info!(user_id = %user.id, "Created account from Google sign-in");
        Ok(user)
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn signup(&self, input: SignupInput) -> AppResult<AuthResponse> {
        let role = input.role.unwrap_or(UserRole::User);
        if role.is_admin() {
            return Err(AppError::bad_request(
                "Role must be either user or hotelOwner",
            ));
        }

        let email = input.email.trim().to_lowercase();
        let user = register_local_user(
            self.uow.users().as_ref(),
            input.username.trim().to_string(),
            email,
            &input.password,
            role,
        )
        .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User signed up");
        auth_response(user, &self.config)
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthResponse> {
        let email = email.trim().to_lowercase();
        let user = self.uow.users().find_by_email(&email).await?;

        // Hash verification runs even for unknown emails so response timing
        // does not reveal which accounts exist.
        let verified = match &user {
            Some(user) => user.verify_password(&password),
            None => {
                Password::verify_dummy(&password);
                false
            }
        };

        match user {
            Some(user) if verified => {
                tracing::info!(user_id = %user.id, "User logged in");
                auth_response(user, &self.config)
            }
            _ => {
                tracing::warn!("Failed login attempt");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    async fn current_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found("User")
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }

    fn google_authorization_url(&self) -> AppResult<String> {
        self.google()?.authorization_url()
    }

    async fn google_login(&self, code: String) -> AppResult<String> {
        let profile = self.google()?.exchange_code(&code).await?;
        let user = self.upsert_google_user(profile).await?;
        generate_token(&user, &self.config)
    }
}
