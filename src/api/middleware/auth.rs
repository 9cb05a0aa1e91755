//! JWT authentication middleware.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::domain::{Actor, UserRole};
use crate::errors::AppError;

/// Authenticated user extracted from JWT token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    /// Check if user has admin role.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// The caller as seen by the service layer
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

/// Handlers behind `auth_middleware` take `CurrentUser` directly.
#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// JWT authentication middleware.
///
/// Extracts and validates the JWT token from the Authorization header,
/// then injects the CurrentUser into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .ok_or(AppError::Unauthorized)?;

    let claims = state.services.auth().verify_token(token)?;

    let current_user = CurrentUser {
        id: claims.sub,
        email: claims.email,
        role: UserRole::from(claims.role.as_str()),
    };

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("Admin access required"))
    }
}

/// Check the caller's role reaches `required` (admin passes every check).
pub fn require_role(user: &CurrentUser, required: UserRole) -> Result<(), AppError> {
    if user.role.can_access(&required) {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "User role {} is not authorized to access this route",
            user.role
        )))
    }
}

/// Route-level guard for the admin router.
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::Unauthorized)?;
    require_admin(user)?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "someone@example.com".into(),
            role,
        }
    }

    #[test]
    fn test_require_role() {
        assert!(require_role(&user(UserRole::HotelOwner), UserRole::HotelOwner).is_ok());
        assert!(require_role(&user(UserRole::Admin), UserRole::HotelOwner).is_ok());
        assert!(require_role(&user(UserRole::User), UserRole::HotelOwner).is_err());
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&user(UserRole::Admin)).is_ok());
        assert!(matches!(
            require_admin(&user(UserRole::HotelOwner)),
            Err(AppError::Forbidden(_))
        ));
    }
}
