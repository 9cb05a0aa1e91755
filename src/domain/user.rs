//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Password;
use crate::config::{MAX_RECENT_SEARCHED_CITIES, ROLE_ADMIN, ROLE_HOTEL_OWNER, ROLE_USER};
use crate::errors::AppError;

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
    User,
    HotelOwner,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Check if this role can access a required role.
    ///
    /// Admin passes every check; a hotel owner passes owner and user checks.
    pub fn can_access(&self, required: &UserRole) -> bool {
        match self {
            UserRole::Admin => true,
            UserRole::HotelOwner => !matches!(required, UserRole::Admin),
            UserRole::User => matches!(required, UserRole::User),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => ROLE_USER,
            UserRole::HotelOwner => ROLE_HOTEL_OWNER,
            UserRole::Admin => ROLE_ADMIN,
        }
    }
}

/// Lenient conversion for stored values; unknown roles degrade to `User`.
impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            ROLE_HOTEL_OWNER => UserRole::HotelOwner,
            _ => UserRole::User,
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_USER => Ok(UserRole::User),
            ROLE_HOTEL_OWNER => Ok(UserRole::HotelOwner),
            ROLE_ADMIN => Ok(UserRole::Admin),
            other => Err(AppError::validation(format!("Invalid role: {}", other))),
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an account signs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Local,
    Google,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Local => "local",
            AuthProvider::Google => "google",
        }
    }
}

impl From<&str> for AuthProvider {
    fn from(s: &str) -> Self {
        match s {
            "google" => AuthProvider::Google,
            _ => AuthProvider::Local,
        }
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Absent for accounts created through Google sign-in
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    #[serde(skip_serializing)]
    pub google_id: Option<String>,
    pub auth_provider: AuthProvider,
    pub role: UserRole,
    pub image: String,
    pub recent_searched_cities: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Stored password, if the account has one
    pub fn password(&self) -> Option<Password> {
        self.password_hash.clone().map(Password::from_hash)
    }

    /// Verify a login attempt. Accounts without a password never match.
    pub fn verify_password(&self, plain_text: &str) -> bool {
        match self.password() {
            Some(password) => password.verify(plain_text),
            None => {
                Password::verify_dummy(plain_text);
                false
            }
        }
    }
}

/// The authenticated caller of a use case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: Uuid, role: UserRole) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Fields needed to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub auth_provider: AuthProvider,
    pub role: UserRole,
    pub image: Option<String>,
}

/// Partial user update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub role: Option<UserRole>,
    pub recent_searched_cities: Option<Vec<String>>,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub auth_provider: Option<AuthProvider>,
}

/// Admin user listing filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    /// Case-insensitive substring over username or email
    pub search: Option<String>,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "johndoe")]
    pub username: String,
    #[schema(example = "user@example.com")]
    pub email: String,
    #[schema(example = "user")]
    pub role: UserRole,
    pub image: String,
    pub auth_provider: AuthProvider,
    pub recent_searched_cities: Vec<String>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            image: user.image,
            auth_provider: user.auth_provider,
            recent_searched_cities: user.recent_searched_cities,
            created_at: user.created_at,
        }
    }
}

/// Minimal user projection embedded in hotels and bookings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Normalize a recently-searched-cities list.
///
/// Input is most recent first. Blank entries are dropped, later duplicates
/// (case-insensitive) are removed and the list is capped.
pub fn normalize_recent_cities(cities: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(MAX_RECENT_SEARCHED_CITIES);
    let mut result = Vec::with_capacity(MAX_RECENT_SEARCHED_CITIES);

    for city in cities {
        let trimmed = city.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        result.push(trimmed.to_string());
        if result.len() == MAX_RECENT_SEARCHED_CITIES {
            break;
        }
    }

    result
}

/// Username for an account created through Google sign-in.
///
/// `<email local part>_<first 6 chars of the google id>`
pub fn username_from_google(email: &str, google_id: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    let suffix: String = google_id.chars().take(6).collect();
    format!("{}_{}", local, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_uses_camel_case() {
        assert_eq!(
            serde_json::to_string(&UserRole::HotelOwner).unwrap(),
            "\"hotelOwner\""
        );
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, UserRole::Admin);
    }

    #[test]
    fn test_role_hierarchy() {
        assert!(UserRole::Admin.can_access(&UserRole::HotelOwner));
        assert!(UserRole::HotelOwner.can_access(&UserRole::HotelOwner));
        assert!(UserRole::HotelOwner.can_access(&UserRole::User));
        assert!(!UserRole::HotelOwner.can_access(&UserRole::Admin));
        assert!(!UserRole::User.can_access(&UserRole::HotelOwner));
    }

    #[test]
    fn test_role_from_str_is_strict() {
        assert_eq!("hotelOwner".parse::<UserRole>().unwrap(), UserRole::HotelOwner);
        assert!("superadmin".parse::<UserRole>().is_err());
        assert_eq!(UserRole::from("superadmin"), UserRole::User);
    }

    #[test]
    fn test_recent_cities_dedup_and_cap() {
        let cities = vec![
            "Goa".to_string(),
            " goa ".to_string(),
            "".to_string(),
            "Delhi".to_string(),
            "Mumbai".to_string(),
            "Pune".to_string(),
        ];
        assert_eq!(normalize_recent_cities(cities), vec!["Goa", "Delhi", "Mumbai"]);
    }

    #[test]
    fn test_username_from_google() {
        assert_eq!(
            username_from_google("jane.doe@gmail.com", "1098765432"),
            "jane.doe_109876"
        );
    }
}
