//! User service - Profile management for the signed-in user.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::user::normalize_recent_cities;
use crate::domain::{
    AuthProvider, NewUser, Password, User, UserChanges, UserFilter, UserRole,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{UnitOfWork, UserRepository};

/// Profile fields a user may change on their own account
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub recent_searched_cities: Option<Vec<String>>,
}

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Update the caller's own profile
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User>;

    /// Change password after verifying the current one
    async fn change_password(
        &self,
        id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<()>;

    /// List all users
    async fn list_users(&self) -> AppResult<Vec<User>>;
}

/// Create a password account after checking email and username are free.
pub(crate) async fn register_local_user(
    users: &dyn UserRepository,
    username: String,
    email: String,
    password: &str,
    role: UserRole,
) -> AppResult<User> {
    if users
        .find_by_email_or_username(&email, &username)
        .await?
        .is_some()
    {
        return Err(AppError::conflict(
            "User with this email or username already exists",
        ));
    }

    let password_hash = Password::new(password)?.into_string();
    users
        .create(NewUser {
            username,
            email,
            password_hash: Some(password_hash),
            google_id: None,
            auth_provider: AuthProvider::Local,
            role,
            image: None,
        })
        .await
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found("User")
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User> {
        let changes = UserChanges {
            username: update.username,
            email: update.email.map(|e| e.trim().to_lowercase()),
            image: update.image,
            recent_searched_cities: update.recent_searched_cities.map(normalize_recent_cities),
            ..Default::default()
        };

        let user = self.uow.users().update(id, changes).await?;
        tracing::debug!(user_id = %id, "Profile updated");
        Ok(user)
    }

    async fn change_password(
        &self,
        id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<()> {
        let user = self.get_user(id).await?;

        let password = user.password().ok_or_else(|| {
            AppError::bad_request("This account signs in with Google and has no password")
        })?;

        if !password.verify(&current_password) {
            return Err(AppError::bad_request("Invalid current password"));
        }

        let new_hash = Password::new(&new_password)?.into_string();
        self.uow
            .users()
            .update(
                id,
                UserChanges {
                    password_hash: Some(new_hash),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(user_id = %id, "Password changed");
        Ok(())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.uow.users().list(UserFilter::default()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{sample_user, MockRepos};

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repos = MockRepos::default();
        repos.users.expect_find_by_id().returning(|_| Ok(None));

        let service = UserManager::new(repos.into_uow());
        let err = service.get_user(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("User")));
    }

    #[tokio::test]
    async fn test_update_profile_normalizes_cities() {
        let mut repos = MockRepos::default();
        repos.users
            .expect_update()
            .withf(|_, changes| {
                changes.recent_searched_cities.as_deref()
                    == Some(&["Goa".to_string(), "Delhi".to_string()][..])
            })
            .returning(|id, _| {
                let mut user = sample_user(UserRole::User);
                user.id = id;
                Ok(user)
            });

        let service = UserManager::new(repos.into_uow());
        let update = ProfileUpdate {
            recent_searched_cities: Some(vec!["Goa".into(), "goa".into(), "Delhi".into()]),
            ..Default::default()
        };
        assert!(service.update_profile(Uuid::new_v4(), update).await.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_rejects_wrong_current() {
        let mut repos = MockRepos::default();
        repos.users
            .expect_find_by_id()
            .returning(|_| Ok(Some(sample_user(UserRole::User))));
        repos.users.expect_update().never();

        let service = UserManager::new(repos.into_uow());
        let err = service
            .change_password(Uuid::new_v4(), "wrong-one".into(), "another-secret".into())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid current password");
    }

    #[tokio::test]
    async fn test_change_password_for_google_account() {
        let mut repos = MockRepos::default();
        repos.users.expect_find_by_id().returning(|_| {
            let mut user = sample_user(UserRole::User);
            user.password_hash = None;
            user.auth_provider = AuthProvider::Google;
            Ok(Some(user))
        });

        let service = UserManager::new(repos.into_uow());
        let err = service
            .change_password(Uuid::new_v4(), "anything".into(), "new-secret".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
