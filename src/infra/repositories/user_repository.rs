//! User repository implementation.

use async_trait::async_trait;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::query::{conflict_on_unique, contains_pattern};
use crate::config::DEFAULT_PROFILE_IMAGE;
use crate::domain::{NewUser, User, UserChanges, UserFilter, UserRole};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const DUPLICATE_USER: &str = "User with this email or username already exists";

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find users by IDs; missing IDs are skipped
    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<User>>;

    /// Find user by email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find user whose email or username matches
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> AppResult<Option<User>>;

    /// Find user linked to a Google account
    async fn find_by_google_id(&self, google_id: &str) -> AppResult<Option<User>>;

    /// Create a new user. Duplicate email or username yields a conflict.
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Apply a partial update
    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User>;

    /// Permanently delete user; owned hotels and bookings cascade
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// List users newest first
    async fn list(&self, filter: UserFilter) -> AppResult<Vec<User>>;

    /// Count users, optionally restricted to one role
    async fn count(&self, role: Option<UserRole>) -> AppResult<u64>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = UserEntity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Email.eq(email))
                    .add(user::Column::Username.eq(username)),
            )
            .one(&self.db)
            .await?;
        Ok(result.map(User::from))
    }

    async fn find_by_google_id(&self, google_id: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::GoogleId.eq(google_id))
            .one(&self.db)
            .await?;
        Ok(result.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            google_id: Set(new_user.google_id),
            auth_provider: Set(new_user.auth_provider.as_str().to_string()),
            role: Set(new_user.role.as_str().to_string()),
            image: Set(new_user
                .image
                .unwrap_or_else(|| DEFAULT_PROFILE_IMAGE.to_string())),
            recent_searched_cities: Set(Vec::new()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_USER))?;
        Ok(User::from(model))
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        let user = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("User"))?;

        let mut active: ActiveModel = user.into();

        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(image) = changes.image {
            active.image = Set(image);
        }
        if let Some(role) = changes.role {
            active.role = Set(role.as_str().to_string());
        }
        if let Some(cities) = changes.recent_searched_cities {
            active.recent_searched_cities = Set(cities);
        }
        if let Some(hash) = changes.password_hash {
            active.password_hash = Set(Some(hash));
        }
        if let Some(google_id) = changes.google_id {
            active.google_id = Set(Some(google_id));
        }
        if let Some(provider) = changes.auth_provider {
            active.auth_provider = Set(provider.as_str().to_string());
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_USER))?;
        Ok(User::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User"));
        }

        Ok(())
    }

    async fn list(&self, filter: UserFilter) -> AppResult<Vec<User>> {
        let mut query = UserEntity::find();

        if let Some(role) = filter.role {
            query = query.filter(user::Column::Role.eq(role.as_str()));
        }
        if let Some(search) = filter.search {
            let pattern = contains_pattern(&search);
            query = query.filter(
                Condition::any()
                    .add(Expr::col((user::Entity, user::Column::Username)).ilike(pattern.clone()))
                    .add(Expr::col((user::Entity, user::Column::Email)).ilike(pattern)),
            );
        }

        let models = query
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn count(&self, role: Option<UserRole>) -> AppResult<u64> {
        let mut query = UserEntity::find();
        if let Some(role) = role {
            query = query.filter(user::Column::Role.eq(role.as_str()));
        }
        Ok(query.count(&self.db).await?)
    }
}
