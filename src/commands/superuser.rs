//! Create-superuser command - Bootstraps the first administrator.

use std::sync::Arc;

use crate::cli::args::SuperuserArgs;
use crate::config::Config;
use crate::domain::User;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Persistence, UnitOfWork};
use crate::services::{AdminManager, AdminService};

/// Execute the create-superuser command
pub async fn execute(args: SuperuserArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let uow = Arc::new(Persistence::new(db.get_connection()));

    match ensure_superuser(uow, args.username, args.email, args.password).await? {
        Some(admin) => {
            tracing::info!(user_id = %admin.id, email = %admin.email, "Superuser created")
        }
        None => tracing::info!("Superuser already exists, nothing to do"),
    }

    Ok(())
}

/// Create an admin unless one with this email already exists.
///
/// Returns `None` when the admin was already there. An existing non-admin
/// account with the same email is reported as a conflict rather than promoted.
pub async fn ensure_superuser<U: UnitOfWork>(
    uow: Arc<U>,
    username: String,
    email: String,
    password: String,
) -> AppResult<Option<User>> {
    let email = email.trim().to_lowercase();

    if let Some(existing) = uow.users().find_by_email(&email).await? {
        if existing.is_admin() {
            return Ok(None);
        }
        return Err(AppError::conflict(format!(
            "{} is registered as {}, not as an admin",
            email, existing.role
        )));
    }

    let admin = AdminManager::new(uow)
        .create_superuser(username, email, password)
        .await?;
    Ok(Some(admin))
}
