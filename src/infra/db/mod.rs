//! PostgreSQL pool and schema management.

use std::collections::HashSet;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection, DbErr, EntityTrait};
use sea_orm_migration::{seaql_migrations, MigratorTrait};

use crate::config::{
    Config, DB_CONNECT_TIMEOUT_SECONDS, DB_MAX_CONNECTIONS, DB_MIN_CONNECTIONS,
};

pub mod migrations;

pub use migrations::Migrator;

/// One row of `migrate status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationState {
    pub name: String,
    pub applied: bool,
}

/// Shared handle to the marketplace database
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Open the pool and bring the schema up to date.
    pub async fn connect(config: &Config) -> Result<Self, DbErr> {
        let db = Self::open(config).await?;
        db.run_migrations().await.inspect_err(|e| {
            tracing::error!(error = %e, "Schema migration failed");
        })?;
        tracing::info!("Database ready");
        Ok(db)
    }

    /// Open the pool and leave the schema alone, for `migrate`.
    pub async fn open(config: &Config) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(config.database_url.clone());
        options
            .max_connections(DB_MAX_CONNECTIONS)
            .min_connections(DB_MIN_CONNECTIONS)
            .connect_timeout(Duration::from_secs(DB_CONNECT_TIMEOUT_SECONDS))
            .sqlx_logging(false);

        let connection = SeaDatabase::connect(options).await?;
        Ok(Self { connection })
    }

    pub fn get_connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    pub async fn run_migrations(&self) -> Result<(), DbErr> {
        Migrator::up(&self.connection, None).await
    }

    /// Revert the most recent migration only.
    pub async fn rollback_migration(&self) -> Result<(), DbErr> {
        Migrator::down(&self.connection, Some(1)).await
    }

    /// Every known migration, in order, with whether it has been applied.
    pub async fn migration_status(&self) -> Result<Vec<MigrationState>, DbErr> {
        let applied: HashSet<String> = seaql_migrations::Entity::find()
            .all(&self.connection)
            .await?
            .into_iter()
            .map(|row| row.version)
            .collect();

        Ok(Migrator::migrations()
            .iter()
            .map(|migration| {
                let name = migration.name().to_string();
                MigrationState {
                    applied: applied.contains(&name),
                    name,
                }
            })
            .collect())
    }

    /// Drop every table, then apply all migrations again.
    pub async fn fresh_migrations(&self) -> Result<(), DbErr> {
        Migrator::fresh(&self.connection).await
    }

    /// Round trip used by the health check
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection.ping().await
    }
}
