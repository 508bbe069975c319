//! Database connection and migration control.

use common::DatabaseConfig;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr,
    Statement,
};
use sea_orm_migration::{MigrationStatus, MigratorTrait};

use super::migrations::Migrator;
use crate::MigrateAction;

/// Connection pool shared by the repository and the health check.
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

/// A known migration and whether it has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationState {
    pub name: String,
    pub applied: bool,
}

impl Database {
    /// Connect and bring the schema up to date.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let db = Self::connect_without_migrations(config).await?;
        db.migrate(MigrateAction::Up).await?;
        tracing::info!("Database connected and migrations applied");
        Ok(db)
    }

    pub async fn connect_without_migrations(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .sqlx_logging(false);

        Ok(Self {
            connection: SeaDatabase::connect(options).await?,
        })
    }

    pub fn get_connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    /// Apply `action`, then report every migration with its state.
    ///
    /// `Down` rolls back a single step; `Status` changes nothing.
    pub async fn migrate(&self, action: MigrateAction) -> Result<Vec<MigrationState>, DbErr> {
        let db = &self.connection;
        match action {
            MigrateAction::Up => Migrator::up(db, None).await?,
            MigrateAction::Down => Migrator::down(db, Some(1)).await?,
            MigrateAction::Fresh => Migrator::fresh(db).await?,
            MigrateAction::Status => {}
        }

        Ok(Migrator::get_migration_with_status(db)
            .await?
            .iter()
            .map(|m| MigrationState {
                name: m.name().to_string(),
                applied: matches!(m.status(), MigrationStatus::Applied),
            })
            .collect())
    }

    pub async fn ping(&self) -> Result<(), DbErr> {
        let backend = self.connection.get_database_backend();
        self.connection
            .execute(Statement::from_string(backend, "SELECT 1"))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;

    #[tokio::test]
    async fn test_ping() {
        let db = Database {
            connection: MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_exec_errors([DbErr::Custom("connection closed".into())])
                .into_connection(),
        };

        assert!(db.ping().await.is_ok());
        assert!(db.ping().await.is_err());
    }
}
