use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::PathBuf;
use tokio::fs;

use crate::config::AppConfig;

/// Raw sqlx pool underneath the SeaORM connection, used for plain inserts.
pub type DbPool = sqlx::PgPool;

/// Create a pooled SeaORM connection from the app config.
pub async fn create_orm_conn(config: &AppConfig) -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(config.database_url.clone());
    opts.max_connections(config.db_max_connections)
        .connect_timeout(config.db_connect_timeout)
        .sqlx_logging(false);
    connect(opts).await
}

/// Connect with default pool settings; handy for tests and one-off binaries.
pub async fn connect_url(database_url: &str) -> Result<DatabaseConnection> {
    connect(ConnectOptions::new(database_url.to_owned())).await
}

async fn connect(opts: ConnectOptions) -> Result<DatabaseConnection> {
    let conn = Database::connect(opts).await?;
    Ok(conn)
}

pub fn pg_pool(conn: &DatabaseConnection) -> &DbPool {
    conn.get_postgres_connection_pool()
}

/// Minimal migration runner that executes SQL files in `migrations/` in filename order.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    let mut entries = fs::read_dir("migrations").await?;
    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort();

    let backend = conn.get_database_backend();
    for file in files {
        tracing::debug!(file = %file.display(), "applying migration");
        let sql = fs::read_to_string(&file).await?;
        // Postgres prepared statements cannot contain multiple commands,
        // so split the migration file and run each statement individually.
        for stmt in sql.split(';') {
            let stmt = stmt.trim();
            if stmt.is_empty() {
                continue;
            }
            conn.execute(Statement::from_string(backend, format!("{stmt};")))
                .await?;
        }
    }

    Ok(())
}
