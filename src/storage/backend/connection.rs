//! Connection setup for the visit store
//!
//! 所有超时都来自 `[database]` 配置；内存 SQLite 只用单连接，
//! 否则池里每个连接各自看到一个空库。

use std::str::FromStr;
use std::time::Duration;

use sea_orm::sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, SqlxSqliteConnector};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::errors::{LinktraceError, Result};
use migration::{Migrator, MigratorTrait};

/// Open a connection for `backend` ("sqlite", "mysql" or "postgres")
pub async fn connect(
    database_url: &str,
    backend: &str,
    config: &DatabaseConfig,
) -> Result<DatabaseConnection> {
    match backend {
        "sqlite" => connect_sqlite(database_url, config).await,
        "mysql" | "postgres" => connect_generic(database_url, backend, config).await,
        other => Err(LinktraceError::database_config(format!(
            "不支持的数据库类型: {}",
            other
        ))),
    }
}

fn is_in_memory(database_url: &str) -> bool {
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    path == ":memory:" || path.starts_with(":memory:?")
}

/// SQLite：不存在则创建，文件库使用 WAL
pub async fn connect_sqlite(
    database_url: &str,
    config: &DatabaseConfig,
) -> Result<DatabaseConnection> {
    let in_memory = is_in_memory(database_url);
    let busy_timeout = Duration::from_secs(config.timeout);

    let mut opt = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| LinktraceError::database_config(format!("SQLite URL 解析失败: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(busy_timeout);
    if !in_memory {
        opt = opt
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
    }

    let max_connections = if in_memory { 1 } else { config.pool_size.max(1) };
    debug!(
        "Opening SQLite pool: {} connection(s), busy timeout {}s",
        max_connections, config.timeout
    );

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(busy_timeout)
        .connect_with(opt)
        .await
        .map_err(|e| {
            LinktraceError::database_connection(format!("无法连接到 SQLite 数据库: {}", e))
        })?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// MySQL/MariaDB 与 PostgreSQL
pub async fn connect_generic(
    database_url: &str,
    backend: &str,
    config: &DatabaseConfig,
) -> Result<DatabaseConnection> {
    let timeout = Duration::from_secs(config.timeout);

    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(config.pool_size)
        .min_connections(config.pool_size.min(2))
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    Database::connect(opt).await.map_err(|e| {
        LinktraceError::database_connection(format!(
            "无法连接到 {} 数据库: {}",
            backend.to_uppercase(),
            e
        ))
    })
}

/// Bring the schema (links, visit records) up to date
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| LinktraceError::database_operation(format!("迁移失败: {}", e)))?;

    info!("Database migrations completed");
    Ok(())
}
