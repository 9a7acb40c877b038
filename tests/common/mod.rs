//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Once};

use linktrace::config::{DatabaseConfig, init_config};
use linktrace::storage::SeaOrmStorage;
use linktrace::storage::backend::retry::RetryConfig;
use linktrace::storage::backend::{connect_sqlite, run_migrations};
use tempfile::TempDir;

static INIT: Once = Once::new();

pub fn init_test_config() {
    INIT.call_once(|| {
        init_config(None);
    });
}

/// 临时 SQLite 数据库（已迁移），TempDir 需与存储同生命周期
pub async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_test_config();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let db = connect_sqlite(&db_url, &DatabaseConfig::default())
        .await
        .expect("Failed to connect to SQLite");
    run_migrations(&db).await.expect("Failed to run migrations");

    let storage = SeaOrmStorage::from_connection(db, "sqlite", RetryConfig::default());
    (Arc::new(storage), temp_dir)
}
