use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::api::AppState;
use crate::storage::{CorrelationStore, SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub state: AppState,
}

/// 打开存储（含迁移）并组装服务
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let visits = storage
        .count()
        .await
        .context("Failed to query visit records")?;
    info!("{} visit records in storage", visits);

    let config = crate::config::get_config();
    let state = AppState::new(
        storage.clone(),
        storage.clone(),
        config.tracking.max_payload_bytes,
    );

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext { storage, state })
}
