//! LinkStore implementation

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, SqlErr};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::{model_to_shortlink, new_link_active_model};
use super::retry;
use crate::errors::{LinktraceError, Result};
use crate::storage::{LinkStore, ShortLink};
use crate::utils::normalize_short_code;

use migration::entities::short_link;

#[async_trait]
impl LinkStore for SeaOrmStorage {
    async fn resolve(&self, code: &str) -> Result<Option<ShortLink>> {
        let code = normalize_short_code(code);
        let db = &self.db;

        let model = retry::with_retry(&format!("resolve({})", code), self.retry_config, || {
            short_link::Entity::find()
                .filter(short_link::Column::ShortCode.eq(code.as_str()))
                .one(db)
        })
        .await
        .map_err(|e| LinktraceError::database_operation(format!("查询短链接失败: {}", e)))?;

        Ok(model.map(model_to_shortlink))
    }

    async fn create(&self, code: &str, target: &str) -> Result<i64> {
        let code = normalize_short_code(code);
        let db = &self.db;

        let result = retry::with_retry_when(
            &format!("create({})", code),
            self.retry_config,
            retry::is_retryable_insert_error,
            || {
                short_link::Entity::insert(new_link_active_model(&code, target, chrono::Utc::now()))
                    .exec(db)
            },
        )
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                LinktraceError::conflict(format!("短码已存在: {}", code))
            }
            _ => LinktraceError::database_operation(format!("创建短链接失败: {}", e)),
        })?;

        info!("Short link created: {} -> {}", code, target);
        Ok(result.last_insert_id)
    }

    async fn exists(&self, code: &str) -> Result<bool> {
        let code = normalize_short_code(code);

        let count = short_link::Entity::find()
            .filter(short_link::Column::ShortCode.eq(code.as_str()))
            .count(&self.db)
            .await
            .map_err(|e| LinktraceError::database_operation(format!("查询短链接失败: {}", e)))?;

        debug!("exists({}) = {}", code, count > 0);
        Ok(count > 0)
    }
}
