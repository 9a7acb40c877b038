//! CorrelationStore implementation
//!
//! 记录由重定向创建（INSERT 返回 id），由 /api/track 更新。
//! 更新是按 id 的单条 UPDATE，四个关联列同时写入；重复投递后写覆盖先写。

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::{correlation_active_model, model_to_visit_record, new_visit_active_model};
use super::retry;
use crate::errors::{LinktraceError, Result};
use crate::storage::{AttachOutcome, CorrelationStore, CorrelationUpdate, NewVisit, VisitRecord};

use migration::entities::visit_record;

#[async_trait]
impl CorrelationStore for SeaOrmStorage {
    async fn open(&self, visit: NewVisit) -> Result<i64> {
        let db = &self.db;
        let now = chrono::Utc::now();

        // 连接中途断开时不重试，避免重复记录
        let result = retry::with_retry_when(
            "open_visit",
            self.retry_config,
            retry::is_retryable_insert_error,
            || visit_record::Entity::insert(new_visit_active_model(&visit, now)).exec(db),
        )
        .await
        .map_err(|e| LinktraceError::database_operation(format!("创建访问记录失败: {}", e)))?;

        debug!(
            "Visit record {} opened for link {}",
            result.last_insert_id, visit.link_id
        );
        Ok(result.last_insert_id)
    }

    async fn find(&self, id: i64) -> Result<Option<VisitRecord>> {
        let model = visit_record::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LinktraceError::database_operation(format!("查询访问记录失败: {}", e)))?;

        Ok(model.map(model_to_visit_record))
    }

    async fn attach(&self, id: i64, update: CorrelationUpdate) -> Result<AttachOutcome> {
        let db = &self.db;

        // 记录从不删除，存在性检查之后不会失效
        let existing = visit_record::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(|e| LinktraceError::database_operation(format!("查询访问记录失败: {}", e)))?
            .ok_or_else(|| LinktraceError::not_found(format!("访问记录不存在: {}", id)))?;

        retry::with_retry(&format!("attach({})", id), self.retry_config, || {
            visit_record::Entity::update_many()
                .set(correlation_active_model(&update))
                .filter(visit_record::Column::Id.eq(id))
                .exec(db)
        })
        .await
        .map_err(|e| LinktraceError::database_operation(format!("更新访问记录失败: {}", e)))?;

        let overwrote_previous = existing.content_hash.is_some();
        if overwrote_previous {
            info!(
                "Visit {} re-correlated (last write wins), hash {}",
                id,
                update.content_hash()
            );
        }

        Ok(AttachOutcome { overwrote_previous })
    }

    async fn count(&self) -> Result<u64> {
        visit_record::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| LinktraceError::database_operation(format!("统计访问记录失败: {}", e)))
    }
}
