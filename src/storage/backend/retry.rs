//! 数据库写操作重试
//!
//! 连接抖动、死锁、SQLite BUSY 等瞬时错误自动重试（指数退避 + 抖动）
//!
//! INSERT 只在语句确定没有执行时重试：连接中途断开时无法知道是否已提交，
//! 重试可能产生重复记录。

use sea_orm::DbErr;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// 重试配置
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// 判断数据库错误是否可重试
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => {
            is_transient_message(&runtime_err.to_string().to_lowercase())
        }
        _ => false,
    }
}

/// 插入可重试：没拿到连接，或语句被锁拒绝；`DbErr::Conn` 结果未知，不重试
pub fn is_retryable_insert_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => {
            is_transient_message(&runtime_err.to_string().to_lowercase())
        }
        _ => false,
    }
}

/// MySQL 1213/1205、PostgreSQL 40001/40P01、SQLite BUSY/LOCKED 的错误文本
fn is_transient_message(msg: &str) -> bool {
    msg.contains("deadlock")
        || msg.contains("lock wait timeout")
        || msg.contains("database is locked")
        || msg.contains("database table is locked")
        || msg.contains("serialization failure")
        || msg.contains("could not serialize access")
}

/// 第 attempt 次重试前的等待时间（毫秒），附加 0-25% 抖动
fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let exp_delay = base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exp_delay.min(max_ms);
    capped.saturating_add(rand::random_range(0..=capped / 4))
}

/// 执行 `operation`，可重试错误最多重试 `max_retries` 次
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    with_retry_when(operation_name, config, is_retryable_error, operation).await
}

/// 同 [`with_retry`]，由 `retryable` 决定哪些错误重试
pub async fn with_retry_when<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    retryable: fn(&DbErr) -> bool,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("'{}' succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt < config.max_retries && retryable(&e) => {
                attempt += 1;
                let delay = calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms);
                warn!(
                    "'{}' failed (attempt {}/{}): {}; retrying in {} ms",
                    operation_name,
                    attempt,
                    config.max_retries + 1,
                    e,
                    delay
                );
                sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 5,
        }
    }

    #[test]
    fn test_retryable_classification() {
        assert!(is_retryable_error(&DbErr::ConnectionAcquire(
            sea_orm::error::ConnAcquireErr::Timeout
        )));
        assert!(is_retryable_error(&DbErr::Exec(
            sea_orm::error::RuntimeErr::Internal("database is locked".to_string())
        )));
        assert!(!is_retryable_error(&DbErr::RecordNotFound("x".to_string())));
        assert!(!is_retryable_error(&DbErr::Exec(
            sea_orm::error::RuntimeErr::Internal("UNIQUE constraint failed".to_string())
        )));
    }

    #[test]
    fn test_insert_is_not_retried_after_lost_connection() {
        let lost = DbErr::Conn(sea_orm::error::RuntimeErr::Internal(
            "connection reset by peer".to_string(),
        ));
        assert!(is_retryable_error(&lost));
        assert!(!is_retryable_insert_error(&lost));

        assert!(is_retryable_insert_error(&DbErr::ConnectionAcquire(
            sea_orm::error::ConnAcquireErr::Timeout
        )));
        assert!(is_retryable_insert_error(&DbErr::Exec(
            sea_orm::error::RuntimeErr::Internal("Deadlock found when trying to get lock".to_string())
        )));
    }

    #[tokio::test]
    async fn test_insert_policy_fails_fast_on_lost_connection() {
        let calls = AtomicU32::new(0);
        let result = with_retry_when("insert", fast(), is_retryable_insert_error, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<(), _>(DbErr::Conn(sea_orm::error::RuntimeErr::Internal(
                    "broken pipe".to_string(),
                )))
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_is_capped() {
        let first = calculate_backoff(1, 100, 2000);
        assert!((100..=125).contains(&first));
        let late = calculate_backoff(12, 100, 2000);
        assert!((2000..=2500).contains(&late));
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = with_retry("op", fast(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(DbErr::ConnectionAcquire(
                        sea_orm::error::ConnAcquireErr::Timeout,
                    ))
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_fast() {
        let calls = AtomicU32::new(0);
        let result = with_retry("op", fast(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(DbErr::RecordNotFound("gone".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
