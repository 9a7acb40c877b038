//! Storage seams used by the HTTP layer and services

use async_trait::async_trait;

use super::models::{AttachOutcome, CorrelationUpdate, NewVisit, ShortLink, VisitRecord};
use crate::errors::Result;

/// Short code → target lookup and creation
///
/// Codes are compared case-insensitively; implementations store them
/// lowercased.
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn resolve(&self, code: &str) -> Result<Option<ShortLink>>;

    /// Returns the new link id; `Conflict` when the code is taken
    async fn create(&self, code: &str, target: &str) -> Result<i64>;

    async fn exists(&self, code: &str) -> Result<bool>;
}

/// Correlation records: opened once per redirect, enriched later
#[async_trait]
pub trait CorrelationStore: Send + Sync {
    /// Insert a provisional record and return its tracking id
    async fn open(&self, visit: NewVisit) -> Result<i64>;

    async fn find(&self, id: i64) -> Result<Option<VisitRecord>>;

    /// Write all correlation columns of record `id` in one statement.
    ///
    /// `NotFound` when no such record exists; never inserts. A second
    /// call for the same id replaces the first (last write wins).
    async fn attach(&self, id: i64, update: CorrelationUpdate) -> Result<AttachOutcome>;

    async fn count(&self) -> Result<u64>;
}
