use async_trait::async_trait;

use crate::domain::{DatasetRecord, InsertResult};
use crate::error::Result;

/// The evaluation platform's dataset ingestion endpoint. Insertion is
/// at-most-once best-effort: one call per batch, no retry or backoff here.
#[async_trait]
pub trait DatasetSinkPort: Send + Sync {
    async fn insert(&self, records: &[DatasetRecord]) -> Result<InsertResult>;
}
