use tracing::{info, warn};

use crate::app::ports::DatasetSinkPort;
use crate::domain::{DatasetRecord, InsertResult};
use crate::error::Result;

/// Use case for staging a filtered dataset into the evaluation platform.
pub struct StageUseCase {
    sink: Box<dyn DatasetSinkPort>,
}

impl StageUseCase {
    pub fn new(sink: Box<dyn DatasetSinkPort>) -> Self {
        Self { sink }
    }

    /// Hand the whole batch to the sink. An empty batch short-circuits
    /// without touching the network.
    pub async fn stage(&self, records: &[DatasetRecord]) -> Result<InsertResult> {
        if records.is_empty() {
            warn!("No records to stage; skipping sink insert");
            return Ok(InsertResult { inserted: 0 });
        }

        info!("Staging {} records into the dataset sink", records.len());
        let result = self.sink.insert(records).await?;
        info!("Sink accepted {} records", result.inserted);
        Ok(result)
    }
}
