use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::app::ports::DatasetSinkPort;
use crate::config::SinkConfig;
use crate::constants::SINK_API_KEY_ENV;
use crate::domain::{DatasetRecord, InsertResult};
use crate::error::{EtlError, Result};

/// REST adapter for the evaluation platform's dataset ingestion endpoint.
/// Endpoint coordinates come from configuration; the API key comes from the
/// environment and never lands in config files.
#[derive(Debug)]
pub struct HttpDatasetSink {
    client: reqwest::Client,
    insert_url: String,
    project: String,
    dataset: String,
    api_key: String,
}

impl HttpDatasetSink {
    pub fn from_config(config: &SinkConfig) -> Result<Self> {
        let api_key = std::env::var(SINK_API_KEY_ENV)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        let insert_url = format!("{}/v1/dataset/insert", config.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            insert_url,
            project: config.project.clone(),
            dataset: config.dataset.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl DatasetSinkPort for HttpDatasetSink {
    async fn insert(&self, records: &[DatasetRecord]) -> Result<InsertResult> {
        let body = json!({
            "project": self.project,
            "dataset": self.dataset,
            "submitted_at": chrono::Utc::now().to_rfc3339(),
            "records": records,
        });

        debug!("POST {} with {} records", self.insert_url, records.len());
        let response = self
            .client
            .post(&self.insert_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EtlError::SinkInsert(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EtlError::SinkInsert(format!(
                "HTTP {}: {}",
                status.as_u16(),
                detail
            )));
        }

        info!(
            "Sink accepted batch of {} records into dataset '{}'",
            records.len(),
            self.dataset
        );
        Ok(InsertResult {
            inserted: records.len(),
        })
    }
}
