use crate::{
    config::BackendConfig,
    error::{ComicError, Result},
    models::{HistoryItem, SaveRecord},
    storage::traits::HistoryStore,
};
use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};

pub struct BackendHistoryStore {
    client: Client,
    base_url: String,
}

impl BackendHistoryStore {
    pub fn new(client: Client, config: &BackendConfig) -> Self {
        Self {
            client,
            base_url: config.url().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HistoryStore for BackendHistoryStore {
    async fn save(&self, record: SaveRecord) -> Result<()> {
        log::debug!("Saving to backend: {:?}", record);

        let response = self
            .client
            .post(format!("{}/save", self.base_url))
            .header(ACCEPT, "application/json")
            .json(&record)
            .send()
            .await
            .map_err(|e| ComicError::Request(format!("Backend save failed: {}", e)))?;

        let status = response.status();
        let response_text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ComicError::Request(format!(
                "Backend save returned {}: {}",
                status, response_text
            )));
        }

        match serde_json::from_str::<serde_json::Value>(&response_text) {
            Ok(ack) => log::debug!("Backend acknowledged save: {}", ack),
            Err(e) => log::warn!("Backend save response was not JSON: {}", e),
        }

        Ok(())
    }

    async fn history(&self, limit: usize, skip: usize) -> Result<Vec<HistoryItem>> {
        log::info!("Fetching history (limit={}, skip={})", limit, skip);

        let response = self
            .client
            .get(format!("{}/history", self.base_url))
            .header(ACCEPT, "application/json")
            .query(&[("limit", limit), ("skip", skip)])
            .send()
            .await
            .map_err(|e| ComicError::UpstreamRead(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ComicError::UpstreamRead(format!(
                "Backend returned {}: {}",
                status, error_text
            )));
        }

        response
            .json::<Vec<HistoryItem>>()
            .await
            .map_err(|e| ComicError::UpstreamRead(format!("Invalid history payload: {}", e)))
    }
}
