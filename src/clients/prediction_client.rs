use crate::{
    clients::traits::ImagePredictor,
    config::ImageConfig,
    error::{ComicError, Result},
    models::{Prediction, PredictionRequest},
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

#[derive(Clone)]
pub struct PredictionClient {
    client: Client,
    config: ImageConfig,
}

impl PredictionClient {
    pub fn new(client: Client, config: ImageConfig) -> Self {
        Self { client, config }
    }

    fn api_token(&self) -> Result<&str> {
        self.config
            .api_token
            .as_deref()
            .ok_or_else(|| ComicError::Configuration("Missing Replicate API token".into()))
    }

    fn predictions_url(&self) -> String {
        format!("{}/predictions", self.config.base_url().trim_end_matches('/'))
    }

    async fn read_prediction(response: reqwest::Response) -> Result<Prediction> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ComicError::Request(format!(
                "Prediction service returned {}: {}",
                status, error_text
            )));
        }

        response
            .json::<Prediction>()
            .await
            .map_err(|e| ComicError::Response(e.to_string()))
    }

    async fn fetch(&self, id: &str) -> Result<Prediction> {
        let response = self
            .client
            .get(format!("{}/{}", self.predictions_url(), id))
            .bearer_auth(self.api_token()?)
            .send()
            .await
            .map_err(|e| ComicError::Request(format!("Prediction poll failed: {}", e)))?;

        Self::read_prediction(response).await
    }
}

#[async_trait]
impl ImagePredictor for PredictionClient {
    async fn create(&self, request: PredictionRequest) -> Result<Prediction> {
        let api_token = self.api_token()?;

        log::info!("Creating prediction with model version: {}", request.version);
        log::debug!(
            "Prediction request payload: {}",
            serde_json::to_string(&request).unwrap_or_default()
        );

        let response = self
            .client
            .post(self.predictions_url())
            .bearer_auth(api_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| ComicError::Request(format!("Prediction request failed: {}", e)))?;

        let prediction = Self::read_prediction(response).await?;
        log::debug!("Prediction created: {} ({:?})", prediction.id, prediction.status);
        Ok(prediction)
    }

    async fn wait(&self, mut prediction: Prediction) -> Result<Prediction> {
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        while !prediction.status.is_terminal() {
            tokio::time::sleep(interval).await;
            prediction = self.fetch(&prediction.id).await?;
            log::debug!("Prediction {} is {:?}", prediction.id, prediction.status);
        }

        Ok(prediction)
    }
}
