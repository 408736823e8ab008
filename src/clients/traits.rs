use crate::{
    error::Result,
    models::{ChatMessage, Prediction, PredictionRequest},
};
use async_trait::async_trait;

/// A hosted chat model that answers in JSON mode.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Returns the content of the first choice, `None` when the model sent nothing.
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<Option<String>>;
}

/// A hosted text-to-image service exposing submit-and-await predictions.
#[async_trait]
pub trait ImagePredictor: Send + Sync {
    async fn create(&self, request: PredictionRequest) -> Result<Prediction>;

    /// Resolves once the prediction reaches a terminal status.
    async fn wait(&self, prediction: Prediction) -> Result<Prediction>;
}
