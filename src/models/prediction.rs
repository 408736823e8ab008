use crate::config::GenerationParams;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl PredictionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PredictionStatus::Succeeded | PredictionStatus::Failed | PredictionStatus::Canceled
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionInput {
    pub prompt: String,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    pub negative_prompt: String,
    pub num_outputs: u32,
    pub model: String,
}

impl PredictionInput {
    pub fn new(prompt: impl Into<String>, params: &GenerationParams) -> Self {
        Self {
            prompt: prompt.into(),
            num_inference_steps: params.num_inference_steps,
            guidance_scale: params.guidance_scale,
            negative_prompt: params.negative_prompt.clone(),
            num_outputs: params.num_outputs,
            model: params.model_variant.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest {
    pub version: String,
    pub input: PredictionInput,
}

/// Render job handle as reported by the prediction service.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl Prediction {
    pub fn error_message(&self) -> String {
        match &self.error {
            Some(serde_json::Value::String(msg)) => msg.clone(),
            Some(other) if !other.is_null() => other.to_string(),
            _ => format!("prediction {} ended with status {:?}", self.id, self.status),
        }
    }
}
