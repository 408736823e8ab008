//! Scripted stand-ins for the provider traits.

use crate::{
    clients::{ChatCompletion, ImagePredictor},
    error::{ComicError, Result},
    models::{ChatMessage, Prediction, PredictionRequest, PredictionStatus},
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

pub struct FakeChat {
    reply: Option<String>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeChat {
    pub fn replying(reply: Option<String>) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompletion for FakeChat {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<Option<String>> {
        self.calls.lock().unwrap().push(messages);
        Ok(self.reply.clone())
    }
}

/// What the fake predictor does for one submitted prompt.
#[derive(Clone)]
pub enum Outcome {
    Output(Value),
    Failed(&'static str),
    Transport,
}

impl Outcome {
    pub fn url(url: &str) -> Self {
        Outcome::Output(json!([url]))
    }
}

pub struct FakePredictor {
    outcomes: Mutex<VecDeque<Outcome>>,
    prompts: Mutex<Vec<String>>,
}

impl FakePredictor {
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImagePredictor for FakePredictor {
    async fn create(&self, request: PredictionRequest) -> Result<Prediction> {
        let mut prompts = self.prompts.lock().unwrap();
        prompts.push(request.input.prompt.clone());
        let id = format!("pred-{}", prompts.len());

        match self.outcomes.lock().unwrap().pop_front() {
            Some(Outcome::Output(output)) => Ok(Prediction {
                id,
                status: PredictionStatus::Starting,
                output: Some(output),
                error: None,
            }),
            Some(Outcome::Failed(message)) => Ok(Prediction {
                id,
                status: PredictionStatus::Processing,
                output: None,
                error: Some(json!(message)),
            }),
            Some(Outcome::Transport) | None => {
                Err(ComicError::Request("connection refused".into()))
            }
        }
    }

    async fn wait(&self, mut prediction: Prediction) -> Result<Prediction> {
        prediction.status = if prediction.error.is_some() {
            PredictionStatus::Failed
        } else {
            PredictionStatus::Succeeded
        };
        Ok(prediction)
    }
}

/// History store whose writes always fail.
pub struct FailingStore;

#[async_trait]
impl crate::storage::HistoryStore for FailingStore {
    async fn save(&self, _record: crate::models::SaveRecord) -> Result<()> {
        Err(ComicError::Request("backend unavailable".into()))
    }

    async fn history(&self, _limit: usize, _skip: usize) -> Result<Vec<crate::models::HistoryItem>> {
        Err(ComicError::UpstreamRead("backend unavailable".into()))
    }
}

/// History store whose reads never complete.
pub struct StalledStore;

#[async_trait]
impl crate::storage::HistoryStore for StalledStore {
    async fn save(&self, _record: crate::models::SaveRecord) -> Result<()> {
        Ok(())
    }

    async fn history(&self, _limit: usize, _skip: usize) -> Result<Vec<crate::models::HistoryItem>> {
        std::future::pending().await
    }
}
