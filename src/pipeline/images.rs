use crate::{
    clients::ImagePredictor,
    config::GenerationParams,
    error::{ComicError, Result},
    logger,
    models::{PredictionInput, PredictionRequest, PredictionStatus, SaveRecord},
    storage::{spawn_save, HistoryStore},
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

pub struct ImageGenerator {
    predictor: Arc<dyn ImagePredictor>,
    store: Option<Arc<dyn HistoryStore>>,
    model_version: String,
    params: GenerationParams,
    pending_saves: Mutex<Vec<JoinHandle<()>>>,
}

impl ImageGenerator {
    pub fn new(
        predictor: Arc<dyn ImagePredictor>,
        model_version: impl Into<String>,
        params: GenerationParams,
    ) -> Self {
        Self {
            predictor,
            store: None,
            model_version: model_version.into(),
            params,
            pending_saves: Mutex::new(Vec::new()),
        }
    }

    /// Enables the best-effort history save after each rendered panel.
    pub fn with_history(mut self, store: Arc<dyn HistoryStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Renders one image per prompt, strictly in order.
    ///
    /// The first failing prompt aborts the whole batch and no URLs are
    /// returned. On success `urls[i]` belongs to `prompts[i]`.
    pub async fn generate_all(&self, prompts: &[String]) -> Result<Vec<String>> {
        let _timer = logger::timer("image generation");
        let mut image_urls = Vec::with_capacity(prompts.len());

        for (index, prompt) in prompts.iter().enumerate() {
            log::info!("Processing prompt {}/{}: {}", index + 1, prompts.len(), prompt);

            let image_url = self.generate_one(prompt).await.map_err(|e| {
                log::error!("Image generation failed at prompt {} ({}): {}", index + 1, e.kind(), e);
                e
            })?;

            if let Some(store) = &self.store {
                self.track(spawn_save(
                    store.clone(),
                    SaveRecord {
                        prompt: prompt.clone(),
                        image_url: image_url.clone(),
                    },
                ));
            }

            log::info!("Valid image URL generated: {}", image_url);
            image_urls.push(image_url);
        }

        Ok(image_urls)
    }

    pub async fn generate_one(&self, prompt: &str) -> Result<String> {
        let request = PredictionRequest {
            version: self.model_version.clone(),
            input: PredictionInput::new(prompt, &self.params),
        };

        let prediction = self.predictor.create(request).await?;
        let result = self.predictor.wait(prediction).await?;

        match result.status {
            PredictionStatus::Succeeded => extract_image_url(result.output.as_ref()),
            PredictionStatus::Failed | PredictionStatus::Canceled => {
                Err(ComicError::UpstreamPrediction(result.error_message()))
            }
            status => Err(ComicError::UpstreamPrediction(format!(
                "prediction {} still {:?} after wait",
                result.id, status
            ))),
        }
    }

    /// Number of history saves that have not finished yet.
    pub fn pending_saves(&self) -> usize {
        match self.pending_saves.lock() {
            Ok(mut pending) => {
                pending.retain(|handle| !handle.is_finished());
                pending.len()
            }
            Err(_) => 0,
        }
    }

    /// Waits for every outstanding history save.
    pub async fn drain_saves(&self) {
        let handles: Vec<JoinHandle<()>> = match self.pending_saves.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => return,
        };

        if handles.is_empty() {
            return;
        }

        log::info!("Waiting for {} history save(s)", handles.len());
        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                log::warn!("History save task did not complete: {}", e);
            }
        }
    }

    fn track(&self, handle: JoinHandle<()>) {
        if let Ok(mut pending) = self.pending_saves.lock() {
            pending.retain(|task| !task.is_finished());
            pending.push(handle);
        }
    }
}

/// First element of a prediction's output, which must be an http(s) URL.
pub fn extract_image_url(output: Option<&Value>) -> Result<String> {
    let first = output
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .ok_or(ComicError::EmptyOutput)?;

    match first.as_str() {
        Some(url) if url.starts_with("https://") || url.starts_with("http://") => {
            Ok(url.to_string())
        }
        Some(url) => Err(ComicError::InvalidOutputUrl(url.to_string())),
        None => Err(ComicError::InvalidOutputUrl(first.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fakes::{FailingStore, FakePredictor, Outcome};
    use crate::storage::MemoryHistoryStore;
    use serde_json::json;

    fn prompts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn generator(predictor: Arc<FakePredictor>) -> ImageGenerator {
        ImageGenerator::new(predictor, "v1", GenerationParams::draft())
    }

    #[test]
    fn test_extract_image_url() {
        assert_eq!(
            extract_image_url(Some(&json!(["https://a/1.webp", "https://a/2.webp"]))).unwrap(),
            "https://a/1.webp"
        );
        assert!(matches!(extract_image_url(None), Err(ComicError::EmptyOutput)));
        assert!(matches!(
            extract_image_url(Some(&json!([]))),
            Err(ComicError::EmptyOutput)
        ));
        assert!(matches!(
            extract_image_url(Some(&json!("https://a/1.webp"))),
            Err(ComicError::EmptyOutput)
        ));
        assert!(matches!(
            extract_image_url(Some(&json!(["ftp://a/1.webp"]))),
            Err(ComicError::InvalidOutputUrl(_))
        ));
        assert!(matches!(
            extract_image_url(Some(&json!(["httpfoo"]))),
            Err(ComicError::InvalidOutputUrl(_))
        ));
        assert!(matches!(
            extract_image_url(Some(&json!([{ "url": "https://a" }]))),
            Err(ComicError::InvalidOutputUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_urls_follow_prompt_order() {
        let predictor = Arc::new(FakePredictor::new(vec![
            Outcome::url("https://img/1"),
            Outcome::url("https://img/2"),
            Outcome::url("https://img/3"),
        ]));
        let urls = generator(predictor.clone())
            .generate_all(&prompts(&["p1", "p2", "p3"]))
            .await
            .unwrap();

        assert_eq!(urls, vec!["https://img/1", "https://img/2", "https://img/3"]);
        assert_eq!(predictor.prompts(), vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn test_failure_on_last_prompt_returns_nothing() {
        let predictor = Arc::new(FakePredictor::new(vec![
            Outcome::url("https://img/1"),
            Outcome::url("https://img/2"),
            Outcome::Failed("CUDA out of memory"),
        ]));
        let result = generator(predictor)
            .generate_all(&prompts(&["p1", "p2", "p3"]))
            .await;

        match result {
            Err(ComicError::UpstreamPrediction(msg)) => assert_eq!(msg, "CUDA out of memory"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_stops_later_prompts() {
        let predictor = Arc::new(FakePredictor::new(vec![
            Outcome::Transport,
            Outcome::url("https://img/2"),
        ]));
        let result = generator(predictor.clone())
            .generate_all(&prompts(&["p1", "p2"]))
            .await;

        assert!(matches!(result, Err(ComicError::Request(_))));
        assert_eq!(predictor.prompts(), vec!["p1"]);
    }

    #[tokio::test]
    async fn test_invalid_url_after_successes() {
        let predictor = Arc::new(FakePredictor::new(vec![
            Outcome::url("https://img/1"),
            Outcome::url("https://img/2"),
            Outcome::url("data:image/png;base64,AAAA"),
        ]));
        let result = generator(predictor)
            .generate_all(&prompts(&["p1", "p2", "p3"]))
            .await;
        assert!(matches!(result, Err(ComicError::InvalidOutputUrl(_))));
    }

    #[tokio::test]
    async fn test_empty_output() {
        let predictor = Arc::new(FakePredictor::new(vec![Outcome::Output(json!([]))]));
        let result = generator(predictor).generate_all(&prompts(&["p1"])).await;
        assert!(matches!(result, Err(ComicError::EmptyOutput)));
    }

    #[tokio::test]
    async fn test_successful_images_are_saved() {
        let predictor = Arc::new(FakePredictor::new(vec![
            Outcome::url("https://img/1"),
            Outcome::url("https://img/2"),
        ]));
        let store = Arc::new(MemoryHistoryStore::new());
        let generator = generator(predictor).with_history(store.clone());

        generator.generate_all(&prompts(&["p1", "p2"])).await.unwrap();
        generator.drain_saves().await;

        assert_eq!(store.len(), 2);
        assert_eq!(generator.pending_saves(), 0);
        let saved = store.history(10, 0).await.unwrap();
        assert_eq!(saved[0].prompt, "p2");
        assert_eq!(saved[0].image_url, "https://img/2");
    }

    #[tokio::test]
    async fn test_save_failure_does_not_fail_generation() {
        let predictor = Arc::new(FakePredictor::new(vec![Outcome::url("https://img/1")]));
        let generator = generator(predictor).with_history(Arc::new(FailingStore));

        let urls = generator.generate_all(&prompts(&["p1"])).await.unwrap();
        generator.drain_saves().await;
        assert_eq!(urls, vec!["https://img/1"]);
    }
}
