pub mod history;
pub mod images;
pub mod plot;
pub mod validator;

#[cfg(test)]
pub(crate) mod fakes;

use crate::{
    clients::ProviderClients,
    config::Config,
    error::{ComicError, Result},
    models::ComicPanel,
    storage::{BackendHistoryStore, HistoryStore, MemoryHistoryStore},
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub use history::HistoryReader;
pub use images::ImageGenerator;
pub use plot::PlotGenerator;
pub use validator::{validate_body, validate_theme};

/// Plot generation followed by image generation for one theme.
#[derive(Clone)]
pub struct ComicPipeline {
    plot: PlotGenerator,
    images: Arc<ImageGenerator>,
    history: HistoryReader,
    timeout: Duration,
}

impl ComicPipeline {
    pub fn new(
        plot: PlotGenerator,
        images: Arc<ImageGenerator>,
        history: HistoryReader,
        timeout: Duration,
    ) -> Self {
        Self {
            plot,
            images,
            history,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let clients = ProviderClients::new(config);
        let store: Arc<dyn HistoryStore> = if config.backend.in_memory {
            Arc::new(MemoryHistoryStore::new())
        } else {
            Arc::new(BackendHistoryStore::new(
                reqwest::Client::new(),
                &config.backend,
            ))
        };

        Self::from_parts(config, clients, store)
    }

    pub fn from_parts(
        config: &Config,
        clients: ProviderClients,
        store: Arc<dyn HistoryStore>,
    ) -> Self {
        let mut images = ImageGenerator::new(
            clients.image(),
            config.image.model_version(),
            config.image.params.clone(),
        );
        if config.backend.save_history {
            images = images.with_history(store.clone());
        }

        Self::new(
            PlotGenerator::new(clients.chat()),
            Arc::new(images),
            HistoryReader::new(store, config.backend.page_size),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn plot(&self) -> &PlotGenerator {
        &self.plot
    }

    pub fn images(&self) -> &ImageGenerator {
        &self.images
    }

    pub fn history(&self) -> &HistoryReader {
        &self.history
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full comic for `theme`. Any stage failure yields no panels at all.
    pub async fn generate(&self, theme: &str) -> Result<Vec<ComicPanel>> {
        self.with_deadline(async {
            let comics = self.plot.generate(theme).await?;
            let image_urls = self.images.generate_all(&comics.prompts()).await?;
            Ok(comics.with_images(image_urls))
        })
        .await
    }

    /// Aborts `work` once the configured ceiling passes.
    pub async fn with_deadline<T, F>(&self, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, work).await {
            Ok(result) => result,
            Err(_) => {
                log::error!("Generation exceeded {}s ceiling", self.timeout.as_secs());
                Err(ComicError::Timeout(self.timeout.as_secs()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendConfig, Config};
    use crate::pipeline::fakes::{FakeChat, FakePredictor, Outcome};
    use serde_json::json;

    fn plot_reply() -> String {
        json!({
            "comics": [
                { "prompt": "FOLEY black dog at the park gate, realistic style", "caption": "Foley arrives at the park." },
                { "prompt": "FOLEY black dog fetching a stick, realistic style", "caption": "Foley fetches a stick." },
                { "prompt": "FOLEY black dog under a tree, realistic style", "caption": "Foley naps under a tree." }
            ]
        })
        .to_string()
    }

    fn pipeline(outcomes: Vec<Outcome>) -> (ComicPipeline, Arc<MemoryHistoryStore>) {
        let store = Arc::new(MemoryHistoryStore::new());
        let clients = ProviderClients::from_parts(
            Arc::new(FakeChat::replying(Some(plot_reply()))),
            Arc::new(FakePredictor::new(outcomes)),
        );
        let config = Config::new().with_backend(BackendConfig::new().with_in_memory(true));
        (ComicPipeline::from_parts(&config, clients, store.clone()), store)
    }

    #[tokio::test]
    async fn test_generate_merges_panels_and_images() {
        let (pipeline, store) = pipeline(vec![
            Outcome::url("https://img/1"),
            Outcome::url("https://img/2"),
            Outcome::url("https://img/3"),
        ]);

        let panels = pipeline.generate("Foley goes to the park").await.unwrap();
        assert_eq!(panels.len(), 3);
        assert_eq!(panels[1].caption, "Foley fetches a stick.");
        assert_eq!(panels[1].image_url.as_deref(), Some("https://img/2"));
        assert!(panels.iter().all(|p| p.caption.contains("Foley")));

        pipeline.images().drain_saves().await;
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_any_image_failure_yields_no_panels() {
        let (pipeline, _) = pipeline(vec![
            Outcome::url("https://img/1"),
            Outcome::Failed("nsfw"),
            Outcome::url("https://img/3"),
        ]);

        let result = pipeline.generate("Foley goes to the park").await;
        assert!(matches!(result, Err(ComicError::UpstreamPrediction(_))));
    }

    #[tokio::test]
    async fn test_deadline() {
        let (pipeline, _) = pipeline(vec![]);
        let pipeline = ComicPipeline {
            timeout: Duration::from_millis(10),
            ..pipeline
        };

        let result: Result<()> = pipeline
            .with_deadline(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(ComicError::Timeout(_))));
    }
}
