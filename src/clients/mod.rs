pub mod chat_client;
pub mod prediction_client;
pub mod traits;

use crate::config::Config;
use reqwest::Client;
use std::sync::Arc;

pub use chat_client::ChatClient;
pub use prediction_client::PredictionClient;
pub use traits::{ChatCompletion, ImagePredictor};

/// The two hosted providers, sharing one HTTP connection pool.
#[derive(Clone)]
pub struct ProviderClients {
    chat_client: Arc<dyn ChatCompletion>,
    image_client: Arc<dyn ImagePredictor>,
}

impl ProviderClients {
    pub fn new(config: &Config) -> Self {
        let client = Client::new();

        Self {
            chat_client: Arc::new(ChatClient::new(client.clone(), config.chat.clone())),
            image_client: Arc::new(PredictionClient::new(client, config.image.clone())),
        }
    }

    pub fn from_parts(
        chat_client: Arc<dyn ChatCompletion>,
        image_client: Arc<dyn ImagePredictor>,
    ) -> Self {
        Self {
            chat_client,
            image_client,
        }
    }

    pub fn chat(&self) -> Arc<dyn ChatCompletion> {
        self.chat_client.clone()
    }

    pub fn image(&self) -> Arc<dyn ImagePredictor> {
        self.image_client.clone()
    }
}
