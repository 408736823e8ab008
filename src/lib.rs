pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod presentation;
pub mod server;
pub mod storage;

pub use clients::{ChatClient, ChatCompletion, ImagePredictor, PredictionClient, ProviderClients};
pub use config::{BackendConfig, ChatConfig, Config, GenerationParams, ImageConfig, ImagePreset};
pub use error::{ComicError, Result};
pub use models::{
    ComicPanel, ComicsResponse, GenerationRequest, HistoryItem, HistoryPage, PlotPanel,
};
pub use pipeline::{ComicPipeline, HistoryReader, ImageGenerator, PlotGenerator};
pub use storage::{BackendHistoryStore, HistoryStore, MemoryHistoryStore};
