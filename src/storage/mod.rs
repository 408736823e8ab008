pub mod backend;
pub mod traits;

use crate::{
    error::{ComicError, Result},
    models::{HistoryItem, SaveRecord},
};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub use backend::BackendHistoryStore;
pub use traits::HistoryStore;

/// Saves a record on a detached task. Failures only reach the log.
pub fn spawn_save(store: Arc<dyn HistoryStore>, record: SaveRecord) -> JoinHandle<()> {
    tokio::spawn(async move {
        let prompt = record.prompt.clone();
        match store.save(record).await {
            Ok(()) => log::info!("Saved panel to history: {}", prompt),
            Err(e) => log::error!("Failed to save to backend ({}): {}", e.kind(), e),
        }
    })
}

/// In-process store, used when no backend should be contacted.
#[derive(Default)]
pub struct MemoryHistoryStore {
    records: std::sync::Mutex<Vec<HistoryItem>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn save(&self, record: SaveRecord) -> Result<()> {
        let item = HistoryItem {
            prompt: record.prompt,
            caption: None,
            image_url: record.image_url,
            created_at: Some(chrono::Utc::now().to_rfc3339()),
        };
        let mut records = self
            .records
            .lock()
            .map_err(|_| ComicError::Storage("history lock poisoned".into()))?;
        records.push(item);
        Ok(())
    }

    async fn history(&self, limit: usize, skip: usize) -> Result<Vec<HistoryItem>> {
        // Newest first, like the remote backend.
        let records = self
            .records
            .lock()
            .map_err(|_| ComicError::UpstreamRead("history lock poisoned".into()))?;
        Ok(records.iter().rev().skip(skip).take(limit).cloned().collect())
    }
}
