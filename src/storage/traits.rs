use crate::{
    error::Result,
    models::{HistoryItem, SaveRecord},
};
use async_trait::async_trait;

/// Remote store of previously generated panels.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn save(&self, record: SaveRecord) -> Result<()>;

    /// One page of records; an empty page means there is nothing further.
    async fn history(&self, limit: usize, skip: usize) -> Result<Vec<HistoryItem>>;
}
