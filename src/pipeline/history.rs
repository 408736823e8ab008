use crate::{
    error::Result,
    models::{HistoryItem, HistoryPage},
    storage::HistoryStore,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct HistoryReader {
    store: Arc<dyn HistoryStore>,
    page_size: usize,
}

impl HistoryReader {
    pub fn new(store: Arc<dyn HistoryStore>, page_size: usize) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Raw records in store order. Empty means no more records.
    pub async fn read(&self, limit: usize, skip: usize) -> Result<Vec<HistoryItem>> {
        self.store.history(limit, skip).await
    }

    /// Page `page` (zero-based) in display order: oldest of the page first.
    pub async fn page(&self, page: usize) -> Result<HistoryPage> {
        let skip = page.saturating_mul(self.page_size);
        let items = self.read(self.page_size, skip).await?;
        Ok(display_page(items, page))
    }
}

pub fn display_page(items: Vec<HistoryItem>, page: usize) -> HistoryPage {
    let next_page = if items.is_empty() { None } else { Some(page + 1) };
    HistoryPage {
        items: items.iter().rev().map(HistoryItem::to_panel).collect(),
        next_page,
    }
}
