use super::comic::ComicPanel;
use serde::{Deserialize, Serialize};

/// Record persisted by the remote history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub prompt: String,
    #[serde(default)]
    pub caption: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl HistoryItem {
    /// Display form; a missing or blank caption falls back to the prompt.
    pub fn to_panel(&self) -> ComicPanel {
        let caption = match self.caption.as_deref() {
            Some(caption) if !caption.trim().is_empty() => caption.to_string(),
            _ => self.prompt.clone(),
        };
        ComicPanel::new(self.prompt.clone(), caption).with_image_url(self.image_url.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub prompt: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub items: Vec<ComicPanel>,
    pub next_page: Option<usize>,
}
