use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One panel of a comic. `image_url` is filled in by the image stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicPanel {
    pub prompt: String,
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComicPanel {
    pub fn new(prompt: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            caption: caption.into(),
            image_url: None,
            extra: Map::new(),
        }
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// One panel as written by the chat model. Keys other than `prompt` and
/// `caption`, `imageUrl` included, are carried through as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPanel {
    pub prompt: String,
    pub caption: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlotPanel {
    pub fn new(prompt: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            caption: caption.into(),
            extra: Map::new(),
        }
    }

    /// The generated image replaces whatever `imageUrl` the model wrote.
    pub fn into_panel(self, image_url: impl Into<String>) -> ComicPanel {
        let mut extra = self.extra;
        extra.remove("imageUrl");
        ComicPanel {
            prompt: self.prompt,
            caption: self.caption,
            image_url: Some(image_url.into()),
            extra,
        }
    }
}

/// Validated plot returned by the chat model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComicsResponse {
    pub comics: Vec<PlotPanel>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComicsResponse {
    pub fn prompts(&self) -> Vec<String> {
        self.comics.iter().map(|panel| panel.prompt.clone()).collect()
    }

    /// Zips panels with image URLs by position.
    pub fn with_images(self, image_urls: Vec<String>) -> Vec<ComicPanel> {
        self.comics
            .into_iter()
            .zip(image_urls)
            .map(|(panel, url)| panel.into_panel(url))
            .collect()
    }
}

/// Normalized prompts of one generation request. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    prompts: Vec<String>,
    batch: bool,
}

impl GenerationRequest {
    pub(crate) fn new(prompts: Vec<String>, batch: bool) -> Self {
        Self { prompts, batch }
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// True when the body used the `prompts` field rather than `prompt`.
    pub fn is_batch(&self) -> bool {
        self.batch
    }

    pub fn into_prompts(self) -> Vec<String> {
        self.prompts
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComicResponse {
    pub panels: Vec<ComicPanel>,
}
