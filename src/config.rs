use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

pub const DEFAULT_CHAT_BASE_URL: &str = "https://models.inference.ai.azure.com";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
pub const DEFAULT_REPLICATE_BASE_URL: &str = "https://api.replicate.com/v1";
pub const DEFAULT_IMAGE_MODEL_VERSION: &str =
    "1eaac30a6af4d4b1ef8f18b51aa1b88b4fba01b58490028c2ddf34cd6ffd5f86";
pub const DEFAULT_BACKEND_URL: &str = "https://sundai-backend-55967553950.us-east4.run.app";
pub const DEFAULT_NEGATIVE_PROMPT: &str = "ugly, blurry, poor quality, disfigured";
pub const DEFAULT_HISTORY_PAGE_SIZE: usize = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 45;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePreset {
    Draft,
    Quality,
}

impl FromStr for ImagePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" | "fast" => Ok(ImagePreset::Draft),
            "quality" | "hq" => Ok(ImagePreset::Quality),
            other => Err(format!("Unknown image preset: {}", other)),
        }
    }
}

/// Parameters sent with every prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    pub negative_prompt: String,
    pub num_outputs: u32,
    pub model_variant: String,
}

impl GenerationParams {
    pub fn preset(preset: ImagePreset) -> Self {
        match preset {
            ImagePreset::Draft => Self::draft(),
            ImagePreset::Quality => Self::quality(),
        }
    }

    pub fn draft() -> Self {
        GenerationParams {
            num_inference_steps: 8,
            guidance_scale: 3.5,
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
            num_outputs: 1,
            model_variant: "schnell".to_string(),
        }
    }

    pub fn quality() -> Self {
        GenerationParams {
            num_inference_steps: 28,
            guidance_scale: 7.5,
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
            num_outputs: 1,
            model_variant: "dev".to_string(),
        }
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.num_inference_steps = steps;
        self
    }

    pub fn with_guidance(mut self, guidance_scale: f32) -> Self {
        self.guidance_scale = guidance_scale;
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = negative_prompt.into();
        self
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::draft()
    }
}

#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub api_token: Option<String>,
    pub base_url: Option<String>,
    pub model_version: Option<String>,
    pub params: GenerationParams,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub in_memory: bool,
    pub save_history: bool,
    pub page_size: usize,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub request_timeout_secs: u64,
    pub chat: ChatConfig,
    pub image: ImageConfig,
    pub backend: BackendConfig,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            api_key: None,
            base_url: None,
            model: None,
        }
    }
}

impl ChatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("OPENAI_API_KEY")
            .or_else(|_| env::var("GITHUB_TOKEN"))
            .ok()
            .filter(|key| !key.trim().is_empty());
        let base_url = env::var("CHAT_BASE_URL").ok();
        let model = env::var("CHAT_MODEL").ok();

        ChatConfig {
            api_key,
            base_url,
            model,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_CHAT_BASE_URL)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_CHAT_MODEL)
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        ImageConfig {
            api_token: None,
            base_url: None,
            model_version: None,
            params: GenerationParams::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl ImageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_token = env::var("REPLICATE_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        let base_url = env::var("REPLICATE_BASE_URL").ok();
        let model_version = env::var("IMAGE_MODEL_VERSION").ok();
        let preset = match env::var("IMAGE_PRESET") {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                log::warn!("{}, falling back to draft", e);
                ImagePreset::Draft
            }),
            Err(_) => ImagePreset::Draft,
        };
        let poll_interval_ms = env::var("PREDICTION_POLL_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);

        ImageConfig {
            api_token,
            base_url,
            model_version,
            params: GenerationParams::preset(preset),
            poll_interval_ms,
        }
    }

    pub fn with_api_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(api_token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = Some(version.into());
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_preset(mut self, preset: ImagePreset) -> Self {
        self.params = GenerationParams::preset(preset);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_REPLICATE_BASE_URL)
    }

    pub fn model_version(&self) -> &str {
        self.model_version
            .as_deref()
            .unwrap_or(DEFAULT_IMAGE_MODEL_VERSION)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            url: None,
            in_memory: false,
            save_history: true,
            page_size: DEFAULT_HISTORY_PAGE_SIZE,
        }
    }
}

impl BackendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let url = env::var("BACKEND_URL").ok();
        let in_memory = env::var("HISTORY_STORE")
            .ok()
            .map_or(false, |val| val.eq_ignore_ascii_case("memory"));
        let save_history = env::var("SAVE_HISTORY")
            .ok()
            .map_or(true, |val| val != "false");
        let page_size = env::var("HISTORY_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_HISTORY_PAGE_SIZE);

        BackendConfig {
            url,
            in_memory,
            save_history,
            page_size,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_in_memory(mut self, enabled: bool) -> Self {
        self.in_memory = enabled;
        self
    }

    pub fn with_save_history(mut self, enabled: bool) -> Self {
        self.save_history = enabled;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_BACKEND_URL)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: None,
            port: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            chat: ChatConfig::default(),
            image: ImageConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let host = env::var("HOST").ok();
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());
        let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Config {
            host,
            port,
            request_timeout_secs,
            chat: ChatConfig::from_env(),
            image: ImageConfig::from_env(),
            backend: BackendConfig::from_env(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_chat(mut self, config: ChatConfig) -> Self {
        self.chat = config;
        self
    }

    pub fn with_image(mut self, config: ImageConfig) -> Self {
        self.image = config;
        self
    }

    pub fn with_backend(mut self, config: BackendConfig) -> Self {
        self.backend = config;
        self
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or("127.0.0.1")
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(8080)
    }
}
