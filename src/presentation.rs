//! View state for the comic page.
//!
//! `ViewState` is a plain value. Every user action or pipeline outcome
//! produces a new state through one of the transition functions, and
//! `ComicSession` wires those transitions to the pipeline.

use crate::{
    models::{ComicPanel, HistoryPage},
    pipeline::ComicPipeline,
};
use serde::Serialize;

pub const NO_MORE_COMICS: &str = "No more comics to load";
pub const GENERATE_FAILED: &str = "Failed to generate comic";
pub const HISTORY_FAILED: &str = "Failed to load history";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub input: String,
    pub panels: Vec<ComicPanel>,
    pub loading: bool,
    pub loading_history: bool,
    pub error: Option<String>,
    pub dark_mode: bool,
    pub history_page: usize,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn theme(&self) -> Theme {
        if self.dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.loading && !self.input.trim().is_empty()
    }
}

pub fn set_input(state: ViewState, input: impl Into<String>) -> ViewState {
    ViewState {
        input: input.into(),
        ..state
    }
}

pub fn toggle_dark_mode(state: ViewState) -> ViewState {
    ViewState {
        dark_mode: !state.dark_mode,
        ..state
    }
}

/// Blank input or an in-flight submission leaves the state untouched.
pub fn submit_started(state: ViewState) -> ViewState {
    if !state.can_submit() {
        return state;
    }
    ViewState {
        loading: true,
        error: None,
        panels: Vec::new(),
        ..state
    }
}

pub fn comic_ready(state: ViewState, panels: Vec<ComicPanel>) -> ViewState {
    ViewState {
        loading: false,
        panels,
        ..state
    }
}

pub fn comic_failed(state: ViewState, message: impl Into<String>) -> ViewState {
    ViewState {
        loading: false,
        panels: Vec::new(),
        error: Some(message.into()),
        ..state
    }
}

pub fn history_started(state: ViewState) -> ViewState {
    ViewState {
        loading_history: true,
        error: None,
        panels: Vec::new(),
        ..state
    }
}

/// An empty page is the end of history: the cursor stays put.
pub fn history_loaded(state: ViewState, page: HistoryPage) -> ViewState {
    if page.items.is_empty() {
        return ViewState {
            loading_history: false,
            error: Some(NO_MORE_COMICS.to_string()),
            ..state
        };
    }
    ViewState {
        loading_history: false,
        panels: page.items,
        history_page: state.history_page + 1,
        ..state
    }
}

pub fn history_failed(state: ViewState, message: impl Into<String>) -> ViewState {
    ViewState {
        loading_history: false,
        error: Some(message.into()),
        ..state
    }
}

/// One browser session: the current view plus the pipeline it drives.
pub struct ComicSession {
    pipeline: ComicPipeline,
    state: ViewState,
}

impl ComicSession {
    pub fn new(pipeline: ComicPipeline) -> Self {
        Self {
            pipeline,
            state: ViewState::new(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    fn apply(&mut self, transition: impl FnOnce(ViewState) -> ViewState) {
        let current = std::mem::take(&mut self.state);
        self.state = transition(current);
    }

    pub fn set_input(&mut self, input: &str) {
        self.apply(|state| set_input(state, input));
    }

    pub fn toggle_dark_mode(&mut self) {
        self.apply(toggle_dark_mode);
    }

    pub async fn submit(&mut self) {
        if !self.state.can_submit() {
            return;
        }
        self.apply(submit_started);

        let theme = self.state.input.clone();
        match self.pipeline.generate(&theme).await {
            Ok(panels) => self.apply(|state| comic_ready(state, panels)),
            Err(e) => {
                log::error!("Comic generation failed ({}): {}", e.kind(), e);
                self.apply(|state| comic_failed(state, GENERATE_FAILED));
            }
        }
    }

    pub async fn load_more(&mut self) {
        if self.state.loading_history {
            return;
        }
        self.apply(history_started);

        match self.pipeline.history().page(self.state.history_page).await {
            Ok(page) => self.apply(|state| history_loaded(state, page)),
            Err(e) => {
                log::error!("History load failed: {}", e);
                self.apply(|state| history_failed(state, HISTORY_FAILED));
            }
        }
    }
}
