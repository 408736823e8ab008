use crate::{
    clients::ChatCompletion,
    error::{ComicError, Result},
    logger,
    models::{ChatMessage, ComicsResponse},
};
use serde_json::Value;
use std::sync::Arc;

pub const PANEL_COUNT: usize = 3;
pub const CHARACTER_NAME: &str = "Foley";
pub const CHARACTER_TOKEN: &str = "FOLEY black dog";
pub const STYLE_SUFFIX: &str = "realistic style";

/// Instruction sent ahead of every theme.
pub fn system_prompt() -> String {
    format!(
        r#"Create a {count}-panel comic story about a dog's adventure. For each panel, provide:
1. An image generation prompt that includes '{token}' and ends with '{style}'
2. A caption that refers to the dog as '{name}'

Format the output as JSON with this structure:
{{
    "comics": [
        {{
            "prompt": "Image generation prompt here",
            "caption": "Caption text here"
        }}
    ]
}}"#,
        count = PANEL_COUNT,
        token = CHARACTER_TOKEN,
        style = STYLE_SUFFIX,
        name = CHARACTER_NAME,
    )
}

#[derive(Clone)]
pub struct PlotGenerator {
    chat: Arc<dyn ChatCompletion>,
}

impl PlotGenerator {
    pub fn new(chat: Arc<dyn ChatCompletion>) -> Self {
        Self { chat }
    }

    pub async fn generate(&self, theme: &str) -> Result<ComicsResponse> {
        let theme = theme.trim();
        if theme.is_empty() {
            return Err(ComicError::Validation(
                "Invalid or missing prompt in request".into(),
            ));
        }

        let _timer = logger::timer("plot generation");
        let messages = vec![ChatMessage::system(system_prompt()), ChatMessage::user(theme)];

        let content = self
            .chat
            .complete(messages)
            .await?
            .filter(|content| !content.trim().is_empty())
            .ok_or(ComicError::UpstreamEmptyResponse)?;

        log::debug!("Chat model response: {}", content);

        let comics = parse_comics(&content)?;
        log::info!("Validated {}-panel plot for theme: {}", comics.comics.len(), theme);
        Ok(comics)
    }
}

/// Parses and checks the model's JSON against the three-panel shape.
pub fn parse_comics(content: &str) -> Result<ComicsResponse> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| ComicError::MalformedJson(e.to_string()))?;

    let panels = value
        .get("comics")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ComicError::SchemaViolation("Invalid JSON structure: missing comics array".into())
        })?;

    if panels.len() != PANEL_COUNT {
        return Err(ComicError::SchemaViolation(format!(
            "Expected {} panels, got {}",
            PANEL_COUNT,
            panels.len()
        )));
    }

    for (index, panel) in panels.iter().enumerate() {
        if !has_text(panel, "prompt") || !has_text(panel, "caption") {
            return Err(ComicError::SchemaViolation(format!(
                "Panel {} missing prompt or caption",
                index + 1
            )));
        }
    }

    serde_json::from_value(value).map_err(|e| ComicError::SchemaViolation(e.to_string()))
}

fn has_text(panel: &Value, key: &str) -> bool {
    panel
        .get(key)
        .and_then(Value::as_str)
        .map_or(false, |text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fakes::FakeChat;
    use serde_json::json;

    fn three_panels() -> Value {
        json!({
            "comics": [
                { "prompt": "FOLEY black dog sniffing sand, realistic style", "caption": "Foley arrives at the beach." },
                { "prompt": "FOLEY black dog chasing a wave, realistic style", "caption": "Foley races the tide." },
                { "prompt": "FOLEY black dog napping on a towel, realistic style", "caption": "Foley rests in the sun." }
            ]
        })
    }

    #[test]
    fn test_system_prompt_mentions_character() {
        let prompt = system_prompt();
        assert!(prompt.contains("3-panel"));
        assert!(prompt.contains(CHARACTER_TOKEN));
        assert!(prompt.contains(STYLE_SUFFIX));
        assert!(prompt.contains("'Foley'"));
        assert!(prompt.contains("\"comics\""));
    }

    #[test]
    fn test_parse_round_trips_valid_plot() {
        let mut upstream = three_panels();
        upstream["comics"][0]["mood"] = json!("cheerful");
        upstream["title"] = json!("Beach Day");

        let parsed = parse_comics(&upstream.to_string()).unwrap();
        assert_eq!(serde_json::to_value(&parsed).unwrap(), upstream);
    }

    #[test]
    fn test_parse_passes_through_model_image_url() {
        for image_url in [json!(null), json!(1), json!("https://elsewhere/x.png")] {
            let mut upstream = three_panels();
            upstream["comics"][0]["imageUrl"] = image_url.clone();

            let parsed = parse_comics(&upstream.to_string()).unwrap();
            assert_eq!(serde_json::to_value(&parsed).unwrap(), upstream, "imageUrl {}", image_url);
        }
    }

    #[test]
    fn test_parse_rejects_wrong_panel_count() {
        for count in [0usize, 1, 2, 4] {
            let panels: Vec<Value> = (0..count)
                .map(|i| json!({ "prompt": format!("p{}", i), "caption": "c" }))
                .collect();
            let content = json!({ "comics": panels }).to_string();
            let err = parse_comics(&content).unwrap_err();
            assert!(matches!(err, ComicError::SchemaViolation(_)), "count {}", count);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_comics("not json"),
            Err(ComicError::MalformedJson(_))
        ));
        assert!(matches!(
            parse_comics(r#"{"panels": []}"#),
            Err(ComicError::SchemaViolation(_))
        ));
        assert!(matches!(
            parse_comics(r#"{"comics": "three"}"#),
            Err(ComicError::SchemaViolation(_))
        ));

        let mut missing_caption = three_panels();
        missing_caption["comics"][1]["caption"] = json!("");
        let err = parse_comics(&missing_caption.to_string()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Schema violation: Panel 2 missing prompt or caption"
        );

        let mut numeric_prompt = three_panels();
        numeric_prompt["comics"][2]["prompt"] = json!(7);
        assert!(matches!(
            parse_comics(&numeric_prompt.to_string()),
            Err(ComicError::SchemaViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_sends_system_and_theme() {
        let chat = Arc::new(FakeChat::replying(Some(three_panels().to_string())));
        let generator = PlotGenerator::new(chat.clone());

        let comics = generator.generate("  Foley visits the beach ").await.unwrap();
        assert_eq!(comics.comics.len(), 3);
        assert!(comics.comics.iter().all(|panel| panel.caption.contains(CHARACTER_NAME)));

        let calls = chat.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0].role, "system");
        assert_eq!(calls[0][1], ChatMessage::user("Foley visits the beach"));
    }

    #[tokio::test]
    async fn test_generate_empty_response() {
        for reply in [None, Some("   ".to_string())] {
            let generator = PlotGenerator::new(Arc::new(FakeChat::replying(reply)));
            let result = generator.generate("Foley at the park").await;
            assert!(matches!(result, Err(ComicError::UpstreamEmptyResponse)));
        }
    }

    #[tokio::test]
    async fn test_blank_theme_makes_no_call() {
        let chat = Arc::new(FakeChat::replying(Some(three_panels().to_string())));
        let generator = PlotGenerator::new(chat.clone());

        let result = generator.generate("  ").await;
        assert!(matches!(result, Err(ComicError::Validation(_))));
        assert!(chat.calls().is_empty());
    }
}
