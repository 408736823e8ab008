use crate::{
    clients::traits::ChatCompletion,
    config::ChatConfig,
    error::{ComicError, Result},
    models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat},
};
use async_trait::async_trait;
use reqwest::Client;

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    config: ChatConfig,
}

impl ChatClient {
    pub fn new(client: Client, config: ChatConfig) -> Self {
        Self { client, config }
    }

    pub fn model(&self) -> &str {
        self.config.model()
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ComicError::Configuration("Missing chat provider API key".into()))
    }
}

#[async_trait]
impl ChatCompletion for ChatClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<Option<String>> {
        let api_key = self.api_key()?;
        let url = format!("{}/chat/completions", self.config.base_url().trim_end_matches('/'));

        let request = ChatCompletionRequest {
            model: self.model().to_string(),
            response_format: ResponseFormat::json_object(),
            messages,
        };

        log::info!("Invoking chat model: {}", request.model);
        log::debug!(
            "Chat completion request payload: {}",
            serde_json::to_string(&request).unwrap_or_default()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ComicError::Request(format!("Chat request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            log::error!("Chat provider returned {}: {}", status, error_text);
            return Err(ComicError::Request(format!(
                "Chat provider returned {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ComicError::Response(e.to_string()))?;

        Ok(completion.first_content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> ChatClient {
        let mut config = ChatConfig::new().with_base_url(server.uri());
        if let Some(key) = api_key {
            config = config.with_api_key(key);
        }
        ChatClient::new(Client::new(), config)
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mock_server = MockServer::start().await;
        let response_body = r#"{
            "choices": [
                { "message": { "content": "{\"comics\": []}" }, "finish_reason": "stop" }
            ]
        }"#;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test_key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o",
                "response_format": { "type": "json_object" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(response_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, Some("test_key"));
        let content = client
            .complete(vec![ChatMessage::system("sys"), ChatMessage::user("hi")])
            .await
            .unwrap();

        assert_eq!(content.as_deref(), Some("{\"comics\": []}"));
    }

    #[tokio::test]
    async fn test_complete_without_content() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"choices": [{"message": {"content": null}}]}"#),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, Some("test_key"));
        let content = client.complete(vec![ChatMessage::user("hi")]).await.unwrap();
        assert!(content.is_none());
    }

    #[tokio::test]
    async fn test_missing_api_key_is_configuration_error() {
        let mock_server = MockServer::start().await;
        let client = client_for(&mock_server, None);

        let result = client.complete(vec![ChatMessage::user("hi")]).await;
        assert!(matches!(result, Err(ComicError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, Some("wrong"));
        let result = client.complete(vec![ChatMessage::user("hi")]).await;
        match result {
            Err(ComicError::Request(msg)) => assert!(msg.contains("bad token")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
