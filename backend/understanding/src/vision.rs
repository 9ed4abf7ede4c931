//! Vision analyzer: one chat-completion call per image against an
//! OpenAI-compatible endpoint.
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use imageguard_core::{ChatCompletion, GuardError, LocationType, VisionAnalyzer, VisionSettings};

use crate::image::jpeg_data_url;
use crate::prompt::build_prompt;

/// Longest slice of an upstream error body kept in [`GuardError::UpstreamStatus`].
const MAX_ERROR_BODY_CHARS: usize = 512;

pub struct OpenAiAnalyzer {
    client: Client,
    settings: VisionSettings,
}

impl OpenAiAnalyzer {
    pub fn new(settings: VisionSettings) -> Result<Self, GuardError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GuardError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &VisionSettings {
        &self.settings
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

fn build_request<'a>(
    settings: &'a VisionSettings,
    image: &[u8],
    location: Option<&LocationType>,
) -> ChatRequest<'a> {
    ChatRequest {
        model: &settings.model,
        messages: vec![ChatMessage {
            role: "user",
            content: vec![
                ContentPart::Text { text: build_prompt(location) },
                ContentPart::ImageUrl { image_url: ImageUrl { url: jpeg_data_url(image) } },
            ],
        }],
        max_tokens: settings.max_tokens,
    }
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[async_trait]
impl VisionAnalyzer for OpenAiAnalyzer {
    fn name(&self) -> &str {
        "openai"
    }

    async fn analyze(
        &self,
        image: &[u8],
        location: Option<&LocationType>,
    ) -> Result<ChatCompletion, GuardError> {
        let start = Instant::now();
        let body = build_request(&self.settings, image, location);

        debug!(
            model = %self.settings.model,
            image_bytes = image.len(),
            location = location.map(LocationType::as_str),
            "Sending image to vision API"
        );

        let response = self
            .client
            .post(self.settings.completions_url())
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GuardError::UpstreamTransport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Vision API returned an error status");
            return Err(GuardError::UpstreamStatus {
                status: status.as_u16(),
                message: truncate(&error_body),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GuardError::UpstreamTransport(e.without_url().to_string()))?;
        let completion: ChatCompletion = serde_json::from_slice(&bytes).map_err(|e| {
            GuardError::MalformedModelResponse(format!("response body is not a chat completion: {e}"))
        })?;

        info!(
            model = %self.settings.model,
            latency_ms = start.elapsed().as_millis() as u64,
            total_tokens = completion.usage.as_ref().map(|u| u.total_tokens).unwrap_or(0),
            "Vision API call completed"
        );
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion_body(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 812, "completion_tokens": 1, "total_tokens": 813 }
        })
    }

    fn analyzer_for(server: &MockServer) -> OpenAiAnalyzer {
        let settings = VisionSettings::new("test-api-key")
            .with_api_base(server.uri())
            .with_timeout(Duration::from_secs(5));
        OpenAiAnalyzer::new(settings).unwrap()
    }

    #[test]
    fn request_body_matches_chat_completion_contract() {
        let settings = VisionSettings::new("k").with_model("gpt-4o-mini").with_max_tokens(120);
        let request = build_request(&settings, b"hello", None);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["max_tokens"], 120);
        assert_eq!(value["messages"].as_array().unwrap().len(), 1);
        let message = &value["messages"][0];
        assert_eq!(message["role"], "user");
        assert_eq!(message["content"][0]["type"], "text");
        assert_eq!(message["content"][1]["type"], "image_url");
        assert_eq!(
            message["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,aGVsbG8="
        );
    }

    #[tokio::test]
    async fn posts_bearer_authenticated_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-api-key"))
            .and(body_partial_json(json!({ "model": "gpt-4o", "max_tokens": 300 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("valid")))
            .expect(1)
            .mount(&server)
            .await;

        let location = LocationType::parse(Some("exterior"));
        let completion = analyzer_for(&server)
            .analyze(b"\xFF\xD8\xFF", location.as_ref())
            .await
            .unwrap();
        assert_eq!(completion.first_content().unwrap(), "valid");
    }

    #[tokio::test]
    async fn error_status_is_upstream_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "Incorrect API key provided", "code": "invalid_api_key" }
            })))
            .mount(&server)
            .await;

        let err = analyzer_for(&server).analyze(b"img", None).await.unwrap_err();
        match err {
            GuardError::UpstreamStatus { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("Incorrect API key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = analyzer_for(&server).analyze(b"img", None).await.unwrap_err();
        assert!(matches!(err, GuardError::MalformedModelResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_failure() {
        let settings = VisionSettings::new("k")
            .with_api_base("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2));
        let err = OpenAiAnalyzer::new(settings)
            .unwrap()
            .analyze(b"img", None)
            .await
            .unwrap_err();
        assert!(matches!(err, GuardError::UpstreamTransport(_)));
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(2_000);
        let cut = truncate(&body);
        assert_eq!(cut.len(), MAX_ERROR_BODY_CHARS + 3);
    }
}
