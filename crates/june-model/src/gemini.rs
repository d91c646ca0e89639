//! Gemini `generateContent` backend.
//!
//! The REST endpoint is stateless, so a [`GeminiChatSession`] resends its full
//! history with every prompt. Requests carry the system instruction, the
//! history as `user`/`model` contents, and the configured sampling
//! parameters.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::{GeminiConfig, GenerationConfig};
use crate::error::{ModelError, ModelResult};
use crate::{truncate_turns, ChatModel, ChatRole, ChatSession, ChatTurn};

const PROVIDER: &str = "gemini";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: &'a GenerationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

// ============================================================================
// Request / response mapping
// ============================================================================

fn build_request<'a>(
    system_instruction: &str,
    history: &[ChatTurn],
    prompt: &str,
    generation: &'a GenerationConfig,
) -> GenerateContentRequest<'a> {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|turn| Content::text(Some(turn.role.as_str()), &turn.text))
        .collect();
    contents.push(Content::text(Some(ChatRole::User.as_str()), prompt));

    GenerateContentRequest {
        system_instruction: Content::text(None, system_instruction),
        contents,
        generation_config: generation,
    }
}

/// Extract the reply text from a successful response body.
fn parse_response(model_id: &str, body: &str) -> ModelResult<String> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;

    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_deref())
    {
        return Err(ModelError::blocked(reason));
    }

    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        ModelError::EmptyResponse {
            model_id: model_id.to_string(),
        }
    })?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        // A SAFETY stop usually arrives without any text.
        return match candidate.finish_reason.as_deref() {
            Some(reason @ ("SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST" | "SPII")) => {
                Err(ModelError::blocked(reason))
            }
            _ => Err(ModelError::EmptyResponse {
                model_id: model_id.to_string(),
            }),
        };
    }

    Ok(text)
}

/// Map a non-success response to a [`ModelError::Api`].
///
/// The status code prefers the most specific detail reason (for example
/// `API_KEY_INVALID`) over the generic status text.
fn parse_error(status: u16, body: &str) -> ModelError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let code = envelope
                .error
                .details
                .iter()
                .find_map(|detail| detail.reason.clone())
                .or(envelope.error.status);
            let message = if envelope.error.message.is_empty() {
                format!("HTTP {status}")
            } else {
                envelope.error.message
            };
            ModelError::api(PROVIDER, status, code, message)
        }
        Err(_) => ModelError::api(PROVIDER, status, None, body.trim().to_string()),
    }
}

// ============================================================================
// GeminiChatModel
// ============================================================================

#[derive(Debug)]
struct Endpoint {
    client: Client,
    url: String,
    api_key: String,
    model_id: String,
    timeout_secs: u64,
    system_instruction: String,
    generation: GenerationConfig,
}

impl Endpoint {
    fn generate(&self, history: &[ChatTurn], prompt: &str) -> ModelResult<String> {
        let request = build_request(&self.system_instruction, history, prompt, &self.generation);

        tracing::debug!(
            model = %self.model_id,
            turns = request.contents.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response.text().map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            let err = parse_error(status.as_u16(), &body);
            tracing::debug!(error = %err, "Gemini request failed");
            return Err(err);
        }

        parse_response(&self.model_id, &body)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ModelError {
        if err.is_timeout() {
            ModelError::Timeout {
                model_id: self.model_id.clone(),
                timeout_secs: self.timeout_secs,
            }
        } else {
            ModelError::transport(err.to_string())
        }
    }
}

/// Gemini chat model backed by the `generateContent` REST endpoint.
#[derive(Debug, Clone)]
pub struct GeminiChatModel {
    endpoint: Arc<Endpoint>,
}

impl GeminiChatModel {
    /// Create a model client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingApiKey`] when the config holds no usable
    /// key, or [`ModelError::InvalidConfig`] for a zero timeout or a client
    /// build failure.
    pub fn new(config: &GeminiConfig, system_instruction: &str) -> ModelResult<Self> {
        let api_key = config
            .usable_api_key()
            .ok_or_else(|| ModelError::MissingApiKey {
                provider: PROVIDER.to_string(),
            })?
            .to_string();

        if config.timeout_secs == 0 {
            return Err(ModelError::InvalidConfig {
                message: "timeoutSecs must be greater than 0".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ModelError::InvalidConfig {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        let url = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        tracing::debug!(model = %config.model, timeout_secs = config.timeout_secs, "Created Gemini chat model");

        Ok(Self {
            endpoint: Arc::new(Endpoint {
                client,
                url,
                api_key,
                model_id: config.model.clone(),
                timeout_secs: config.timeout_secs,
                system_instruction: system_instruction.to_string(),
                generation: config.generation.clone(),
            }),
        })
    }
}

impl ChatModel for GeminiChatModel {
    fn start_chat(&self, history: &[ChatTurn]) -> Box<dyn ChatSession> {
        Box::new(GeminiChatSession {
            endpoint: Arc::clone(&self.endpoint),
            history: history.to_vec(),
        })
    }

    fn model_id(&self) -> &str {
        &self.endpoint.model_id
    }
}

/// A Gemini conversation.
#[derive(Debug)]
pub struct GeminiChatSession {
    endpoint: Arc<Endpoint>,
    history: Vec<ChatTurn>,
}

impl ChatSession for GeminiChatSession {
    fn send_message(&mut self, prompt: &str) -> ModelResult<String> {
        let reply = self.endpoint.generate(&self.history, prompt)?;
        self.history.push(ChatTurn::user(prompt));
        self.history.push(ChatTurn::model(reply.clone()));
        Ok(reply)
    }

    fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    fn truncate(&mut self, max_turns: usize) {
        truncate_turns(&mut self.history, max_turns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_shape() {
        let generation = GenerationConfig::default();
        let history = vec![ChatTurn::user("Who is Daniel?"), ChatTurn::model("An ML engineer.")];
        let request = build_request("You are June.", &history, "And his skills?", &generation);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "You are June.");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["contents"].as_array().unwrap().len(), 3);
        assert_eq!(value["contents"][1]["role"], "model");
        assert_eq!(value["contents"][2]["role"], "user");
        assert_eq!(value["contents"][2]["parts"][0]["text"], "And his skills?");
        assert_eq!(value["generationConfig"]["topK"], 40);
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn test_parse_response_joins_parts() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello, "},{"text":"world!"}]},"finishReason":"STOP"}]}"#;
        assert_eq!(parse_response("gemini-1.5-pro", body).unwrap(), "Hello, world!");
    }

    #[test]
    fn test_parse_response_prompt_blocked() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let err = parse_response("m", body).unwrap_err();
        assert!(matches!(err, ModelError::Blocked { ref reason } if reason == "SAFETY"));
    }

    #[test]
    fn test_parse_response_candidate_safety_stop() {
        let body = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        let err = parse_response("m", body).unwrap_err();
        assert!(matches!(err, ModelError::Blocked { .. }));
    }

    #[test]
    fn test_parse_response_empty() {
        let err = parse_response("m", r#"{"candidates":[]}"#).unwrap_err();
        assert!(matches!(err, ModelError::EmptyResponse { .. }));

        let err = parse_response("m", "not json").unwrap_err();
        assert!(matches!(err, ModelError::Json(_)));
    }

    #[test]
    fn test_parse_error_prefers_detail_reason() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"@type":"type.googleapis.com/google.rpc.ErrorInfo","reason":"API_KEY_INVALID"}]}}"#;
        match parse_error(400, body) {
            ModelError::Api { status, code, message, .. } => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("API_KEY_INVALID"));
                assert!(message.contains("API key not valid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_status_text_and_raw_body() {
        let body = r#"{"error":{"code":429,"message":"Resource has been exhausted (e.g. check quota).","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = parse_error(429, body);
        assert!(matches!(err, ModelError::Api { ref code, .. } if code.as_deref() == Some("RESOURCE_EXHAUSTED")));

        let err = parse_error(502, "Bad Gateway\n");
        assert!(matches!(err, ModelError::Api { status: 502, ref message, .. } if message == "Bad Gateway"));
    }

    #[test]
    fn test_new_rejects_zero_timeout() {
        let config = GeminiConfig {
            api_key: Some("AIzaSyExampleKey".to_string()),
            timeout_secs: 0,
            ..Default::default()
        };
        let err = GeminiChatModel::new(&config, "sys").unwrap_err();
        assert!(matches!(err, ModelError::InvalidConfig { .. }));
    }

    #[test]
    fn test_start_chat_seeds_history_without_io() {
        let config = GeminiConfig {
            api_key: Some("AIzaSyExampleKey".to_string()),
            ..Default::default()
        };
        let model = GeminiChatModel::new(&config, "sys").unwrap();
        assert_eq!(model.model_id(), "gemini-1.5-pro");

        let session = model.start_chat(&[ChatTurn::user("hi"), ChatTurn::model("hello")]);
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_truncated_session_resends_bounded_history() {
        let config = GeminiConfig {
            api_key: Some("AIzaSyExampleKey".to_string()),
            ..Default::default()
        };
        let model = GeminiChatModel::new(&config, "sys").unwrap();
        let prompt = "x".repeat(3000);
        let seed: Vec<ChatTurn> = (0..15)
            .flat_map(|_| [ChatTurn::user(prompt.as_str()), ChatTurn::model("ok")])
            .collect();

        let mut session = model.start_chat(&seed);
        session.truncate(20);
        assert_eq!(session.history().len(), 20);
        assert_eq!(session.history()[0].role, ChatRole::User);

        let request = build_request("sys", session.history(), &prompt, &config.generation);
        assert_eq!(request.contents.len(), 21);
    }
}
