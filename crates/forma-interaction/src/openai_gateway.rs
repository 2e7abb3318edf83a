//! OpenAiGateway - Direct REST implementation of the `ModelGateway` port.
//!
//! This gateway calls the OpenAI Responses API directly without SDK
//! dependency. Configuration priority: ~/.config/forma/secret.json >
//! environment variables. Conversation continuity uses
//! `previous_response_id` so established threads are resumed instead of
//! replayed.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::env;
use std::time::Duration;

use forma_core::config::load_secret_config;
use forma_core::error::{FormaError, Result};
use forma_core::gateway::{ModelGateway, ThreadHandle, TurnReply};
use forma_core::state::ConversationState;

use crate::instructions::{CRITIQUE_INSTRUCTIONS, SYSTEM_INSTRUCTIONS};

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_REASONING_EFFORT: &str = "low";
const BASE_URL: &str = "https://api.openai.com/v1/responses";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// JSON reply schema for a conversation turn.
static TURN_REPLY_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["assistant_message", "state"],
        "properties": {
            "assistant_message": {"type": "string"},
            "state": {
                "type": "object",
                "required": [
                    "mode",
                    "convergence_ready",
                    "confidence",
                    "direction_thesis",
                    "next_user_prompt"
                ],
                "properties": {
                    "mode": {
                        "type": "string",
                        "enum": ["DISCOVERY", "INTENT_LOCK", "BUILDER"]
                    },
                    "convergence_ready": {"type": "boolean"},
                    "confidence": {
                        "type": "object",
                        "additionalProperties": {"type": "integer"}
                    },
                    "direction_thesis": {"type": "string"},
                    "next_user_prompt": {"type": "string"}
                }
            },
            "blueprint_md": {"type": ["string", "null"]}
        }
    })
});

/// JSON reply schema for the contradiction pass.
static CRITIQUE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["issues"],
        "properties": {
            "issues": {
                "type": "array",
                "items": {"type": "string"}
            }
        }
    })
});

/// Gateway implementation that talks to the OpenAI HTTP API.
#[derive(Clone)]
pub struct OpenAiGateway {
    client: Client,
    api_key: String,
    model: String,
    reasoning_effort: String,
}

impl OpenAiGateway {
    /// Creates a new gateway with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            reasoning_effort: DEFAULT_REASONING_EFFORT.to_string(),
        }
    }

    /// Loads configuration from ~/.config/forma/secret.json or environment
    /// variables.
    ///
    /// Priority:
    /// 1. ~/.config/forma/secret.json
    /// 2. Environment variables (OPENAI_API_KEY, FORMA_MODEL_NAME,
    ///    FORMA_REASONING_EFFORT)
    ///
    /// Model name defaults to `gpt-4o-mini` if not specified.
    pub fn try_from_env() -> Result<Self> {
        // Try loading from secret.json first
        if let Ok(secret_config) = load_secret_config() {
            if let Some(openai_config) = secret_config.openai {
                let model = openai_config
                    .model_name
                    .unwrap_or_else(|| DEFAULT_MODEL.into());
                let effort = openai_config
                    .reasoning_effort
                    .unwrap_or_else(|| DEFAULT_REASONING_EFFORT.into());
                return Ok(Self::new(openai_config.api_key, model).with_reasoning_effort(effort));
            }
        }

        // Fallback to environment variables
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            FormaError::config(
                "OPENAI_API_KEY not found in ~/.config/forma/secret.json or environment variables",
            )
        })?;

        let model = env::var("FORMA_MODEL_NAME").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let effort =
            env::var("FORMA_REASONING_EFFORT").unwrap_or_else(|_| DEFAULT_REASONING_EFFORT.into());
        Ok(Self::new(api_key, model).with_reasoning_effort(effort))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the reasoning effort after construction.
    pub fn with_reasoning_effort(mut self, effort: impl Into<String>) -> Self {
        self.reasoning_effort = effort.into();
        self
    }

    async fn send_request(&self, body: &ResponsesRequest) -> Result<ResponsesReply> {
        let response = self
            .client
            .post(BASE_URL)
            .timeout(REQUEST_TIMEOUT)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| FormaError::provider(format!("OpenAI API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        response
            .json()
            .await
            .map_err(|err| FormaError::provider(format!("Failed to parse OpenAI response: {err}")))
    }
}

#[async_trait]
impl ModelGateway for OpenAiGateway {
    async fn continue_conversation(
        &self,
        thread: Option<&ThreadHandle>,
        user_text: &str,
    ) -> Result<TurnReply> {
        let request = ResponsesRequest {
            model: self.model.clone(),
            instructions: Some(SYSTEM_INSTRUCTIONS.to_string()),
            input: vec![InputMessage {
                role: "user",
                content: user_text.to_string(),
            }],
            previous_response_id: thread.map(|t| t.as_str().to_string()),
            reasoning: Some(Reasoning {
                effort: self.reasoning_effort.clone(),
            }),
            text: TextOptions::json_schema("turn_reply", TURN_REPLY_SCHEMA.clone()),
        };

        let reply = self.send_request(&request).await?;
        let thread = ThreadHandle::new(reply.id.clone());
        let text = extract_output_text(reply)?;

        let parsed: TurnReplyWire = serde_json::from_str(&text).map_err(|err| {
            FormaError::provider(format!("Malformed turn reply from provider: {err}"))
        })?;

        Ok(TurnReply {
            assistant_message: parsed.assistant_message,
            state: parsed.state,
            blueprint_md: parsed.blueprint_md,
            thread,
        })
    }

    async fn critique(&self, blueprint_md: &str) -> Result<Vec<String>> {
        let request = ResponsesRequest {
            model: self.model.clone(),
            instructions: Some(CRITIQUE_INSTRUCTIONS.to_string()),
            input: vec![InputMessage {
                role: "user",
                content: blueprint_md.to_string(),
            }],
            previous_response_id: None,
            reasoning: Some(Reasoning {
                effort: self.reasoning_effort.clone(),
            }),
            text: TextOptions::json_schema("critique", CRITIQUE_SCHEMA.clone()),
        };

        // The contradiction pass never blocks blueprint delivery; any failure
        // here is reported as CritiqueUnavailable and downgraded by callers.
        let reply = self
            .send_request(&request)
            .await
            .map_err(|err| FormaError::CritiqueUnavailable(err.to_string()))?;
        let text = extract_output_text(reply)
            .map_err(|err| FormaError::CritiqueUnavailable(err.to_string()))?;

        let parsed: CritiqueWire = serde_json::from_str(&text).map_err(|err| {
            FormaError::CritiqueUnavailable(format!("Malformed critique reply: {err}"))
        })?;

        Ok(parsed.issues)
    }
}

#[derive(Serialize)]
struct ResponsesRequest {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
    input: Vec<InputMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_response_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<Reasoning>,
    text: TextOptions,
}

#[derive(Serialize)]
struct InputMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct Reasoning {
    effort: String,
}

#[derive(Serialize)]
struct TextOptions {
    format: ReplyFormat,
}

impl TextOptions {
    fn json_schema(name: &'static str, schema: Value) -> Self {
        Self {
            format: ReplyFormat {
                r#type: "json_schema",
                name,
                schema,
            },
        }
    }
}

#[derive(Serialize)]
struct ReplyFormat {
    r#type: &'static str,
    name: &'static str,
    schema: Value,
}

#[derive(Deserialize)]
struct ResponsesReply {
    id: String,
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum OutputItem {
    #[serde(rename = "message")]
    Message { content: Vec<OutputContent> },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum OutputContent {
    #[serde(rename = "output_text")]
    OutputText { text: String },
    #[serde(other)]
    Other,
}

/// Structured turn reply as returned inside the response text.
#[derive(Deserialize)]
struct TurnReplyWire {
    assistant_message: String,
    state: ConversationState,
    #[serde(default)]
    blueprint_md: Option<String>,
}

#[derive(Deserialize)]
struct CritiqueWire {
    #[serde(default)]
    issues: Vec<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[allow(dead_code)]
    r#type: Option<String>,
    #[allow(dead_code)]
    code: Option<String>,
}

fn extract_output_text(reply: ResponsesReply) -> Result<String> {
    reply
        .output
        .into_iter()
        .find_map(|item| match item {
            OutputItem::Message { content } => content.into_iter().find_map(|block| match block {
                OutputContent::OutputText { text } => Some(text),
                OutputContent::Other => None,
            }),
            OutputItem::Other => None,
        })
        .ok_or_else(|| {
            FormaError::provider("OpenAI API returned no output text in the response")
        })
}

fn map_http_error(status: StatusCode, body: String) -> FormaError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    FormaError::provider_status(status.as_u16(), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forma_core::mode::Mode;

    fn sample_reply(text: &str) -> ResponsesReply {
        let payload = json!({
            "id": "resp_123",
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "message", "role": "assistant", "content": [
                    {"type": "output_text", "text": text, "annotations": []}
                ]}
            ]
        });
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn test_extract_output_text_skips_reasoning_items() {
        let reply = sample_reply("hello");
        assert_eq!(reply.id, "resp_123");
        assert_eq!(extract_output_text(reply).unwrap(), "hello");
    }

    #[test]
    fn test_extract_output_text_fails_without_message() {
        let reply: ResponsesReply = serde_json::from_value(json!({
            "id": "resp_empty",
            "output": [{"type": "reasoning", "summary": []}]
        }))
        .unwrap();

        let err = extract_output_text(reply).unwrap_err();
        assert!(err.is_provider());
    }

    #[test]
    fn test_turn_reply_wire_parses_structured_text() {
        let text = json!({
            "assistant_message": "Locked. Ready to build.",
            "state": {
                "mode": "BUILDER",
                "convergence_ready": true,
                "confidence": {"direction": 5},
                "direction_thesis": "Online store for refill bottles.",
                "next_user_prompt": "Review the blueprint."
            },
            "blueprint_md": "## 1. Business summary\n"
        })
        .to_string();

        let parsed: TurnReplyWire = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.state.mode, Mode::Builder);
        assert!(parsed.state.convergence_ready);
        assert_eq!(parsed.blueprint_md.as_deref(), Some("## 1. Business summary\n"));
    }

    #[test]
    fn test_turn_reply_wire_rejects_unknown_mode() {
        let text = r#"{"assistant_message": "x", "state": {"mode": "EXPLORE"}}"#;
        assert!(serde_json::from_str::<TurnReplyWire>(text).is_err());
    }

    #[test]
    fn test_map_http_error_parses_error_body() {
        let body = json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}
        })
        .to_string();

        let err = map_http_error(StatusCode::UNAUTHORIZED, body);
        match err {
            FormaError::Provider {
                status_code,
                message,
            } => {
                assert_eq!(status_code, Some(401));
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_map_http_error_falls_back_to_raw_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream exploded".to_string());
        assert_eq!(
            err.to_string(),
            "Provider error: upstream exploded"
        );
    }

    #[test]
    fn test_continuation_id_serialized_only_when_present() {
        let fresh = ResponsesRequest {
            model: "gpt-4o-mini".to_string(),
            instructions: Some("sys".to_string()),
            input: vec![InputMessage {
                role: "user",
                content: "hi".to_string(),
            }],
            previous_response_id: None,
            reasoning: None,
            text: TextOptions::json_schema("turn_reply", TURN_REPLY_SCHEMA.clone()),
        };
        let value = serde_json::to_value(&fresh).unwrap();
        assert!(value.get("previous_response_id").is_none());

        let continued = ResponsesRequest {
            previous_response_id: Some("resp_123".to_string()),
            ..fresh
        };
        let value = serde_json::to_value(&continued).unwrap();
        assert_eq!(value["previous_response_id"], "resp_123");
        assert_eq!(value["text"]["format"]["type"], "json_schema");
    }

    #[test]
    fn test_critique_wire_defaults_to_empty() {
        let parsed: CritiqueWire = serde_json::from_str("{}").unwrap();
        assert!(parsed.issues.is_empty());
    }
}
