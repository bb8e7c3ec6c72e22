//! Google Gemini provider implementation

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Generator, ProviderError};
use crate::ledger::{Role, Turn};
use crate::persona::{OPENING_INSTRUCTION, OPENING_PROMPT, SYSTEM_INSTRUCTION};

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini client for the `generateContent` REST endpoint.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to create HTTP client");

        Self {
            client,
            api_key: api_key.into(),
            base_url: format!("{API_BASE}/{model}:generateContent"),
        }
    }

    async fn generate(
        &self,
        system_instruction: &str,
        contents: Vec<GeminiContent>,
    ) -> Result<String, ProviderError> {
        let request = GeminiRequest {
            contents,
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: system_instruction.to_string(),
                }],
            },
            generation_config: GeminiGenerationConfig {
                thinking_config: GeminiThinkingConfig { thinking_budget: 0 },
            },
        };

        let url = format!("{}?key={}", self.base_url, self.api_key);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::network(format!("request timeout: {e}"))
                } else {
                    ProviderError::network(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::malformed(format!("failed to parse response: {e}")))?;
        extract_text(parsed)
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn initial_turn(&self) -> Result<String, ProviderError> {
        let contents = vec![GeminiContent::user(OPENING_PROMPT)];
        self.generate(OPENING_INSTRUCTION, contents).await
    }

    async fn continue_turn(&self, history: &[Turn], text: &str) -> Result<String, ProviderError> {
        let mut contents = build_contents(history);
        contents.push(GeminiContent::user(text));
        self.generate(SYSTEM_INSTRUCTION, contents).await
    }
}

/// Map ledger turns to wire contents. Empty turns (an assistant reply that
/// never got any text) are skipped; the API rejects empty parts.
fn build_contents(history: &[Turn]) -> Vec<GeminiContent> {
    history
        .iter()
        .filter(|turn| !turn.text.is_empty())
        .map(|turn| GeminiContent {
            role: Some(wire_role(turn.role).to_string()),
            parts: vec![GeminiPart {
                text: turn.text.clone(),
            }],
        })
        .collect()
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

fn classify_status(status: StatusCode, body: &str) -> ProviderError {
    let message = serde_json::from_str::<GeminiErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status.as_u16() {
        400 => ProviderError::invalid_request(format!("invalid request: {message}")),
        401 | 403 => ProviderError::auth(format!("authentication failed: {message}")),
        429 => ProviderError::rate_limit(format!("rate limit exceeded: {message}")),
        500..=599 => ProviderError::server(format!("server error: {message}")),
        _ => ProviderError::network(format!("HTTP {status}: {message}")),
    }
}

fn extract_text(response: GeminiResponse) -> Result<String, ProviderError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::malformed("no candidates in response"))?;

    let text: String = candidate
        .content
        .parts
        .into_iter()
        .map(|part| part.text)
        .collect();

    if text.is_empty() {
        return Err(ProviderError::malformed("candidate had no text parts"));
    }
    Ok(text)
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    system_instruction: GeminiContent,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![GeminiPart { text: text.into() }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    thinking_config: GeminiThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ProviderErrorKind;

    #[test]
    fn history_maps_to_wire_roles() {
        let history = vec![
            Turn::assistant("Where are you from?"),
            Turn::user("Mars"),
        ];
        let contents = build_contents(&history);
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role.as_deref(), Some("model"));
        assert_eq!(contents[0].parts[0].text, "Where are you from?");
        assert_eq!(contents[1].role.as_deref(), Some("user"));
    }

    #[test]
    fn empty_turns_are_skipped() {
        let history = vec![Turn::user("hi"), Turn::assistant("")];
        let contents = build_contents(&history);
        assert_eq!(contents.len(), 1);
    }

    #[test]
    fn request_serializes_with_camel_case_keys() {
        let request = GeminiRequest {
            contents: vec![GeminiContent::user("hello")],
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: "be brief".to_string(),
                }],
            },
            generation_config: GeminiGenerationConfig {
                thinking_config: GeminiThinkingConfig { thinking_budget: 0 },
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(
            value["generationConfig"]["thinkingConfig"]["thinkingBudget"],
            0
        );
        assert!(value["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn status_codes_classify_into_error_kinds() {
        let cases = [
            (StatusCode::BAD_REQUEST, ProviderErrorKind::InvalidRequest),
            (StatusCode::UNAUTHORIZED, ProviderErrorKind::Auth),
            (StatusCode::FORBIDDEN, ProviderErrorKind::Auth),
            (StatusCode::TOO_MANY_REQUESTS, ProviderErrorKind::RateLimit),
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ProviderErrorKind::Server,
            ),
            (StatusCode::IM_A_TEAPOT, ProviderErrorKind::Network),
        ];
        for (status, kind) in cases {
            assert_eq!(classify_status(status, "{}").kind, kind, "{status}");
        }
    }

    #[test]
    fn error_body_message_is_extracted() {
        let body = r#"{"error":{"message":"quota exhausted","code":429}}"#;
        let err = classify_status(StatusCode::TOO_MANY_REQUESTS, body);
        assert!(err.message.contains("quota exhausted"));
    }

    #[test]
    fn response_text_is_concatenated_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Nice "},{"text":"line."}]}}]}"#;
        let parsed: GeminiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(extract_text(parsed).unwrap(), "Nice line.");
    }

    #[test]
    fn missing_candidates_is_malformed() {
        let parsed: GeminiResponse = serde_json::from_str("{}").unwrap();
        let err = extract_text(parsed).unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Malformed);
    }
}
