//! OpenAI-backed extraction oracle.
//!
//! One chat-completions client serves both sides of the port: free-form
//! reply generation and JSON-mode structured extraction. Extraction runs
//! at low temperature with `response_format: json_object`, and the
//! response body still goes through [`repair`] before being trusted.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::conversation::{Turn, TurnRole};
use crate::domain::intake::Question;
use crate::ports::{ExtractedField, ExtractionOracle, ExtractionResult, OracleError};

use super::repair;

const EXTRACTION_TEMPERATURE: f32 = 0.3;
const EXTRACTION_SYSTEM_PROMPT: &str =
    "You are a data extraction assistant. Extract structured data from conversations accurately.";

/// Configuration for the OpenAI oracle.
#[derive(Debug, Clone)]
pub struct OpenAiOracleConfig {
    api_key: Secret<String>,
    /// Model for both replies and extraction.
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAiOracleConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL (useful for proxies and test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI chat-completions implementation of the oracle port.
pub struct OpenAiOracle {
    config: OpenAiOracleConfig,
    client: Client,
}

impl OpenAiOracle {
    /// Creates a new oracle with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the HTTP client cannot be constructed.
    pub fn new(config: OpenAiOracleConfig) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OracleError::Unavailable(format!("HTTP client build failed: {e}")))?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, OracleError> {
        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout {
                        seconds: self.config.timeout.as_secs(),
                    }
                } else {
                    OracleError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Unavailable(format!(
                "status {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::ParseFailed(format!("response body: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OracleError::ParseFailed("no choices in response".to_string()))
    }

    fn history_messages(history: &[Turn]) -> Vec<ChatMessage> {
        history
            .iter()
            .map(|turn| ChatMessage {
                role: match turn.role {
                    TurnRole::User => "user",
                    TurnRole::Assistant => "assistant",
                }
                .to_string(),
                content: turn.content.clone(),
            })
            .collect()
    }

    /// The extraction prompt: the serialized conversation plus a compact
    /// view of the question schema with normalization guidance.
    fn extraction_prompt(history: &[Turn], questions: &[Question]) -> String {
        let transcript: Vec<serde_json::Value> = history
            .iter()
            .map(|turn| {
                serde_json::json!({
                    "role": match turn.role {
                        TurnRole::User => "user",
                        TurnRole::Assistant => "assistant",
                    },
                    "content": turn.content,
                })
            })
            .collect();
        let schema: Vec<serde_json::Value> = questions.iter().map(question_guidance).collect();

        format!(
            "You are extracting structured data from a conversation between a \
             marketing assistant and a business owner.\n\n\
             The conversation history:\n{history}\n\n\
             Required questions to extract answers for:\n{schema}\n\n\
             Extract the answers from the conversation. For each question:\n\
             - If the answer is present, extract the raw_answer and provide a normalized_value\n\
             - If the answer is not present, set normalized_value to null\n\
             - For select questions, normalize to the option value\n\
             - For text/textarea questions, keep the meaningful content\n\
             - Rate confidence as one of 0.0, 0.25, 0.5, 0.75, 1.0: 0.0 means not \
             mentioned anywhere, 0.75 means clearly implied from context or past \
             behavior, 1.0 means explicitly stated. Be permissive - if you can \
             reasonably infer an answer, use 0.5-0.75.\n\
             - Also extract \"user_name\" when the user introduces themselves \
             (\"I'm Maria\", \"call me Walter\").\n\n\
             Output as JSON with this structure:\n\
             {{\"question_id\": {{\"raw_answer\": \"...\", \"normalized_value\": \"...\", \"confidence\": 0.75}}, ...}}\n\n\
             Only include questions that have answers.",
            history = serde_json::to_string_pretty(&transcript).unwrap_or_default(),
            schema = serde_json::to_string_pretty(&schema).unwrap_or_default(),
        )
    }
}

fn question_guidance(question: &Question) -> serde_json::Value {
    let mut guidance = serde_json::json!({
        "id": question.id,
        "question": question.question_template,
        "type": question.question_type,
    });
    if !question.options.is_empty() {
        guidance["options"] = serde_json::json!(question
            .options
            .iter()
            .map(|o| o.value.as_str())
            .collect::<Vec<_>>());
    }
    if let Some(placeholder) = &question.placeholder {
        guidance["example_format"] = serde_json::json!(placeholder);
    }
    if let Some(why) = &question.why_matters {
        guidance["why_it_matters"] = serde_json::json!(why);
    }
    guidance
}

#[async_trait]
impl ExtractionOracle for OpenAiOracle {
    async fn generate_reply(
        &self,
        history: &[Turn],
        system_context: &str,
    ) -> Result<String, OracleError> {
        let mut messages = vec![ChatMessage {
            role: "system".to_string(),
            content: system_context.to_string(),
        }];
        messages.extend(Self::history_messages(history));

        self.complete(ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: None,
            response_format: None,
        })
        .await
    }

    async fn extract(
        &self,
        history: &[Turn],
        questions: &[Question],
    ) -> Result<ExtractionResult, OracleError> {
        let content = self
            .complete(ChatRequest {
                model: self.config.model.clone(),
                messages: vec![
                    ChatMessage {
                        role: "system".to_string(),
                        content: EXTRACTION_SYSTEM_PROMPT.to_string(),
                    },
                    ChatMessage {
                        role: "user".to_string(),
                        content: Self::extraction_prompt(history, questions),
                    },
                ],
                temperature: Some(EXTRACTION_TEMPERATURE),
                response_format: Some(ResponseFormat {
                    format_type: "json_object".to_string(),
                }),
            })
            .await?;

        let Some(object) = repair::parse_object(&content) else {
            tracing::warn!("extraction output unparseable after repair, extracting nothing");
            return Ok(ExtractionResult::new());
        };

        let mut result = ExtractionResult::new();
        if let serde_json::Value::Object(fields) = object {
            for (key, value) in fields {
                let Ok(question_id) = key.parse::<crate::domain::foundation::QuestionId>() else {
                    continue;
                };
                match serde_json::from_value::<ExtractedField>(value) {
                    Ok(field) => {
                        result.insert(question_id, field);
                    }
                    Err(err) => {
                        tracing::warn!(question = %key, error = %err, "malformed extraction field skipped");
                    }
                }
            }
        }
        Ok(result)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
