/// Chat relay to the hosted generative model
///
/// Stateless beyond request shaping: the persona instruction, the caller's
/// prior turns, and a date-stamped user message are forwarded to the model
/// endpoint and the reply text is relayed back.

use crate::{
    config::ChatConfig,
    error::{ApiError, ApiResult},
};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

/// Persona instruction sent with every conversation
const SYSTEM_INSTRUCTION: &str = "You are Ileana, an intelligent, friendly, highly reliable AI \
farming assistant built to support Indian farmers, agricultural students, and beginners. Your \
mission is to simplify farming, prevent crop loss, increase yield, educate new farmers, and \
provide accurate, actionable agricultural guidance. You cover weather and climate advice, crop \
selection and husbandry, fertilizer and pesticide recommendations with safe-use disclaimers, \
disease and pest diagnosis, market and government-scheme information, and learning resources. \
Respond in the same language as the user and keep the language simple and farmer-friendly. Be \
warm, respectful, and encouraging; use bullet points for clarity. Never give harmful, illegal, \
or unsafe instructions, and encourage soil testing and expert consultation when needed. You are \
a popup chatbot, so keep responses concise but thorough enough to be helpful. If asked about \
something unrelated to farming or rural life, politely steer the conversation back to farming.";

/// One prior conversation turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// "user" or "model"
    pub role: String,
    pub text: String,
}

/// Chat request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1))]
    pub message: String,
    pub history: Option<Vec<ChatTurn>>,
}

/// Chat response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Chat relay service
pub struct ChatRelay {
    config: Option<ChatConfig>,
    client: reqwest::Client,
}

impl ChatRelay {
    /// Create a new chat relay
    pub fn new(config: Option<ChatConfig>) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| ApiError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Check if the model endpoint is configured
    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Relay one conversation turn to the model and return its reply
    pub async fn send(&self, message: &str, history: &[ChatTurn]) -> ApiResult<String> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| ApiError::upstream("Model endpoint not configured"))?;

        let body = shape_request(message, history);

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                config.api_url, config.model
            ))
            .query(&[("key", config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::upstream(format!("Model request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            // Quota and overload statuses pass through to the caller
            let relayed = match status.as_u16() {
                429 => StatusCode::TOO_MANY_REQUESTS,
                503 => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let detail = response.text().await.unwrap_or_default();
            return Err(ApiError::upstream_status(
                relayed,
                format!("Model request failed with status {}: {}", status, detail),
            ));
        }

        let payload = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ApiError::upstream(format!("Malformed model response: {}", e)))?;

        extract_reply(&payload)
            .ok_or_else(|| ApiError::upstream("Model response contained no reply text"))
    }
}

/// Build the model request body from the history and the new message
fn shape_request(message: &str, history: &[ChatTurn]) -> serde_json::Value {
    let mut contents: Vec<serde_json::Value> = history
        .iter()
        .map(|turn| {
            let role = if turn.role == "model" { "model" } else { "user" };
            json!({ "role": role, "parts": [{ "text": turn.text }] })
        })
        .collect();

    let today = chrono::Utc::now().format("%a %b %e %Y");
    contents.push(json!({
        "role": "user",
        "parts": [{ "text": format!("[System Note: Today's Date is {}] {}", today, message) }],
    }));

    json!({
        "system_instruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        "contents": contents,
    })
}

/// Pull the first candidate's text out of a model response
fn extract_reply(payload: &serde_json::Value) -> Option<String> {
    payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_shaping_preserves_history_order() {
        let history = vec![
            ChatTurn {
                role: "user".to_string(),
                text: "What should I sow in June?".to_string(),
            },
            ChatTurn {
                role: "model".to_string(),
                text: "Paddy, if irrigation allows.".to_string(),
            },
        ];

        let body = shape_request("And fertilizer?", &history);
        let contents = body["contents"].as_array().unwrap();

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");

        let last = contents[2]["parts"][0]["text"].as_str().unwrap();
        assert!(last.contains("And fertilizer?"));
        assert!(last.starts_with("[System Note: Today's Date is"));
    }

    #[test]
    fn unknown_roles_fall_back_to_user() {
        let history = vec![ChatTurn {
            role: "assistant".to_string(),
            text: "hello".to_string(),
        }];

        let body = shape_request("hi", &history);
        assert_eq!(body["contents"][0]["role"], "user");
    }

    #[test]
    fn reply_extraction_handles_expected_shape() {
        let payload = serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Sow paddy." }] } }
            ]
        });
        assert_eq!(extract_reply(&payload).as_deref(), Some("Sow paddy."));

        let empty = serde_json::json!({ "candidates": [] });
        assert!(extract_reply(&empty).is_none());
    }

    #[tokio::test]
    async fn unconfigured_relay_is_upstream_error() {
        let relay = ChatRelay::new(None).unwrap();

        assert!(matches!(
            relay.send("hello", &[]).await,
            Err(ApiError::Upstream { .. })
        ));
    }
}
