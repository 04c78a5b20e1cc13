//! Self-hosted backend speaking the OpenAI-compatible chat completions API
//! (llama.cpp server, Ollama and friends). No authentication.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ConversationTurn, Provider, ProviderError, TurnRole};

/// Default llama.cpp server address.
pub const DEFAULT_LOCAL_URL: &str = "http://127.0.0.1:8080";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 512;

/// Client for a local chat-completions endpoint.
#[derive(Clone)]
pub struct LocalProvider {
    client: Client,
    base_url: String,
}

impl LocalProvider {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self::new(DEFAULT_LOCAL_URL)
    }
}

#[async_trait]
impl Provider for LocalProvider {
    async fn complete(&self, conversation: &[ConversationTurn]) -> Result<String, ProviderError> {
        if conversation.is_empty() {
            return Err(ProviderError::EmptyConversation);
        }

        let request = ChatRequest {
            messages: conversation.iter().map(ChatMessage::from).collect(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(format!("failed to read response body: {e}")))?;

        extract_reply(status, &body)
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// Turn a raw HTTP status and body into reply text.
fn extract_reply(status: u16, body: &str) -> Result<String, ProviderError> {
    if status != 200 {
        return Err(ProviderError::Status {
            status,
            body: body.to_string(),
        });
    }

    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or(ProviderError::EmptyReply)?;

    Ok(clean_reply(&choice.message.content))
}

/// Strip whitespace and stray wrapping quotes, normalise typographic apostrophes.
fn clean_reply(text: &str) -> String {
    text.trim()
        .trim_matches('"')
        .replace(['\u{2019}', '\u{2018}'], "'")
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: String,
}

impl From<&ConversationTurn> for ChatMessage {
    fn from(turn: &ConversationTurn) -> Self {
        let role = match turn.role {
            TurnRole::System => "system",
            TurnRole::User => "user",
            TurnRole::Model => "assistant",
        };
        Self {
            role: role.to_string(),
            content: turn.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = LocalProvider::new("http://localhost:8080/");
        assert_eq!(
            provider.endpoint(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_shape() {
        let conversation = vec![
            ConversationTurn::system("judge"),
            ConversationTurn::user("I attack."),
            ConversationTurn::model("ok"),
        ];
        let request = ChatRequest {
            messages: conversation.iter().map(ChatMessage::from).collect(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][2]["role"], "assistant");
        assert_eq!(json["max_tokens"], MAX_TOKENS);
    }

    #[test]
    fn test_extract_reply_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  {\"score\": 8}\n"}}]}"#;
        assert_eq!(extract_reply(200, body).unwrap(), "{\"score\": 8}");
    }

    #[test]
    fn test_extract_reply_non_success_status() {
        let err = extract_reply(503, "loading model").unwrap_err();
        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "loading model");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extract_reply_no_choices() {
        assert!(matches!(
            extract_reply(200, r#"{"choices":[]}"#),
            Err(ProviderError::EmptyReply)
        ));
    }

    #[test]
    fn test_extract_reply_garbage_body() {
        assert!(matches!(
            extract_reply(200, "<html>"),
            Err(ProviderError::Decode(_))
        ));
    }

    #[test]
    fn test_clean_reply() {
        assert_eq!(clean_reply("\"It\u{2019}s fine\"\n"), "It's fine");
    }

    #[tokio::test]
    async fn test_empty_conversation_rejected() {
        let provider = LocalProvider::default();
        assert!(matches!(
            provider.complete(&[]).await,
            Err(ProviderError::EmptyConversation)
        ));
    }
}
