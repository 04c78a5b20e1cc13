//! Cloud backend: an authenticated Claude session.

use async_trait::async_trait;
use claude::{Claude, Message, Request};

use super::{ConversationTurn, Provider, ProviderError, TurnRole};

const MAX_TOKENS: usize = 1024;
const TEMPERATURE: f32 = 0.7;

pub struct CloudProvider {
    client: Claude,
}

impl CloudProvider {
    /// Build the backend. Fails on an empty or malformed credential.
    pub fn new(api_key: &str, model: Option<&str>) -> Result<Self, ProviderError> {
        let client = Claude::new(api_key).map_err(|e| ProviderError::Construction {
            backend: "cloud",
            reason: e.to_string(),
        })?;

        let client = match model.map(str::trim).filter(|m| !m.is_empty()) {
            Some(model) => client.with_model(model),
            None => client,
        };

        Ok(Self { client })
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }
}

/// A leading system turn becomes the system instruction; the rest is history.
fn build_request(conversation: &[ConversationTurn]) -> Result<Request, ProviderError> {
    let (system, history) = match conversation.split_first() {
        None => return Err(ProviderError::EmptyConversation),
        Some((first, rest)) if first.role == TurnRole::System => (Some(&first.content), rest),
        Some(_) => (None, conversation),
    };

    if history.is_empty() {
        return Err(ProviderError::EmptyConversation);
    }

    let messages = history
        .iter()
        .map(|turn| match turn.role {
            TurnRole::Model => Message::assistant(turn.content.clone()),
            TurnRole::User | TurnRole::System => Message::user(turn.content.clone()),
        })
        .collect();

    let request = Request::new(messages)
        .with_max_tokens(MAX_TOKENS)
        .with_temperature(TEMPERATURE);
    Ok(match system {
        Some(system) => request.with_system(system.clone()),
        None => request,
    })
}

#[async_trait]
impl Provider for CloudProvider {
    async fn complete(&self, conversation: &[ConversationTurn]) -> Result<String, ProviderError> {
        let request = build_request(conversation)?;
        let response = self.client.complete(request).await?;

        let text = response.text();
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyReply);
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "cloud"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claude::Role;

    #[test]
    fn test_empty_key_is_construction_failure() {
        let result = CloudProvider::new("", None);
        assert!(matches!(
            result,
            Err(ProviderError::Construction {
                backend: "cloud",
                ..
            })
        ));
    }

    #[test]
    fn test_model_override() {
        let provider = CloudProvider::new("sk-test", Some("claude-3-haiku")).unwrap();
        assert_eq!(provider.model(), "claude-3-haiku");

        let provider = CloudProvider::new("sk-test", Some("  ")).unwrap();
        assert_eq!(provider.model(), claude::DEFAULT_MODEL);
    }

    #[test]
    fn test_system_turn_becomes_instruction() {
        let request = build_request(&[
            ConversationTurn::system("be a judge"),
            ConversationTurn::user("I swing my sword."),
        ])
        .unwrap();

        assert_eq!(request.system.as_deref(), Some("be a judge"));
        assert_eq!(request.temperature, Some(TEMPERATURE));
        assert_eq!(request.max_tokens, MAX_TOKENS);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
    }

    #[test]
    fn test_model_turns_map_to_assistant() {
        let request = build_request(&[
            ConversationTurn::user("hi"),
            ConversationTurn::model("hello"),
            ConversationTurn::user("again"),
        ])
        .unwrap();

        assert!(request.system.is_none());
        let roles: Vec<Role> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
    }

    #[test]
    fn test_system_only_conversation_rejected() {
        assert!(matches!(
            build_request(&[ConversationTurn::system("rules")]),
            Err(ProviderError::EmptyConversation)
        ));
        assert!(matches!(
            build_request(&[]),
            Err(ProviderError::EmptyConversation)
        ));
    }
}
