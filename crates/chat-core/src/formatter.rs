//! Conversation normalization.
//!
//! Providers disagree on how a system prompt travels, and several of them
//! reject a conversation whose first turn is not from the user. Every adapter
//! therefore works from a [`FormattedConversation`] rather than the raw list.

use crate::message::{Message, Role};

/// Content of the synthetic user turn inserted when a conversation does not
/// open with a user message.
pub const CONVERSATION_STARTED: &str = "Conversation started.";

/// A conversation split into its system prompt and ordered turns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedConversation {
    /// The last system message seen, if any.
    pub system_prompt: Option<String>,
    /// Non-system messages in chronological order, opening with a user turn.
    pub messages: Vec<Message>,
}

impl FormattedConversation {
    /// True when there is nothing to send to a provider.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Turns with the system prompt re-attached as the leading message.
    ///
    /// This is the shape OpenAI-style chat completion endpoints expect.
    pub fn with_system_message(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        if let Some(prompt) = &self.system_prompt {
            messages.push(Message::system(prompt.clone()));
        }
        messages.extend(self.messages.iter().cloned());
        messages
    }

    /// Content of the most recent user turn.
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|msg| msg.role == Role::User)
            .map(|msg| msg.content.as_str())
    }
}

/// Split a raw message list into a system prompt and provider-ready turns.
///
/// Later system messages overwrite earlier ones. If the remaining turns are
/// non-empty and do not start with a user message, a placeholder user turn is
/// prepended.
pub fn format_conversation(messages: &[Message]) -> FormattedConversation {
    let mut system_prompt = None;
    let mut turns = Vec::with_capacity(messages.len() + 1);

    for msg in messages {
        match msg.role {
            Role::System => system_prompt = Some(msg.content.clone()),
            _ => turns.push(msg.clone()),
        }
    }

    if turns.first().is_some_and(|first| first.role != Role::User) {
        turns.insert(0, Message::user(CONVERSATION_STARTED));
    }

    FormattedConversation {
        system_prompt,
        messages: turns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_first_unchanged() {
        let input = vec![
            Message::system("be brief"),
            Message::user("hi"),
            Message::assistant("hello"),
            Message::user("how are you"),
        ];

        let formatted = format_conversation(&input);
        assert_eq!(formatted.system_prompt.as_deref(), Some("be brief"));
        assert_eq!(formatted.messages, input[1..].to_vec());
    }

    #[test]
    fn test_assistant_first_gets_placeholder() {
        let input = vec![Message::assistant("welcome"), Message::user("hi")];

        let formatted = format_conversation(&input);
        assert_eq!(formatted.messages.len(), 3);
        assert_eq!(formatted.messages[0], Message::user(CONVERSATION_STARTED));
        assert_eq!(formatted.messages[1], Message::assistant("welcome"));
    }

    #[test]
    fn test_last_system_message_wins() {
        let input = vec![
            Message::system("first"),
            Message::user("hi"),
            Message::system("second"),
        ];

        let formatted = format_conversation(&input);
        assert_eq!(formatted.system_prompt.as_deref(), Some("second"));
        assert_eq!(formatted.messages, vec![Message::user("hi")]);
    }

    #[test]
    fn test_only_system_is_empty() {
        let formatted = format_conversation(&[Message::system("rules")]);
        assert!(formatted.is_empty());
        assert_eq!(formatted.system_prompt.as_deref(), Some("rules"));
    }

    #[test]
    fn test_with_system_message_leads() {
        let formatted = format_conversation(&[Message::user("hi"), Message::system("sys")]);
        let messages = formatted.with_system_message();
        assert_eq!(messages[0], Message::system("sys"));
        assert_eq!(messages[1], Message::user("hi"));
    }

    #[test]
    fn test_last_user_text() {
        let formatted = format_conversation(&[
            Message::user("one"),
            Message::assistant("reply"),
            Message::user("two"),
            Message::assistant("reply again"),
        ]);
        assert_eq!(formatted.last_user_text(), Some("two"));
    }
}
