//! Prompt flattening for providers that take a single text input.

use crate::formatter::FormattedConversation;
use crate::message::Role;

/// Delimiter convention used when flattening a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// `[SYSTEM]`, `[USER]`, `[ASSISTANT]` line tags.
    Bracketed,
    /// `<|system|>`, `<|user|>`, `<|assistant|>` tokens (Zephyr/Mistral chat template).
    ChatTokens,
}

impl PromptStyle {
    fn tag(&self, role: Role) -> &'static str {
        match (self, role) {
            (PromptStyle::Bracketed, Role::System) => "[SYSTEM]",
            (PromptStyle::Bracketed, Role::User) => "[USER]",
            (PromptStyle::Bracketed, Role::Assistant) => "[ASSISTANT]",
            (PromptStyle::ChatTokens, Role::System) => "<|system|>",
            (PromptStyle::ChatTokens, Role::User) => "<|user|>",
            (PromptStyle::ChatTokens, Role::Assistant) => "<|assistant|>",
        }
    }
}

/// Render a conversation as one prompt string ending in an open assistant turn.
pub fn flatten_prompt(conversation: &FormattedConversation, style: PromptStyle) -> String {
    let mut prompt = String::new();

    if let Some(system) = &conversation.system_prompt {
        push_turn(&mut prompt, style.tag(Role::System), system);
    }

    for msg in &conversation.messages {
        push_turn(&mut prompt, style.tag(msg.role), &msg.content);
    }

    prompt.push_str(style.tag(Role::Assistant));
    prompt.push('\n');
    prompt
}

fn push_turn(prompt: &mut String, tag: &str, content: &str) {
    prompt.push_str(tag);
    prompt.push('\n');
    prompt.push_str(content);
    prompt.push('\n');
}
