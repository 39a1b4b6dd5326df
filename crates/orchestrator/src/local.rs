//! Local rule engine used when no provider is available.
//!
//! The most recent user message is classified by keyword, with categories
//! tested in a fixed priority order. Every category except the default has one
//! fixed reply. The default reply picks a template and a closing remark from
//! small pools and echoes a truncated copy of the input.

use std::sync::Arc;

use chat_core::{FormattedConversation, ModelPicker, RandomPicker};
use tracing::debug;

/// Reply used when the engine cannot produce anything else.
pub const FALLBACK_APOLOGY: &str =
    "Sorry, I couldn't put a reply together just now. Please try again in a moment.";

pub const GREETING_REPLY: &str =
    "Hello! I'm running in offline mode right now, but I'm here. What would you like to talk about?";

pub const DIAGNOSTIC_REPLY: &str =
    "Test received. The local responder is online; no external model providers are configured.";

pub const IDENTITY_REPLY: &str =
    "I'm the built-in offline assistant. When model providers are configured, their answers replace mine.";

pub const TECHNICAL_REPLY: &str =
    "That sounds like a technical question. Detailed answers need a model provider, which isn't available right now. Try breaking the problem into smaller steps in the meantime.";

pub const HELP_REPLY: &str =
    "Sorry you're running into trouble. Describe what you expected and what happened instead, and try again once a model provider is back online.";

pub const ADVERSARIAL_REPLY: &str =
    "Let's keep things civil. I'm happy to continue whenever you're ready.";

/// Templates for the default category; `{input}` is replaced by the echo.
pub const DEFAULT_TEMPLATES: &[&str] = &[
    "You said: \"{input}\". I'm answering offline, so I can only keep it short.",
    "\"{input}\" noted. Full answers return when a model provider is available.",
    "About \"{input}\": that deserves a proper answer, which needs an online model.",
    "I read \"{input}\", but I'm limited to simple replies in offline mode.",
];

/// Closing remarks appended to default replies.
pub const CLOSING_REMARKS: &[&str] = &[
    "Anything else on your mind?",
    "Feel free to ask again later.",
    "Thanks for your patience.",
    "I'll be more useful once I'm back online.",
];

/// Longest input echo, in characters, before truncation.
pub const ECHO_LIMIT: usize = 50;

const GREETING: &[&str] = &[
    "merhaba", "selam", "hello", "hi", "hey", "hola", "greetings", "good morning",
    "good evening",
];
const DIAGNOSTIC: &[&str] = &["test", "testing", "ping", "deneme", "are you there"];
const IDENTITY: &[&str] = &[
    "who are you", "what are you", "your name", "kimsin", "sen kim",
];
const TECHNICAL: &[&str] = &[
    "how do i", "how to", "code", "install", "configure", "compile", "python", "rust",
    "javascript", "api", "nasıl",
];
const HELP: &[&str] = &[
    "help", "error", "bug", "broken", "not working", "crash", "yardım", "hata",
];
const ADVERSARIAL: &[&str] = &[
    "stupid", "idiot", "dumb", "shut up", "useless", "hate you", "aptal",
];

/// Keyword category of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Greeting,
    Diagnostic,
    Identity,
    Technical,
    Help,
    Adversarial,
    Default,
}

impl Category {
    /// Classify text by the first matching category in priority order.
    pub fn classify(text: &str) -> Self {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect();

        let checks: [(Category, &[&str]); 6] = [
            (Category::Greeting, GREETING),
            (Category::Diagnostic, DIAGNOSTIC),
            (Category::Identity, IDENTITY),
            (Category::Technical, TECHNICAL),
            (Category::Help, HELP),
            (Category::Adversarial, ADVERSARIAL),
        ];

        checks
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| matches_keyword(&lowered, &words, kw)))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Default)
    }
}

/// Single words match whole words; phrases match as substrings.
fn matches_keyword(lowered: &str, words: &[&str], keyword: &str) -> bool {
    if keyword.contains(' ') {
        lowered.contains(keyword)
    } else {
        words.contains(&keyword)
    }
}

/// Offline responder for `LocalOnly` dispatch.
#[derive(Debug, Clone)]
pub struct LocalResponder {
    picker: Arc<dyn ModelPicker>,
}

impl Default for LocalResponder {
    fn default() -> Self {
        Self::new(Arc::new(RandomPicker))
    }
}

impl LocalResponder {
    /// Create a responder choosing default templates with `picker`.
    pub fn new(picker: Arc<dyn ModelPicker>) -> Self {
        Self { picker }
    }

    /// Reply to the most recent user message. Never fails.
    pub fn respond(&self, conversation: &FormattedConversation) -> String {
        match conversation.last_user_text() {
            Some(text) => self.reply_to(text).unwrap_or_else(|| FALLBACK_APOLOGY.to_string()),
            None => FALLBACK_APOLOGY.to_string(),
        }
    }

    fn reply_to(&self, text: &str) -> Option<String> {
        let category = Category::classify(text);
        debug!(?category, "Local responder classified message");

        let reply = match category {
            Category::Greeting => GREETING_REPLY.to_string(),
            Category::Diagnostic => DIAGNOSTIC_REPLY.to_string(),
            Category::Identity => IDENTITY_REPLY.to_string(),
            Category::Technical => TECHNICAL_REPLY.to_string(),
            Category::Help => HELP_REPLY.to_string(),
            Category::Adversarial => ADVERSARIAL_REPLY.to_string(),
            Category::Default => {
                let template = self.choose(DEFAULT_TEMPLATES)?;
                let closing = self.choose(CLOSING_REMARKS)?;
                format!("{} {}", template.replace("{input}", &truncate(text)), closing)
            }
        };
        Some(reply)
    }

    fn choose<'a>(&self, pool: &[&'a str]) -> Option<&'a str> {
        if pool.is_empty() {
            return None;
        }
        pool.get(self.picker.pick(pool.len())).copied()
    }
}

/// Trimmed input, cut to [`ECHO_LIMIT`] characters with an ellipsis.
pub fn truncate(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= ECHO_LIMIT {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(ECHO_LIMIT).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::{format_conversation, Message, SeededPicker};

    fn respond(text: &str) -> String {
        LocalResponder::new(Arc::new(SeededPicker::new(7)))
            .respond(&format_conversation(&[Message::user(text)]))
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(Category::classify("Merhaba!"), Category::Greeting);
        assert_eq!(Category::classify("hi, is this a test?"), Category::Greeting);
        assert_eq!(Category::classify("test"), Category::Diagnostic);
        assert_eq!(Category::classify("Who are you exactly?"), Category::Identity);
        assert_eq!(Category::classify("how to fix this error"), Category::Technical);
        assert_eq!(Category::classify("I found a bug"), Category::Help);
        assert_eq!(Category::classify("you are useless"), Category::Adversarial);
        assert_eq!(Category::classify("tell me about whales"), Category::Default);
    }

    #[test]
    fn test_whole_word_matching() {
        // "this" must not match "hi"; "attest" must not match "test".
        assert_eq!(Category::classify("this attest"), Category::Default);
    }

    #[test]
    fn test_greeting_and_diagnostic_replies() {
        assert_eq!(respond("merhaba"), GREETING_REPLY);
        assert_eq!(respond("test"), DIAGNOSTIC_REPLY);
    }

    #[test]
    fn test_default_echoes_and_closes() {
        for input in ["tell me about whales", "what do you think of jazz"] {
            let reply = respond(input);
            assert!(reply.contains(input));
            assert!(CLOSING_REMARKS.iter().any(|remark| reply.ends_with(remark)));
        }
    }

    #[test]
    fn test_default_truncates_long_input() {
        let input = "whales ".repeat(20);
        let reply = respond(&input);
        let echo = truncate(&input);
        assert!(echo.ends_with("..."));
        assert_eq!(echo.chars().count(), ECHO_LIMIT + 3);
        assert!(reply.contains(&echo));
    }

    #[test]
    fn test_truncate_counts_characters() {
        let input = "ş".repeat(60);
        assert_eq!(truncate(&input).chars().count(), ECHO_LIMIT + 3);
    }

    #[test]
    fn test_no_user_message_gets_apology() {
        let responder = LocalResponder::default();
        assert_eq!(
            responder.respond(&format_conversation(&[Message::system("only")])),
            FALLBACK_APOLOGY
        );
    }
}
