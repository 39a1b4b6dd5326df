//! Database models.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::Result;

/// One message of a stored conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// "system", "user", or "assistant"
    pub role: String,
    /// Message content
    pub content: String,
}

impl StoredMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// An answered chat request: the conversation as received and the reply sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// UUID v4
    pub id: String,
    /// RFC 3339 UTC timestamp
    pub created_at: String,
    /// Conversation exactly as received
    pub messages: Vec<StoredMessage>,
    /// Reply returned to the caller
    pub response: String,
}

impl TransactionRecord {
    /// Create a record with a fresh id and the current time.
    pub fn new(messages: Vec<StoredMessage>, response: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            messages,
            response: response.into(),
        }
    }
}

/// Row shape of `chat_transactions`; messages are stored as JSON text.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct TransactionRow {
    pub id: String,
    pub created_at: String,
    pub messages: String,
    pub response: String,
}

impl TransactionRow {
    pub(crate) fn into_record(self) -> Result<TransactionRecord> {
        Ok(TransactionRecord {
            id: self.id,
            created_at: self.created_at,
            messages: serde_json::from_str(&self.messages)?,
            response: self.response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_uuid_and_timestamp() {
        let record = TransactionRecord::new(vec![StoredMessage::new("user", "hi")], "hello");
        assert!(Uuid::parse_str(&record.id).is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(&record.created_at).is_ok());
        assert_ne!(record.id, TransactionRecord::new(Vec::new(), "").id);
    }
}
