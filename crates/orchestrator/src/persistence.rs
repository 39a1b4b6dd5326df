//! Best-effort transaction logging.

use database::{transaction, Database, StoredMessage, TransactionRecord};
use async_trait::async_trait;
use chat_core::Message;
use tracing::{error, info};

/// Reachability of the transaction store, as reported by health checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Connected,
    Disconnected,
    Disabled,
}

impl StoreStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreStatus::Connected => "connected",
            StoreStatus::Disconnected => "disconnected",
            StoreStatus::Disabled => "disabled",
        }
    }
}

/// Durable log of answered conversations.
///
/// `save` never fails upward: store errors are logged and reported as no id.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Record a conversation and its reply, returning the transaction id.
    async fn save(&self, messages: &[Message], reply: &str) -> Option<String>;

    /// Current store reachability.
    async fn status(&self) -> StoreStatus;
}

#[async_trait]
impl PersistenceGateway for Database {
    async fn save(&self, messages: &[Message], reply: &str) -> Option<String> {
        let stored = messages
            .iter()
            .map(|msg| StoredMessage::new(msg.role.as_str(), msg.content.clone()))
            .collect();
        let record = TransactionRecord::new(stored, reply);

        match transaction::insert_transaction(self.pool(), &record).await {
            Ok(()) => {
                info!(transaction_id = %record.id, "Chat transaction saved");
                Some(record.id)
            }
            Err(e) => {
                error!("Failed to save chat transaction: {}", e);
                None
            }
        }
    }

    async fn status(&self) -> StoreStatus {
        match self.ping().await {
            Ok(()) => StoreStatus::Connected,
            Err(_) => StoreStatus::Disconnected,
        }
    }
}

/// Store used when persistence is turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

#[async_trait]
impl PersistenceGateway for NoopStore {
    async fn save(&self, _messages: &[Message], _reply: &str) -> Option<String> {
        None
    }

    async fn status(&self) -> StoreStatus {
        StoreStatus::Disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_save_round_trip() {
        let db = test_db().await;
        let messages = vec![
            Message::system("be brief"),
            Message::user("naber? ünicode ✓"),
            Message::assistant("iyi"),
        ];

        let id = db.save(&messages, "🔥 reply").await.unwrap();
        let record = transaction::get_transaction(db.pool(), &id).await.unwrap();

        let roundtrip: Vec<Message> = record
            .messages
            .iter()
            .map(|m| match m.role.as_str() {
                "system" => Message::system(m.content.clone()),
                "assistant" => Message::assistant(m.content.clone()),
                _ => Message::user(m.content.clone()),
            })
            .collect();
        assert_eq!(roundtrip, messages);
        assert_eq!(record.response, "🔥 reply");
    }

    #[tokio::test]
    async fn test_save_failure_returns_none() {
        let db = test_db().await;
        db.close().await;

        assert_eq!(db.save(&[Message::user("hi")], "reply").await, None);
        assert_eq!(db.status().await, StoreStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_noop_store() {
        assert_eq!(NoopStore.save(&[Message::user("hi")], "x").await, None);
        assert_eq!(NoopStore.status().await, StoreStatus::Disabled);
    }
}
