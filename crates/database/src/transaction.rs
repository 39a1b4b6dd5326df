//! Chat transaction operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{TransactionRecord, TransactionRow};

/// Insert a transaction record.
pub async fn insert_transaction(pool: &SqlitePool, record: &TransactionRecord) -> Result<()> {
    let messages = serde_json::to_string(&record.messages)?;

    sqlx::query(
        r#"
        INSERT INTO chat_transactions (id, created_at, messages, response)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.created_at)
    .bind(&messages)
    .bind(&record.response)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Transaction",
                    id: record.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Get a transaction by ID.
pub async fn get_transaction(pool: &SqlitePool, id: &str) -> Result<TransactionRecord> {
    sqlx::query_as::<_, TransactionRow>(
        r#"
        SELECT id, created_at, messages, response
        FROM chat_transactions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Transaction",
        id: id.to_string(),
    })?
    .into_record()
}

/// List the most recent transactions, newest first.
pub async fn list_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<TransactionRecord>> {
    let rows = sqlx::query_as::<_, TransactionRow>(
        r#"
        SELECT id, created_at, messages, response
        FROM chat_transactions
        ORDER BY created_at DESC, rowid DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(TransactionRow::into_record).collect()
}

/// Count stored transactions.
pub async fn count_transactions(pool: &SqlitePool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_transactions")
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}
