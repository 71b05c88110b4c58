//! PostgreSQL implementation of WebhookAuditLog.
//!
//! Rows live in `webhook_logs`, unique on `stripe_event_id`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::DomainError;
use crate::ports::{AuditOutcome, WebhookAuditLog, WebhookAuditRecord};

/// PostgreSQL implementation of the WebhookAuditLog port.
pub struct PostgresWebhookAuditLog {
    pool: PgPool,
}

impl PostgresWebhookAuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WebhookLogRow {
    stripe_event_id: String,
    event_type: String,
    payment_intent_id: Option<String>,
    status: String,
    error_message: Option<String>,
    processed_at: DateTime<Utc>,
}

impl TryFrom<WebhookLogRow> for WebhookAuditRecord {
    type Error = DomainError;

    fn try_from(row: WebhookLogRow) -> Result<Self, Self::Error> {
        let outcome = AuditOutcome::parse(&row.status).ok_or_else(|| {
            DomainError::database(format!("Invalid webhook log status: {}", row.status))
        })?;

        Ok(WebhookAuditRecord {
            event_id: row.stripe_event_id,
            event_type: row.event_type,
            payment_intent_id: row.payment_intent_id,
            outcome,
            error_message: row.error_message,
            processed_at: row.processed_at,
        })
    }
}

#[async_trait]
impl WebhookAuditLog for PostgresWebhookAuditLog {
    async fn upsert(&self, record: WebhookAuditRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO webhook_logs (
                stripe_event_id, event_type, payment_intent_id, status,
                error_message, processed_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            ON CONFLICT (stripe_event_id) DO UPDATE SET
                event_type = EXCLUDED.event_type,
                payment_intent_id = COALESCE(EXCLUDED.payment_intent_id, webhook_logs.payment_intent_id),
                status = EXCLUDED.status,
                error_message = EXCLUDED.error_message,
                processed_at = EXCLUDED.processed_at,
                updated_at = NOW()
            "#,
        )
        .bind(&record.event_id)
        .bind(&record.event_type)
        .bind(&record.payment_intent_id)
        .bind(record.outcome.as_str())
        .bind(&record.error_message)
        .bind(record.processed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::database(format!("Failed to log webhook event: {}", e))
                .with_detail("event_id", record.event_id.clone())
        })?;

        Ok(())
    }

    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookAuditRecord>, DomainError> {
        let row: Option<WebhookLogRow> = sqlx::query_as(
            r#"
            SELECT stripe_event_id, event_type, payment_intent_id, status,
                   error_message, processed_at
            FROM webhook_logs
            WHERE stripe_event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find webhook log: {}", e)))?;

        row.map(WebhookAuditRecord::try_from).transpose()
    }

    async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM webhook_logs WHERE processed_at < $1")
            .bind(timestamp)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::database(format!("Failed to delete webhook logs: {}", e))
            })?;

        Ok(result.rows_affected())
    }
}
