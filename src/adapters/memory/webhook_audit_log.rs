//! In-memory WebhookAuditLog with upsert semantics.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::{WebhookAuditLog, WebhookAuditRecord};

/// In-memory audit log keyed by Stripe event id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWebhookAuditLog {
    records: Arc<RwLock<HashMap<String, WebhookAuditRecord>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryWebhookAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with a database error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl WebhookAuditLog for InMemoryWebhookAuditLog {
    async fn upsert(&self, record: WebhookAuditRecord) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::database("connection refused"));
        }
        let mut records = self.records.write().await;
        let payment_intent_id = record.payment_intent_id.clone().or_else(|| {
            records
                .get(&record.event_id)
                .and_then(|existing| existing.payment_intent_id.clone())
        });
        records.insert(
            record.event_id.clone(),
            WebhookAuditRecord {
                payment_intent_id,
                ..record
            },
        );
        Ok(())
    }

    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookAuditRecord>, DomainError> {
        Ok(self.records.read().await.get(event_id).cloned())
    }

    async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut records = self.records.write().await;
        let before_count = records.len();
        records.retain(|_, r| r.processed_at >= timestamp);
        Ok((before_count - records.len()) as u64)
    }
}
