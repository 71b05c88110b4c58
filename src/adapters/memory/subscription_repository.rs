//! In-memory SubscriptionRepository.
//!
//! Holds subscriptions in a map behind a single lock so that
//! `confirm_pending` is a true compare-and-set, matching the conditional
//! update of the PostgreSQL adapter. Used by tests and local runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::billing::{Subscription, SubscriptionStatus};
use crate::domain::foundation::{DomainError, StateMachine};
use crate::ports::{ConfirmResult, SubscriptionRepository};

/// In-memory subscription store keyed by payment reference.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: Arc<RwLock<HashMap<String, Subscription>>>,
    unavailable: Arc<AtomicBool>,
    confirm_calls: Arc<AtomicU32>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a subscription.
    pub async fn insert(&self, subscription: Subscription) {
        self.subscriptions
            .write()
            .await
            .insert(subscription.payment_reference.clone(), subscription);
    }

    /// Inserts a `pending_webhook` subscription with no stored price.
    pub async fn insert_pending(&self, id: i64, user_id: i64, payment_reference: &str) {
        self.insert(Subscription {
            id,
            user_id,
            payment_reference: payment_reference.to_string(),
            plan_type: Some("monthly".to_string()),
            status: SubscriptionStatus::PendingWebhook,
            raw_status: SubscriptionStatus::PendingWebhook.as_str().to_string(),
            amount_cents: None,
            currency: None,
            webhook_confirmed_at: None,
        })
        .await;
    }

    pub async fn get(&self, payment_reference: &str) -> Option<Subscription> {
        self.subscriptions.read().await.get(payment_reference).cloned()
    }

    /// Makes every subsequent call fail with a database error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `confirm_pending` calls that reached the store.
    pub fn confirm_calls(&self) -> u32 {
        self.confirm_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(DomainError::database("connection refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn find_by_payment_reference(
        &self,
        payment_reference: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        self.check_available()?;
        Ok(self.get(payment_reference).await)
    }

    async fn confirm_pending(
        &self,
        subscription_id: i64,
        payment_reference: &str,
    ) -> Result<ConfirmResult, DomainError> {
        self.check_available()?;
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);

        let mut subscriptions = self.subscriptions.write().await;
        match subscriptions.get_mut(payment_reference) {
            Some(sub) if sub.id == subscription_id => {
                let Ok(next) = sub.status.transition_to(SubscriptionStatus::Active) else {
                    return Ok(ConfirmResult::NotPending);
                };
                sub.status = next;
                sub.raw_status = next.as_str().to_string();
                sub.webhook_confirmed_at = Some(Utc::now());
                Ok(ConfirmResult::Confirmed)
            }
            _ => Ok(ConfirmResult::NotPending),
        }
    }

    async fn ping(&self) -> Result<(), DomainError> {
        self.check_available()
    }
}
