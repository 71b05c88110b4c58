//! PostgreSQL implementation of SubscriptionRepository.
//!
//! Reads the `subscriptions` table owned by the backend application and
//! performs the conditional `pending_webhook → active` update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::billing::{Subscription, SubscriptionStatus};
use crate::domain::foundation::DomainError;
use crate::ports::{ConfirmResult, SubscriptionRepository};

/// PostgreSQL implementation of the SubscriptionRepository port.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    /// Creates a new PostgresSubscriptionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: i64,
    user_id: i64,
    stripe_subscription_id: String,
    plan_type: Option<String>,
    status: String,
    amount_cents: Option<i64>,
    currency: Option<String>,
    webhook_confirmed_at: Option<DateTime<Utc>>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Subscription {
            id: row.id,
            user_id: row.user_id,
            payment_reference: row.stripe_subscription_id,
            plan_type: row.plan_type,
            status: SubscriptionStatus::parse(&row.status),
            raw_status: row.status,
            amount_cents: row.amount_cents,
            currency: row.currency,
            webhook_confirmed_at: row.webhook_confirmed_at,
        }
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn find_by_payment_reference(
        &self,
        payment_reference: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, stripe_subscription_id, plan_type, status,
                   amount_cents, currency, webhook_confirmed_at
            FROM subscriptions
            WHERE stripe_subscription_id = $1
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(payment_reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find subscription: {}", e)))?;

        Ok(row.map(Subscription::from))
    }

    async fn confirm_pending(
        &self,
        subscription_id: i64,
        payment_reference: &str,
    ) -> Result<ConfirmResult, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'active', webhook_confirmed_at = NOW(), updated_at = NOW()
            WHERE id = $1
              AND stripe_subscription_id = $2
              AND status = 'pending_webhook'
            "#,
        )
        .bind(subscription_id)
        .bind(payment_reference)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::database(format!("Failed to update subscription status: {}", e))
                .with_detail("subscription_id", subscription_id.to_string())
                .with_detail("payment_intent_id", payment_reference)
        })?;

        if result.rows_affected() == 0 {
            Ok(ConfirmResult::NotPending)
        } else {
            Ok(ConfirmResult::Confirmed)
        }
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Database ping failed: {}", e)))?;
        Ok(())
    }
}
