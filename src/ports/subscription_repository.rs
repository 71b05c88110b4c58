//! SubscriptionRepository port - Lookup and confirmation of pending subscriptions.
//!
//! Subscriptions are created and owned by the downstream application. This
//! service only reads them and performs one transition:
//! `pending_webhook → active`.
//!
//! ## Concurrency
//!
//! `confirm_pending` MUST be a single conditional write
//! (`... WHERE status = 'pending_webhook'`). It is the only concurrency
//! control between simultaneous deliveries of the same event.

use async_trait::async_trait;

use crate::domain::billing::Subscription;
use crate::domain::foundation::DomainError;

/// Result of the conditional `pending_webhook → active` write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmResult {
    /// Exactly one row moved to `active`.
    Confirmed,
    /// No row matched; it was not (or no longer) pending.
    NotPending,
}

/// Port for reading and confirming subscriptions.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find a subscription by its external payment reference
    /// (the Stripe payment intent id).
    ///
    /// Returns `None` if no subscription carries this reference.
    async fn find_by_payment_reference(
        &self,
        payment_reference: &str,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Atomically set `status = active` and `webhook_confirmed_at = now`
    /// on the row `subscription_id` returned by the lookup, only if it still
    /// carries `payment_reference` and is still `pending_webhook`. Other rows
    /// sharing the reference are never touched.
    async fn confirm_pending(
        &self,
        subscription_id: i64,
        payment_reference: &str,
    ) -> Result<ConfirmResult, DomainError>;

    /// Checks that the backing store answers.
    async fn ping(&self) -> Result<(), DomainError>;
}
