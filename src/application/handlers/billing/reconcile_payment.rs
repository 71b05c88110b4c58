//! ReconcilePaymentHandler - Confirms pending subscriptions on
//! `payment_intent.succeeded`.
//!
//! ## Flow
//!
//! 1. Read the payment intent from the event (`MalformedPayload` on failure)
//! 2. Find the subscription whose payment reference is the intent id
//! 3. Skip if it is no longer `pending_webhook`
//! 4. Conditionally move it to `active`; zero rows means a concurrent
//!    delivery already did
//! 5. Notify the downstream application (best effort)
//!
//! Every path that reaches this handler writes one audit row before
//! returning. Audit and notification failures surface as warnings.

use std::sync::Arc;

use async_trait::async_trait;

use super::audit_trail::AuditTrail;
use crate::domain::billing::{
    PaymentIntent, ProcessingReport, SkipReason, StripeEvent, StripeEventType, Subscription,
    Warning, WebhookError, WebhookEventHandler, WebhookOutcome,
};
use crate::ports::{AuditOutcome, ConfirmResult, ConfirmationNotifier, SubscriptionRepository};

/// Audit message for deliveries whose subscription is not found yet.
pub const NOT_FOUND_MESSAGE: &str = "Subscription not found, triggering retry";

/// Audit message for deliveries whose subscription is already past pending.
pub const NOT_PENDING_MESSAGE: &str = "Subscription not in pending_webhook status";

/// Reconciliation engine for successful payment intents.
pub struct ReconcilePaymentHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    notifier: Arc<dyn ConfirmationNotifier>,
    audit: AuditTrail,
}

impl ReconcilePaymentHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        notifier: Arc<dyn ConfirmationNotifier>,
        audit: AuditTrail,
    ) -> Self {
        Self {
            subscriptions,
            notifier,
            audit,
        }
    }

    /// Writes the audit row for a failure and hands the error back.
    async fn fail(
        &self,
        event: &StripeEvent,
        payment_intent_id: Option<&str>,
        outcome: AuditOutcome,
        message: String,
        error: WebhookError,
    ) -> WebhookError {
        // The response is already decided; a failed audit write is only logged.
        let _ = self
            .audit
            .record(event, payment_intent_id, outcome, Some(message))
            .await;
        error
    }

    fn check_amount(intent: &PaymentIntent, subscription: &Subscription) -> Option<Warning> {
        if subscription.amount_matches(intent.amount, &intent.currency) != Some(false) {
            return None;
        }

        tracing::warn!(
            payment_intent_id = %intent.id,
            subscription_id = subscription.id,
            expected_cents = ?subscription.amount_cents,
            expected_currency = ?subscription.currency,
            actual_cents = intent.amount,
            actual_currency = %intent.currency,
            "Charged amount differs from subscription price"
        );
        Some(Warning::AmountMismatch {
            expected_cents: subscription.amount_cents.unwrap_or_default(),
            expected_currency: subscription.currency.clone().unwrap_or_default(),
            actual_cents: intent.amount,
            actual_currency: intent.currency.clone(),
        })
    }

    async fn skip(
        &self,
        event: &StripeEvent,
        intent: &PaymentIntent,
        reason: SkipReason,
        mut warnings: Vec<Warning>,
    ) -> ProcessingReport {
        let message = match reason {
            SkipReason::NotPending { .. } => NOT_PENDING_MESSAGE.to_string(),
            SkipReason::ConcurrentlyConfirmed => reason.to_string(),
        };
        warnings.extend(
            self.audit
                .record(event, Some(&intent.id), AuditOutcome::Skipped, Some(message))
                .await,
        );

        ProcessingReport::new(WebhookOutcome::Skipped {
            payment_intent_id: intent.id.clone(),
            reason,
        })
        .with_warnings(warnings)
    }
}

#[async_trait]
impl WebhookEventHandler for ReconcilePaymentHandler {
    fn handles(&self) -> Vec<StripeEventType> {
        vec![StripeEventType::PaymentIntentSucceeded]
    }

    async fn handle(&self, event: &StripeEvent) -> Result<ProcessingReport, WebhookError> {
        // 1. Read the payment intent
        let intent = match PaymentIntent::from_event(event) {
            Ok(intent) => intent,
            Err(err) => {
                tracing::error!(event_id = %event.id, error = %err, "Malformed payment intent");
                let message = err.to_string();
                return Err(self
                    .fail(event, event.object_id(), AuditOutcome::Error, message, err)
                    .await);
            }
        };

        tracing::info!(
            event_id = %event.id,
            payment_intent_id = %intent.id,
            amount = intent.amount,
            currency = %intent.currency,
            "Processing payment_intent.succeeded"
        );

        // 2. Find the subscription
        let subscription = match self.subscriptions.find_by_payment_reference(&intent.id).await {
            Ok(Some(subscription)) => subscription,
            Ok(None) => {
                tracing::warn!(
                    event_id = %event.id,
                    payment_intent_id = %intent.id,
                    "Subscription not found, requesting redelivery"
                );
                let err = WebhookError::SubscriptionNotFound(intent.id.clone());
                return Err(self
                    .fail(
                        event,
                        Some(&intent.id),
                        AuditOutcome::Retry,
                        NOT_FOUND_MESSAGE.to_string(),
                        err,
                    )
                    .await);
            }
            Err(e) => {
                tracing::error!(
                    event_id = %event.id,
                    payment_intent_id = %intent.id,
                    error = %e,
                    "Subscription lookup failed"
                );
                let message = e.to_string();
                return Err(self
                    .fail(event, Some(&intent.id), AuditOutcome::Error, message, e.into())
                    .await);
            }
        };

        let mut warnings: Vec<Warning> = Self::check_amount(&intent, &subscription)
            .into_iter()
            .collect();

        // 3. Only pending subscriptions move
        if !subscription.status.awaits_confirmation() {
            tracing::info!(
                event_id = %event.id,
                payment_intent_id = %intent.id,
                subscription_id = subscription.id,
                status = %subscription.raw_status,
                "Subscription not in pending_webhook status, skipping"
            );
            let reason = SkipReason::NotPending {
                status: subscription.status,
            };
            return Ok(self.skip(event, &intent, reason, warnings).await);
        }

        // 4. Conditional update
        match self
            .subscriptions
            .confirm_pending(subscription.id, &intent.id)
            .await
        {
            Ok(ConfirmResult::Confirmed) => {}
            Ok(ConfirmResult::NotPending) => {
                tracing::info!(
                    event_id = %event.id,
                    payment_intent_id = %intent.id,
                    subscription_id = subscription.id,
                    "Subscription confirmed by a concurrent delivery, skipping"
                );
                return Ok(self
                    .skip(event, &intent, SkipReason::ConcurrentlyConfirmed, warnings)
                    .await);
            }
            Err(e) => {
                tracing::error!(
                    event_id = %event.id,
                    payment_intent_id = %intent.id,
                    subscription_id = subscription.id,
                    error = %e,
                    "Failed to update subscription status"
                );
                let message = e.to_string();
                return Err(self
                    .fail(event, Some(&intent.id), AuditOutcome::Error, message, e.into())
                    .await);
            }
        }

        tracing::info!(
            event_id = %event.id,
            payment_intent_id = %intent.id,
            subscription_id = subscription.id,
            user_id = subscription.user_id,
            "Subscription activated"
        );

        // 5. Notify downstream
        if let Err(e) = self
            .notifier
            .notify_confirmed(subscription.user_id, subscription.id, &intent.id)
            .await
        {
            tracing::warn!(
                event_id = %event.id,
                payment_intent_id = %intent.id,
                subscription_id = subscription.id,
                user_id = subscription.user_id,
                error = %e,
                "Failed to notify downstream of confirmation"
            );
            warnings.push(Warning::Notification(e.to_string()));
        }

        warnings.extend(
            self.audit
                .record(event, Some(&intent.id), AuditOutcome::Success, None)
                .await,
        );

        Ok(ProcessingReport::new(WebhookOutcome::Confirmed {
            subscription_id: subscription.id,
            user_id: subscription.user_id,
            payment_intent_id: intent.id,
        })
        .with_warnings(warnings))
    }
}
