//! Webhook routing - dispatches verified events to type-specific handlers.
//!
//! ## Design
//!
//! 1. A verified `StripeEvent` is looked up by type in the dispatcher
//! 2. The matching handler performs the domain work and returns a report
//! 3. Event types without a handler are acknowledged as `Ignored`
//!
//! Handlers return a `ProcessingReport` on success. Side effects that are
//! allowed to fail without affecting the response (downstream notification,
//! audit writes) are carried as `Warning`s on the report instead of errors.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::stripe_event::{StripeEvent, StripeEventType};
use super::subscription::SubscriptionStatus;
use super::webhook_errors::WebhookError;

/// Why a reconciliation left the subscription untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The subscription was already past `pending_webhook` when read.
    NotPending { status: SubscriptionStatus },
    /// The conditional update matched no row: a concurrent delivery won.
    ConcurrentlyConfirmed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotPending { status } => write!(
                f,
                "Subscription not in pending_webhook status (current: {})",
                status.as_str()
            ),
            SkipReason::ConcurrentlyConfirmed => {
                write!(f, "Subscription already confirmed by a concurrent delivery")
            }
        }
    }
}

/// Final result of a successfully handled event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// This delivery moved the subscription from `pending_webhook` to `active`.
    Confirmed {
        subscription_id: i64,
        user_id: i64,
        payment_intent_id: String,
    },
    /// The event was valid but there was nothing to do.
    Skipped {
        payment_intent_id: String,
        reason: SkipReason,
    },
    /// No handler is registered for the event type.
    Ignored { event_type: String },
}

/// A side effect that failed without changing the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The downstream confirmation call failed or timed out.
    Notification(String),
    /// The audit row could not be written.
    Audit(String),
    /// Stripe charged a different amount than the subscription records.
    AmountMismatch {
        expected_cents: i64,
        expected_currency: String,
        actual_cents: i64,
        actual_currency: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Notification(msg) => write!(f, "notification failed: {}", msg),
            Warning::Audit(msg) => write!(f, "audit write failed: {}", msg),
            Warning::AmountMismatch {
                expected_cents,
                expected_currency,
                actual_cents,
                actual_currency,
            } => write!(
                f,
                "amount mismatch: expected {} {}, charged {} {}",
                expected_cents, expected_currency, actual_cents, actual_currency
            ),
        }
    }
}

/// Outcome plus any non-fatal warnings collected while producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingReport {
    pub outcome: WebhookOutcome,
    pub warnings: Vec<Warning>,
}

impl ProcessingReport {
    pub fn new(outcome: WebhookOutcome) -> Self {
        Self {
            outcome,
            warnings: Vec::new(),
        }
    }

    pub fn ignored(event_type: impl Into<String>) -> Self {
        Self::new(WebhookOutcome::Ignored {
            event_type: event_type.into(),
        })
    }

    pub fn with_warnings(mut self, warnings: Vec<Warning>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self.outcome, WebhookOutcome::Confirmed { .. })
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self.outcome, WebhookOutcome::Ignored { .. })
    }
}

/// Handler for a specific type of Stripe webhook event.
///
/// Implementations should be stateless and focus on a single event type.
#[async_trait]
pub trait WebhookEventHandler: Send + Sync {
    /// Returns the event type(s) this handler processes.
    fn handles(&self) -> Vec<StripeEventType>;

    /// Handles the webhook event.
    ///
    /// Returns `Err` only for failures that must reach Stripe as a non-2xx
    /// response.
    async fn handle(&self, event: &StripeEvent) -> Result<ProcessingReport, WebhookError>;
}

/// Dispatches webhook events to the appropriate handler.
#[async_trait]
pub trait WebhookDispatcher: Send + Sync {
    /// Find a handler for the given event type.
    ///
    /// Returns `None` if no handler is registered for this event type.
    fn get_handler(&self, event_type: &StripeEventType) -> Option<&dyn WebhookEventHandler>;

    /// Dispatch an event to its handler.
    ///
    /// Events without a handler are acknowledged, never treated as errors.
    async fn dispatch(&self, event: &StripeEvent) -> Result<ProcessingReport, WebhookError> {
        let event_type = event.parsed_type();
        match self.get_handler(&event_type) {
            Some(handler) => handler.handle(event).await,
            None => {
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    "Unhandled event type"
                );
                Ok(ProcessingReport::ignored(event.event_type.clone()))
            }
        }
    }
}

/// Dispatcher backed by a list of registered handlers.
#[derive(Default, Clone)]
pub struct EventRouter {
    handlers: Vec<Arc<dyn WebhookEventHandler>>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler. The first registered handler for a type wins.
    pub fn register(mut self, handler: Arc<dyn WebhookEventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }
}

impl WebhookDispatcher for EventRouter {
    fn get_handler(&self, event_type: &StripeEventType) -> Option<&dyn WebhookEventHandler> {
        if *event_type == StripeEventType::Unknown {
            return None;
        }
        self.handlers
            .iter()
            .find(|h| h.handles().contains(event_type))
            .map(|h| h.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::StripeEventBuilder;
    use std::sync::atomic::{AtomicU32, Ordering};

    // ══════════════════════════════════════════════════════════════
    // Test Infrastructure
    // ══════════════════════════════════════════════════════════════

    /// Mock handler that tracks invocations.
    struct MockHandler {
        handles_types: Vec<StripeEventType>,
        call_count: AtomicU32,
        should_fail: bool,
    }

    impl MockHandler {
        fn new(handles: Vec<StripeEventType>) -> Self {
            Self {
                handles_types: handles,
                call_count: AtomicU32::new(0),
                should_fail: false,
            }
        }

        fn failing(handles: Vec<StripeEventType>) -> Self {
            Self {
                should_fail: true,
                ..Self::new(handles)
            }
        }

        fn call_count(&self) -> u32 {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WebhookEventHandler for MockHandler {
        fn handles(&self) -> Vec<StripeEventType> {
            self.handles_types.clone()
        }

        async fn handle(&self, event: &StripeEvent) -> Result<ProcessingReport, WebhookError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if self.should_fail {
                Err(WebhookError::Persistence("Simulated failure".to_string()))
            } else {
                Ok(ProcessingReport::new(WebhookOutcome::Confirmed {
                    subscription_id: 1,
                    user_id: 2,
                    payment_intent_id: event.object_id().unwrap_or_default().to_string(),
                }))
            }
        }
    }

    fn router_with(handler: Arc<MockHandler>) -> EventRouter {
        EventRouter::new().register(handler)
    }

    // ══════════════════════════════════════════════════════════════
    // EventRouter Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn router_finds_handler_for_registered_type() {
        let handler = Arc::new(MockHandler::new(vec![StripeEventType::PaymentIntentSucceeded]));
        let router = router_with(handler);

        assert!(router
            .get_handler(&StripeEventType::PaymentIntentSucceeded)
            .is_some());
    }

    #[test]
    fn router_returns_none_for_unregistered_type() {
        let handler = Arc::new(MockHandler::new(vec![StripeEventType::PaymentIntentSucceeded]));
        let router = router_with(handler);

        assert!(router
            .get_handler(&StripeEventType::PaymentIntentCanceled)
            .is_none());
    }

    #[test]
    fn router_never_routes_unknown_types() {
        let handler = Arc::new(MockHandler::new(vec![StripeEventType::Unknown]));
        let router = router_with(handler);

        assert!(router.get_handler(&StripeEventType::Unknown).is_none());
    }

    #[tokio::test]
    async fn dispatch_invokes_matching_handler_once() {
        let handler = Arc::new(MockHandler::new(vec![StripeEventType::PaymentIntentSucceeded]));
        let router = router_with(handler.clone());
        let event = StripeEventBuilder::new()
            .payment_intent("pi_1", 100, "usd")
            .build();

        let report = router.dispatch(&event).await.unwrap();

        assert!(report.is_confirmed());
        assert_eq!(handler.call_count(), 1);
    }

    #[tokio::test]
    async fn dispatch_acknowledges_unknown_event_types() {
        let handler = Arc::new(MockHandler::new(vec![StripeEventType::PaymentIntentSucceeded]));
        let router = router_with(handler.clone());
        let event = StripeEventBuilder::new()
            .event_type("customer.created")
            .build();

        let report = router.dispatch(&event).await.unwrap();

        assert_eq!(
            report.outcome,
            WebhookOutcome::Ignored {
                event_type: "customer.created".to_string()
            }
        );
        assert_eq!(handler.call_count(), 0);
    }

    #[tokio::test]
    async fn dispatch_acknowledges_known_but_unhandled_types() {
        let handler = Arc::new(MockHandler::new(vec![StripeEventType::PaymentIntentSucceeded]));
        let router = router_with(handler.clone());
        let event = StripeEventBuilder::new()
            .event_type("payment_intent.payment_failed")
            .build();

        let report = router.dispatch(&event).await.unwrap();

        assert!(report.is_ignored());
        assert_eq!(handler.call_count(), 0);
    }

    #[tokio::test]
    async fn dispatch_propagates_handler_errors() {
        let handler = Arc::new(MockHandler::failing(vec![
            StripeEventType::PaymentIntentSucceeded,
        ]));
        let router = router_with(handler);
        let event = StripeEventBuilder::new().build();

        let result = router.dispatch(&event).await;

        assert!(matches!(result, Err(WebhookError::Persistence(_))));
    }

    #[tokio::test]
    async fn empty_router_ignores_everything() {
        let router = EventRouter::new();
        let event = StripeEventBuilder::new().build();

        let report = router.dispatch(&event).await.unwrap();

        assert!(report.is_ignored());
    }

    // ══════════════════════════════════════════════════════════════
    // ProcessingReport Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn report_accumulates_warnings() {
        let report = ProcessingReport::ignored("x")
            .with_warnings(vec![Warning::Audit("db down".to_string())])
            .with_warnings(vec![Warning::Notification("timeout".to_string())]);

        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn skip_reason_displays_current_status() {
        let reason = SkipReason::NotPending {
            status: SubscriptionStatus::Active,
        };
        assert_eq!(
            reason.to_string(),
            "Subscription not in pending_webhook status (current: active)"
        );
    }
}
