//! Subscription record as seen by the webhook bridge.
//!
//! The record is created and owned by the backend application. This service
//! only reads it and performs the single `pending_webhook -> active` move.

use chrono::{DateTime, Utc};

use crate::domain::foundation::StateMachine;

/// Subscription status as stored in the `subscriptions.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionStatus {
    /// Created by the backend, waiting for Stripe to confirm the payment.
    PendingWebhook,
    Active,
    Incomplete,
    Canceled,
    Expired,
    /// A status written by the backend that this service has no rules for.
    Unrecognized,
}

impl SubscriptionStatus {
    /// Parses the stored column value. Unknown values are preserved as
    /// `Unrecognized` instead of failing the lookup.
    pub fn parse(s: &str) -> Self {
        match s {
            "pending_webhook" => Self::PendingWebhook,
            "active" => Self::Active,
            "incomplete" => Self::Incomplete,
            "canceled" | "cancelled" => Self::Canceled,
            "expired" => Self::Expired,
            _ => Self::Unrecognized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingWebhook => "pending_webhook",
            Self::Active => "active",
            Self::Incomplete => "incomplete",
            Self::Canceled => "canceled",
            Self::Expired => "expired",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// True when a payment confirmation can advance this subscription.
    pub fn awaits_confirmation(&self) -> bool {
        self.can_transition_to(&Self::Active)
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!((self, target), (Self::PendingWebhook, Self::Active))
    }
}

/// Subscription row joined to inbound events by `payment_reference`.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    /// Stripe payment intent id the backend stored when creating the record.
    pub payment_reference: String,
    pub plan_type: Option<String>,
    pub status: SubscriptionStatus,
    /// Raw column value, kept for logging when `status` is `Unrecognized`.
    pub raw_status: String,
    /// Price in the currency's minor unit, when the backend recorded one.
    pub amount_cents: Option<i64>,
    pub currency: Option<String>,
    pub webhook_confirmed_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Compares the stored price with what Stripe charged.
    ///
    /// Returns `None` when the record has no price to compare against.
    pub fn amount_matches(&self, amount: i64, currency: &str) -> Option<bool> {
        let stored_amount = self.amount_cents?;
        let stored_currency = self.currency.as_deref()?;
        Some(stored_amount == amount && stored_currency.eq_ignore_ascii_case(currency))
    }
}
