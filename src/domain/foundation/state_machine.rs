//! State machine trait for status enums.
//!
//! Provides a consistent interface for validating state transitions of
//! persisted records whose status this service is allowed to advance.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors define valid state transitions and get a validated
/// `transition_to` for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for SubscriptionStatus {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (PendingWebhook, Active))
///     }
/// }
///
/// let next = current.transition_to(SubscriptionStatus::Active)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestStatus {
        Pending,
        Confirmed,
        Voided,
    }

    impl StateMachine for TestStatus {
        fn can_transition_to(&self, target: &Self) -> bool {
            use TestStatus::*;
            matches!((self, target), (Pending, Confirmed) | (Pending, Voided))
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        let result = TestStatus::Pending.transition_to(TestStatus::Confirmed);
        assert_eq!(result, Ok(TestStatus::Confirmed));
    }

    #[test]
    fn transition_to_fails_for_invalid_transition() {
        let result = TestStatus::Confirmed.transition_to(TestStatus::Pending);
        assert!(matches!(result, Err(ValidationError::InvalidFormat { .. })));
    }
}
