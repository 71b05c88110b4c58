//! Foundation module - Shared domain primitives.
//!
//! Contains the error vocabulary and the state machine trait used by the
//! billing domain.

mod errors;
mod state_machine;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use state_machine::StateMachine;
