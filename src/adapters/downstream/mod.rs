//! Downstream application adapters.

mod http_notifier;

pub use http_notifier::{
    HttpConfirmationNotifier, NotifierSettings, DEFAULT_NOTIFIER_TIMEOUT, DEFAULT_USER_AGENT,
};
