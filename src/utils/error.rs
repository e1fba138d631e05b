//! The `error` module defines custom error types used within the `topichub`
//! application.
//!
//! This module centralizes error handling, providing a consistent way to
//! represent and propagate errors throughout the system.

use thiserror::Error;

/// Errors produced by the broker and its transport connections.
///
/// Every failure is scoped to a single session or a single send attempt;
/// no variant is fatal to the broker process.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The client or topic value contained the session-id delimiter.
    ///
    /// Session ids are composed as `<client>_<topic>_<nonce>` and later
    /// decomposed by splitting on `'_'`, so neither component may contain
    /// that character. Admission fails synchronously and no state changes.
    #[error("client and topic values cannot contain '_' underscore: {0:?}")]
    InvalidArgument(String),

    /// Delivering a message to one recipient failed.
    ///
    /// Logged and skipped by the broadcaster; never propagated to other
    /// recipients or to the sending session's receive loop.
    #[error("send failed: {0}")]
    SendFailure(String),
}
