//! Error types for the NETCONF client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use netconf_client::{Result, Session, SessionConfig};
//!
//! async fn example(config: SessionConfig) -> Result<()> {
//!     let mut session = Session::connect(config).await?;
//!     let reply = session.run("<rpc><get/></rpc>").await?;
//!     session.disconnect().await;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Validation`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`] |
//! | Protocol | [`Error::Protocol`], [`Error::Framing`], [`Error::Timeout`], [`Error::InvalidState`] |
//! | Filter | [`Error::Parse`], [`Error::UnsupportedPredicate`] |
//! | External | [`Error::Io`] |
//!
//! Nothing in this crate retries. Every error is surfaced to the caller once,
//! and the caller decides whether to abort the run or only the current step.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

use crate::session::SessionState;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Session configuration is invalid.
    ///
    /// Returned when the host address is malformed or missing.
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// SSH dial or authentication failed.
    ///
    /// The message always starts with `host:port`.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Dial and authentication did not finish in time.
    #[error("Connection to {address} timed out after {timeout_ms}ms")]
    ConnectionTimeout {
        /// `host:port` that was being dialed.
        address: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Subsystem negotiation was refused or the channel could not be opened.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// Non-clean I/O failure while writing or reading a framed message.
    ///
    /// End-of-stream is not a framing fault; the partial text is returned.
    #[error("Framing fault: {message}")]
    Framing {
        /// Description of the I/O failure.
        message: String,
    },

    /// Request exceeded its per-call deadline.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Operation is not allowed in the session's current state.
    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        /// The attempted operation.
        operation: &'static str,
        /// State the session was in.
        state: SessionState,
    },

    // ========================================================================
    // Filter Errors
    // ========================================================================
    /// Filter expression is malformed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parse failure.
        message: String,
    },

    /// Filter predicate parsed but has no evaluation rule.
    ///
    /// Only `start-with(field,'literal')` can be evaluated.
    #[error("Unsupported predicate: {predicate}")]
    UnsupportedPredicate {
        /// The predicate text as written.
        predicate: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a validation error.
    #[inline]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(address: impl Into<String>, timeout_ms: u64) -> Self {
        Self::ConnectionTimeout {
            address: address.into(),
            timeout_ms,
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a framing fault.
    #[inline]
    pub fn framing(message: impl Into<String>) -> Self {
        Self::Framing {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Creates an invalid state error.
    #[inline]
    pub fn invalid_state(operation: &'static str, state: SessionState) -> Self {
        Self::InvalidState { operation, state }
    }

    /// Creates a filter parse error.
    #[inline]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Creates an unsupported predicate error.
    #[inline]
    pub fn unsupported_predicate(predicate: impl Into<String>) -> Self {
        Self::UnsupportedPredicate {
            predicate: predicate.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectionTimeout { .. } | Self::Timeout { .. })
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionTimeout { .. }
        )
    }

    /// Returns `true` if this is a filter error.
    ///
    /// Filter errors abort only the filtering step; the reply stays valid.
    #[inline]
    #[must_use]
    pub fn is_filter_error(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::UnsupportedPredicate { .. }
        )
    }

    /// Returns `true` if the error leaves the session stream in an unknown
    /// position, so no further request can be framed on it.
    #[inline]
    #[must_use]
    pub fn faults_session(&self) -> bool {
        matches!(
            self,
            Self::Framing { .. } | Self::Timeout { .. } | Self::Io(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
