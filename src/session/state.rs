//! Session lifecycle states.
//!
//! ```text
//! Disconnected → Authenticating → HandshakeSent → Ready ⟲ run
//!                                                 Ready → Closed
//! any state, on I/O fault → Faulted
//! ```

use std::fmt;

// ============================================================================
// SessionState
// ============================================================================

/// Lifecycle state of a [`Session`](super::Session).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No transport yet.
    #[default]
    Disconnected,
    /// Dialing and authenticating the SSH connection.
    Authenticating,
    /// Client hello written, waiting for the server hello.
    HandshakeSent,
    /// Handshake complete; requests may be run.
    Ready,
    /// Close request sent and transport released.
    Closed,
    /// An I/O fault left the stream in an unknown position.
    Faulted,
}

impl SessionState {
    /// Returns `true` once no further transition is possible.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Faulted)
    }

    /// Returns `true` if requests may be run.
    #[inline]
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns the lowercase state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Authenticating => "authenticating",
            Self::HandshakeSent => "handshake-sent",
            Self::Ready => "ready",
            Self::Closed => "closed",
            Self::Faulted => "faulted",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
