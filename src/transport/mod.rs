//! Secure-shell transport layer.
//!
//! This module is the seam between the session engine and the SSH
//! provider. The session only needs a duplex byte stream bound to the
//! `netconf` subsystem, plus a way to release the connection.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Session (Rust) │                              │  Device         │
//! │                 │            SSH               │                 │
//! │  Framer         │◄────────────────────────────►│  netconf        │
//! │  → Transport    │        host:830              │  subsystem      │
//! │                 │                              │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `SshTransport::dial` - TCP connect, key exchange, authentication
//! 2. `Transport::open_channel` - session channel + subsystem request
//! 3. Session framing runs over the returned stream
//! 4. `Transport::close` - disconnect the SSH connection
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `ssh` | `russh` implementation of [`Transport`] |

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::Result;

// ============================================================================
// Submodules
// ============================================================================

/// `russh`-backed transport.
pub mod ssh;

// ============================================================================
// Re-exports
// ============================================================================

pub use ssh::SshTransport;

// ============================================================================
// Transport
// ============================================================================

/// An authenticated connection that can open one command channel.
///
/// Implementations own the connection exclusively; nothing is shared
/// between sessions.
#[async_trait]
pub trait Transport: Send {
    /// Duplex byte stream of an open channel.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Opens a channel and requests `subsystem` on it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`](crate::Error::Protocol) if the channel
    /// cannot be opened or the subsystem is refused.
    async fn open_channel(&mut self, subsystem: &str) -> Result<Self::Stream>;

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`](crate::Error::Connection) if the
    /// disconnect could not be sent.
    async fn close(&mut self) -> Result<()>;
}
