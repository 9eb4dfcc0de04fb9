//! NETCONF client - session engine and streaming reply filter.
//!
//! This library speaks NETCONF 1.0 (end-of-message framing) over an SSH
//! `netconf` subsystem, and filters replies with a `start-with` predicate
//! that many devices do not support natively.
//!
//! # Architecture
//!
//! Components, leaves first:
//!
//! - **Transport**: authenticated SSH connection, one subsystem channel
//! - **Framer**: `]]>]]>`-delimited messages over partial reads
//! - **Session**: owns transport and channel; handshake and request execution
//! - **Filter**: single-pass streaming selection of repeated subtrees
//!
//! Key design principles:
//!
//! - One request in flight per session, enforced by `&mut self`
//! - Replies matched to requests by ordering only (no message-id)
//! - No retries anywhere; every error surfaces once, typed
//! - The filter never materializes a document tree
//!
//! # Quick Start
//!
//! ```no_run
//! use netconf_client::{Result, Session, SessionConfig, filter};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = SessionConfig::builder()
//!         .host("192.168.1.1")
//!         .username("admin")
//!         .password("secret")
//!         .build()?;
//!
//!     let mut session = Session::connect(config).await?;
//!     let reply = session
//!         .run("<rpc><get><filter type=\"subtree\"><terminal-device/></filter></get></rpc>")
//!         .await?;
//!     session.disconnect().await;
//!
//!     let channels = filter::filter_response(
//!         &reply,
//!         "/rpc-reply/data/terminal-device/logical-channels/channel[start-with(index,'10115')]",
//!     )?;
//!     println!("{channels}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`filter`] | `start-with` filter engine |
//! | [`format`] | Line cleanup for payloads and replies |
//! | [`protocol`] | Framing and fixed envelopes |
//! | [`session`] | [`Session`], [`SessionConfig`], [`SessionState`] |
//! | [`transport`] | SSH transport seam |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Streaming `start-with` filter.
pub mod filter;

/// Line-level cleanup helpers.
pub mod format;

/// NETCONF 1.0 message framing.
///
/// Sentinel framer, hello/close envelopes and the capability record.
pub mod protocol;

/// Session lifecycle and configuration.
///
/// Use [`SessionConfig::builder()`] then [`Session::connect`].
pub mod session;

/// SSH transport layer.
///
/// The [`Transport`](transport::Transport) trait plus its `russh`
/// implementation.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Filter types
pub use filter::{FilterSpec, Predicate};

// Protocol types
pub use protocol::{Capabilities, Framer, SENTINEL};

// Session types
pub use session::{Credentials, Session, SessionConfig, SessionConfigBuilder, SessionState};

// Transport types
pub use transport::{SshTransport, Transport};
