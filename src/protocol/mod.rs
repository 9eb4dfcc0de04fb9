//! NETCONF 1.0 message layer.
//!
//! This module defines how messages are delimited on the wire and the fixed
//! envelopes the client sends.
//!
//! # Protocol Overview
//!
//! | Message | Direction | Purpose |
//! |---------|-----------|---------|
//! | `hello` | Local → Remote | Advertise the base capability |
//! | `hello` | Remote → Local | Server capabilities, kept verbatim |
//! | `rpc` | Local → Remote | Caller-supplied request |
//! | `rpc-reply` | Remote → Local | Reply, returned verbatim |
//! | `close-session` | Local → Remote | Best-effort goodbye on disconnect |
//!
//! Every message ends with the sentinel `]]>]]>`. There is no message-id
//! correlation: a reply belongs to the last request sent.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `framing` | Sentinel framer over a duplex stream |
//! | `message` | Hello/close envelopes and [`Capabilities`] |

// ============================================================================
// Submodules
// ============================================================================

/// Sentinel-delimited message framing.
pub mod framing;

/// Fixed envelopes and the capability record.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use framing::{Framer, SENTINEL, terminate};
pub use message::{BASE_CAPABILITY, CLOSE_SESSION, Capabilities, HELLO, NETCONF_SUBSYSTEM};
