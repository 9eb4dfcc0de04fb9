//! Streaming `start-with` filter for NETCONF replies.
//!
//! Emulates one XPath predicate shape that devices commonly lack:
//!
//! ```text
//! /a/b/<target>[start-with(<field>,'<literal>')]
//! ```
//!
//! Every `<target>` subtree is kept in full if the text of a `<field>`
//! element inside it begins with `<literal>`, and dropped otherwise. All
//! other markup passes through unchanged.
//!
//! # Example
//!
//! ```
//! use netconf_client::filter;
//!
//! # fn example() -> netconf_client::Result<()> {
//! let reply = "<data><if><name>eth0</name></if><if><name>lo</name></if></data>";
//! let out = filter::filter_response(reply, "/data/if[start-with(name,'eth')]")?;
//!
//! assert!(out.contains("eth0"));
//! assert!(!out.contains("<name>lo</name>"));
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `expression` | [`FilterSpec`] and [`Predicate`] parsing |
//! | `engine` | Single-pass streaming transform |

// ============================================================================
// Submodules
// ============================================================================

/// Streaming transform.
pub mod engine;

/// Filter expression parsing.
pub mod expression;

// ============================================================================
// Re-exports
// ============================================================================

pub use engine::{apply, filter_response};
pub use expression::{FilterSpec, Predicate};
