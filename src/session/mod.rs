//! NETCONF session module.
//!
//! This module provides the main entry point for talking to a device.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Session`] | Owned connection, handshake, request execution |
//! | [`SessionConfig`] | Validated connection settings |
//! | [`SessionConfigBuilder`] | Fluent configuration builder |
//! | [`SessionState`] | Lifecycle state machine |
//!
//! # Example
//!
//! ```no_run
//! use netconf_client::{Session, SessionConfig};
//!
//! # async fn example() -> netconf_client::Result<()> {
//! let config = SessionConfig::builder()
//!     .host("10.10.10.10")
//!     .username("admin")
//!     .password("secret")
//!     .build()?;
//!
//! let mut session = Session::connect(config).await?;
//! let reply = session.run("<rpc><get/></rpc>").await?;
//! session.disconnect().await;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Connection settings, builder and validation.
pub mod config;

/// Session implementation.
pub mod core;

/// Lifecycle states.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{Credentials, SessionConfig, SessionConfigBuilder};
pub use core::Session;
pub use state::SessionState;
