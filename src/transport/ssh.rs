//! `russh` implementation of [`Transport`].
//!
//! # Authentication
//!
//! The password is always tried first. If the server rejects it and a
//! private key file is configured, the key is tried next. A key file that
//! cannot be read or parsed is skipped with a warning.
//!
//! Host keys are accepted without verification.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::Path;
use std::result::Result as StdResult;
use std::sync::Arc;

use async_trait::async_trait;
use russh::client::{self, Handle, Msg};
use russh::{ChannelMsg, ChannelStream, Disconnect};
use russh_keys::key::{KeyPair, PublicKey};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::session::SessionConfig;
use crate::session::config::existing_key;

use super::Transport;

// ============================================================================
// Host Key Handler
// ============================================================================

/// Client handler that trusts every server host key.
struct AcceptAnyHostKey;

#[async_trait]
impl client::Handler for AcceptAnyHostKey {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> StdResult<bool, Self::Error> {
        Ok(true)
    }
}

// ============================================================================
// SshTransport
// ============================================================================

/// Authenticated SSH connection to one device.
pub struct SshTransport {
    /// Connection handle.
    handle: Handle<AcceptAnyHostKey>,
    /// `host:port`, used to prefix error messages.
    address: String,
}

impl fmt::Debug for SshTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshTransport")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl SshTransport {
    /// Dials the device and authenticates within the configured timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if dial and authentication take too long
    /// - [`Error::Connection`] if the dial fails or no method authenticates
    pub async fn dial(config: &SessionConfig) -> Result<Self> {
        let address = config.address();
        let limit = config.connect_timeout();

        timeout(limit, Self::dial_and_authenticate(config))
            .await
            .map_err(|_| Error::connection_timeout(address, limit.as_millis() as u64))?
    }

    /// Returns `host:port` of the connection.
    #[inline]
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    async fn dial_and_authenticate(config: &SessionConfig) -> Result<Self> {
        let address = config.address();
        let ssh_config = Arc::new(client::Config::default());

        let mut handle = client::connect(
            ssh_config,
            (config.host(), config.port()),
            AcceptAnyHostKey,
        )
        .await
        .map_err(|e| Error::connection(format!("{address} - {e}")))?;

        debug!(%address, "SSH connection established");

        let credentials = config.credentials();
        let mut authenticated = handle
            .authenticate_password(credentials.username.clone(), credentials.password.clone())
            .await
            .map_err(|e| Error::connection(format!("{address} - {e}")))?;

        if !authenticated && let Some(key) = load_key(credentials.private_key.as_deref()) {
            debug!(%address, "Password rejected, trying private key");
            authenticated = handle
                .authenticate_publickey(credentials.username.clone(), Arc::new(key))
                .await
                .map_err(|e| Error::connection(format!("{address} - {e}")))?;
        }

        if !authenticated {
            return Err(Error::connection(format!(
                "{address} - authentication failed for user {}",
                credentials.username
            )));
        }

        info!(%address, user = %credentials.username, "SSH authenticated");

        Ok(Self { handle, address })
    }
}

/// Loads a private key, logging and skipping anything unusable.
fn load_key(path: Option<&Path>) -> Option<KeyPair> {
    let path = path?;

    if existing_key(Some(path)).is_none() {
        warn!(path = %path.display(), "Private key file not found, skipping");
        return None;
    }

    match russh_keys::load_secret_key(path, None) {
        Ok(key) => Some(key),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unusable private key, skipping");
            None
        }
    }
}

#[async_trait]
impl Transport for SshTransport {
    type Stream = ChannelStream<Msg>;

    async fn open_channel(&mut self, subsystem: &str) -> Result<Self::Stream> {
        let mut channel = self.handle.channel_open_session().await.map_err(|e| {
            Error::protocol(format!(
                "{} - failure on opening session channel - details: {e}",
                self.address
            ))
        })?;

        channel
            .request_subsystem(true, subsystem)
            .await
            .map_err(|e| {
                Error::protocol(format!(
                    "{} - failed to request {subsystem} subsystem: {e}",
                    self.address
                ))
            })?;

        // Window adjustments may arrive before the reply.
        loop {
            match channel.wait().await {
                Some(ChannelMsg::Success) => break,
                Some(ChannelMsg::Failure) => {
                    return Err(Error::protocol(format!(
                        "{} - {subsystem} subsystem refused",
                        self.address
                    )));
                }
                Some(ChannelMsg::Eof | ChannelMsg::Close) | None => {
                    return Err(Error::protocol(format!(
                        "{} - channel closed before {subsystem} subsystem reply",
                        self.address
                    )));
                }
                Some(_) => {}
            }
        }

        debug!(address = %self.address, subsystem, "Subsystem channel open");

        Ok(channel.into_stream())
    }

    async fn close(&mut self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
            .map_err(|e| Error::connection(format!("{} - {e}", self.address)))
    }
}

// ============================================================================
// Tests
// ============================================================================
