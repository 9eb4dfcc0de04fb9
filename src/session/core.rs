//! NETCONF session over an owned transport.
//!
//! The [`Session`] owns the transport connection and the framed command
//! channel. It drives the hello handshake and runs one request at a time.
//!
//! # Example
//!
//! ```no_run
//! use netconf_client::{Session, SessionConfig};
//!
//! # async fn example() -> netconf_client::Result<()> {
//! let config = SessionConfig::builder()
//!     .host("192.168.1.1")
//!     .password("secret")
//!     .build()?;
//!
//! let mut session = Session::connect(config).await?;
//! let reply = session.run("<rpc><get-config><source><running/></source></get-config></rpc>").await?;
//! println!("{reply}");
//! session.disconnect().await;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::protocol::{CLOSE_SESSION, Capabilities, Framer, HELLO, NETCONF_SUBSYSTEM};
use crate::transport::{SshTransport, Transport};

use super::config::SessionConfig;
use super::state::SessionState;

// ============================================================================
// Session
// ============================================================================

/// One authenticated NETCONF conversation with a device.
///
/// `run` borrows the session mutably, so two requests can never be in
/// flight on the same session. `disconnect` consumes it.
pub struct Session<T: Transport = SshTransport> {
    /// Validated connection settings.
    config: SessionConfig,
    /// Current lifecycle state.
    state: SessionState,
    /// Owned connection.
    transport: T,
    /// Framed command channel.
    framer: Framer<T::Stream>,
    /// Server hello, verbatim.
    capabilities: Capabilities,
}

// ============================================================================
// Session - Display
// ============================================================================

impl<T: Transport> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.config.address())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Session - Connect
// ============================================================================

impl Session<SshTransport> {
    /// Dials the device over SSH and completes the hello handshake.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] / [`Error::ConnectionTimeout`] if dial or
    ///   authentication fails; the message includes `host:port`
    /// - [`Error::Protocol`] if the `netconf` subsystem is refused
    /// - [`Error::Framing`] if the handshake I/O fails
    pub async fn connect(config: SessionConfig) -> Result<Self> {
        debug!(
            address = %config.address(),
            state = %SessionState::Authenticating,
            "Connecting"
        );

        let transport = SshTransport::dial(&config).await?;
        Self::establish(config, transport).await
    }
}

impl<T: Transport> Session<T> {
    /// Completes the handshake over an already authenticated transport.
    ///
    /// Opens the `netconf` subsystem channel, sends the client hello and
    /// reads the server hello into [`capabilities`](Self::capabilities).
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if the subsystem is refused
    /// - [`Error::Framing`] if the handshake I/O fails
    pub async fn establish(config: SessionConfig, mut transport: T) -> Result<Self> {
        let stream = match transport.open_channel(NETCONF_SUBSYSTEM).await {
            Ok(stream) => stream,
            Err(e) => {
                release(&mut transport).await;
                return Err(e);
            }
        };

        let mut framer = Framer::new(stream);

        let hello = async {
            framer.send(HELLO).await?;
            debug!(state = %SessionState::HandshakeSent, "Client hello sent");
            framer.receive().await
        };

        let hello = match timeout(config.request_timeout(), hello).await {
            Ok(Ok(hello)) => hello,
            Ok(Err(e)) => {
                release(&mut transport).await;
                return Err(e);
            }
            Err(_) => {
                release(&mut transport).await;
                return Err(Error::timeout(
                    "hello handshake",
                    config.request_timeout().as_millis() as u64,
                ));
            }
        };

        let capabilities = Capabilities::new(hello);

        info!(
            address = %config.address(),
            session_id = ?capabilities.session_id(),
            "NETCONF session ready"
        );

        Ok(Self {
            config,
            state: SessionState::Ready,
            transport,
            framer,
            capabilities,
        })
    }
}

// ============================================================================
// Session - Public API
// ============================================================================

impl<T: Transport> Session<T> {
    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the server hello captured during the handshake.
    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns the configuration the session was built from.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Runs one request and returns the reply text, sentinel included.
    ///
    /// The sentinel is appended to `payload` only if it is absent. If the
    /// device closes the stream before the sentinel, the partial reply is
    /// returned. The whole round trip is bounded by the configured request
    /// timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] if the session is not ready
    /// - [`Error::Framing`] on a write or read fault
    /// - [`Error::Timeout`] if the reply does not complete in time
    ///
    /// Framing faults and timeouts move the session to
    /// [`SessionState::Faulted`].
    pub async fn run(&mut self, payload: &str) -> Result<String> {
        if !self.state.is_ready() {
            return Err(Error::invalid_state("run", self.state));
        }

        let limit = self.config.request_timeout();
        let result = match timeout(limit, self.framer.round_trip(payload)).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout("rpc reply", limit.as_millis() as u64)),
        };

        if let Err(e) = &result
            && e.faults_session()
        {
            warn!(error = %e, "Session faulted");
            self.state = SessionState::Faulted;
        }

        result
    }

    /// Sends `close-session` and releases the channel and connection.
    ///
    /// Best effort: the close reply is discarded, and failures are only
    /// logged. A faulted session skips the close request.
    pub async fn disconnect(mut self) {
        if self.state.is_ready() {
            match self.run(CLOSE_SESSION).await {
                Ok(_) => debug!("close-session acknowledged"),
                Err(e) => warn!(error = %e, "close-session failed"),
            }
        }

        if let Err(e) = self.framer.shutdown().await {
            debug!(error = %e, "Channel shutdown failed");
        }
        release(&mut self.transport).await;

        self.state = SessionState::Closed;
        info!(address = %self.config.address(), state = %self.state, "Session closed");
    }
}

/// Closes the transport, logging failures.
async fn release<T: Transport>(transport: &mut T) {
    if let Err(e) = transport.close().await {
        warn!(error = %e, "Transport close failed");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Error as IoError, ErrorKind};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};
    use tokio_test::io::{Builder, Mock};

    use crate::protocol::SENTINEL;

    const SERVER_HELLO: &str = "<hello><capabilities>\
        <capability>urn:ietf:params:netconf:base:1.0</capability>\
        </capabilities><session-id>7</session-id></hello>]]>]]>";

    /// Transport that hands out one prepared stream.
    struct ScriptedTransport<S> {
        stream: Option<S>,
        refuse: bool,
        closed: Arc<AtomicBool>,
    }

    impl<S> ScriptedTransport<S> {
        fn new(stream: S) -> (Self, Arc<AtomicBool>) {
            let closed = Arc::new(AtomicBool::new(false));
            let transport = Self {
                stream: Some(stream),
                refuse: false,
                closed: Arc::clone(&closed),
            };
            (transport, closed)
        }
    }

    #[async_trait]
    impl<S> Transport for ScriptedTransport<S>
    where
        S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send,
    {
        type Stream = S;

        async fn open_channel(&mut self, subsystem: &str) -> Result<S> {
            assert_eq!(subsystem, NETCONF_SUBSYSTEM);
            if self.refuse {
                return Err(Error::protocol("netconf subsystem refused"));
            }
            self.stream
                .take()
                .ok_or_else(|| Error::protocol("channel already open"))
        }

        async fn close(&mut self) -> Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn config() -> SessionConfig {
        SessionConfig::builder()
            .host("10.10.10.10")
            .password("secret")
            .request_timeout(Duration::from_secs(5))
            .build()
            .expect("valid config")
    }

    fn handshake() -> Builder {
        let mut builder = Builder::new();
        builder.write(HELLO.as_bytes()).read(SERVER_HELLO.as_bytes());
        builder
    }

    async fn ready_session(mock: Mock) -> (Session<ScriptedTransport<Mock>>, Arc<AtomicBool>) {
        let (transport, closed) = ScriptedTransport::new(mock);
        let session = Session::establish(config(), transport)
            .await
            .expect("handshake");
        (session, closed)
    }

    #[tokio::test]
    async fn test_establish_captures_capabilities_verbatim() {
        let (session, _) = ready_session(handshake().build()).await;

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.capabilities().as_str(), SERVER_HELLO);
        assert_eq!(session.capabilities().session_id(), Some(7));
    }

    #[tokio::test]
    async fn test_establish_subsystem_refused() {
        let (mut transport, closed) = ScriptedTransport::new(Builder::new().build());
        transport.refuse = true;

        let err = Session::establish(config(), transport)
            .await
            .expect_err("refused");
        assert!(matches!(err, Error::Protocol { .. }));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_establish_handshake_read_fault() {
        let mock = Builder::new()
            .write(HELLO.as_bytes())
            .read_error(IoError::new(ErrorKind::ConnectionReset, "reset"))
            .build();
        let (transport, closed) = ScriptedTransport::new(mock);

        let err = Session::establish(config(), transport)
            .await
            .expect_err("fault");
        assert!(matches!(err, Error::Framing { .. }));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_run_appends_sentinel_and_returns_reply() {
        let mock = handshake()
            .write(b"<rpc><get/></rpc>]]>]]>")
            .read(b"<rpc-reply><data/></rpc-reply>]]>]]>")
            .build();
        let (mut session, _) = ready_session(mock).await;

        let reply = session.run("<rpc><get/></rpc>").await.expect("run");
        assert_eq!(reply, "<rpc-reply><data/></rpc-reply>]]>]]>");
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_run_keeps_existing_sentinel() {
        let mock = handshake()
            .write(b"<rpc><get/></rpc>]]>]]>")
            .read(b"<rpc-reply/>]]>]]>")
            .build();
        let (mut session, _) = ready_session(mock).await;

        let reply = session.run("<rpc><get/></rpc>]]>]]>").await.expect("run");
        assert_eq!(reply.matches(SENTINEL).count(), 1);
    }

    #[tokio::test]
    async fn test_run_sequential_requests() {
        let mock = handshake()
            .write(b"<rpc>1</rpc>]]>]]>")
            .read(b"<rpc-reply>1</rpc-reply>]]>]]>")
            .write(b"<rpc>2</rpc>]]>]]>")
            .read(b"<rpc-reply>2</rpc-reply>]]>]]>")
            .build();
        let (mut session, _) = ready_session(mock).await;

        assert_eq!(
            session.run("<rpc>1</rpc>").await.expect("first"),
            "<rpc-reply>1</rpc-reply>]]>]]>"
        );
        assert_eq!(
            session.run("<rpc>2</rpc>").await.expect("second"),
            "<rpc-reply>2</rpc-reply>]]>]]>"
        );
    }

    #[tokio::test]
    async fn test_run_end_of_stream_returns_partial_reply() {
        let mock = handshake()
            .write(b"<rpc/>]]>]]>")
            .read(b"<rpc-reply><da")
            .build();
        let (mut session, _) = ready_session(mock).await;

        let reply = session.run("<rpc/>").await.expect("partial reply");
        assert_eq!(reply, "<rpc-reply><da");
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_run_read_fault_faults_session() {
        let mock = handshake()
            .write(b"<rpc/>]]>]]>")
            .read_error(IoError::new(ErrorKind::ConnectionAborted, "aborted"))
            .build();
        let (mut session, _) = ready_session(mock).await;

        let err = session.run("<rpc/>").await.expect_err("fault");
        assert!(matches!(err, Error::Framing { .. }));
        assert_eq!(session.state(), SessionState::Faulted);

        let err = session.run("<rpc/>").await.expect_err("faulted");
        assert!(matches!(
            err,
            Error::InvalidState {
                state: SessionState::Faulted,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_run_deadline_faults_session() {
        let (client, mut server): (DuplexStream, DuplexStream) = duplex(4096);
        let (transport, _) = ScriptedTransport::new(client);

        let device = tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            let n = server.read(&mut buf).await.expect("read hello");
            assert!(String::from_utf8_lossy(&buf[..n]).contains("<hello"));
            server.write_all(SERVER_HELLO.as_bytes()).await.expect("write hello");
            // Read the request and never answer.
            let _ = server.read(&mut buf).await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let config = SessionConfig::builder()
            .host("10.10.10.10")
            .request_timeout(Duration::from_millis(100))
            .build()
            .expect("valid config");

        let mut session = Session::establish(config, transport)
            .await
            .expect("handshake");
        let err = session.run("<rpc/>").await.expect_err("deadline");

        assert!(matches!(err, Error::Timeout { .. }));
        assert_eq!(session.state(), SessionState::Faulted);
        device.abort();
    }

    #[tokio::test]
    async fn test_disconnect_sends_close_session() {
        let mock = handshake()
            .write(CLOSE_SESSION.as_bytes())
            .read(b"<rpc-reply message-id=\"103\"><ok/></rpc-reply>]]>]]>")
            .build();
        let (session, closed) = ready_session(mock).await;

        session.disconnect().await;
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_disconnect_ignores_close_failure() {
        let mock = handshake()
            .write_error(IoError::new(ErrorKind::BrokenPipe, "gone"))
            .build();
        let (session, closed) = ready_session(mock).await;

        session.disconnect().await;
        assert!(closed.load(Ordering::SeqCst));
    }
}
