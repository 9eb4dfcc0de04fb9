//! End-of-message framing over a duplex byte stream.
//!
//! NETCONF 1.0 marks the end of every message with the six-character
//! sentinel `]]>]]>`. The stream gives no other boundary information, so
//! the reader accumulates chunks until the sentinel shows up or the peer
//! closes the stream.
//!
//! # Example
//!
//! ```ignore
//! use netconf_client::protocol::Framer;
//!
//! let mut framer = Framer::new(stream);
//! let reply = framer.round_trip("<rpc><get/></rpc>").await?;
//! assert!(reply.ends_with("]]>]]>"));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::borrow::Cow;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// End-of-message marker of the legacy NETCONF framing mode.
pub const SENTINEL: &str = "]]>]]>";

/// Size of each read from the inbound stream.
const READ_CHUNK_SIZE: usize = 1024;

// ============================================================================
// Sentinel Helpers
// ============================================================================

/// Ensures `payload` carries the sentinel.
///
/// The sentinel is appended only if it does not already occur anywhere in
/// the payload. This is a substring check, not a suffix check.
#[must_use]
pub fn terminate(payload: &str) -> Cow<'_, str> {
    if payload.contains(SENTINEL) {
        Cow::Borrowed(payload)
    } else {
        let mut framed = String::with_capacity(payload.len() + SENTINEL.len());
        framed.push_str(payload);
        framed.push_str(SENTINEL);
        Cow::Owned(framed)
    }
}

/// Returns `true` if the sentinel starts inside `buf[from..]`.
fn contains_sentinel(buf: &[u8], from: usize) -> bool {
    let needle = SENTINEL.as_bytes();
    buf.get(from..)
        .is_some_and(|tail| tail.windows(needle.len()).any(|w| w == needle))
}

// ============================================================================
// Framer
// ============================================================================

/// Sentinel framer bound to one duplex stream.
///
/// All methods take `&mut self`: one message is in flight at a time and
/// replies are matched to requests purely by ordering.
#[derive(Debug)]
pub struct Framer<S> {
    /// Underlying channel stream.
    stream: S,
}

impl<S> Framer<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a stream.
    #[inline]
    #[must_use]
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Writes one message, appending the sentinel if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Framing`] if the write or flush fails.
    pub async fn send(&mut self, payload: &str) -> Result<()> {
        let framed = terminate(payload);

        self.stream
            .write_all(framed.as_bytes())
            .await
            .map_err(|e| Error::framing(format!("failed to send message: {e}")))?;
        self.stream
            .flush()
            .await
            .map_err(|e| Error::framing(format!("failed to flush message: {e}")))?;

        trace!(bytes = framed.len(), "Message sent");
        Ok(())
    }

    /// Reads until the sentinel or end-of-stream.
    ///
    /// The returned text is everything read, sentinel included. If the peer
    /// closes the stream first, the partial text is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Framing`] on a read failure other than end-of-stream.
    pub async fn receive(&mut self) -> Result<String> {
        let mut buffer = Vec::with_capacity(READ_CHUNK_SIZE);
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            let n = self
                .stream
                .read(&mut chunk)
                .await
                .map_err(|e| Error::framing(format!("failed to read response: {e}")))?;

            if n == 0 {
                debug!(bytes = buffer.len(), "Stream ended before sentinel");
                break;
            }

            // A sentinel split across chunks starts at most len-1 bytes back.
            let search_from = buffer.len().saturating_sub(SENTINEL.len() - 1);
            buffer.extend_from_slice(&chunk[..n]);

            if contains_sentinel(&buffer, search_from) {
                break;
            }
        }

        trace!(bytes = buffer.len(), "Message received");
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Sends one message and reads its reply.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send) and [`receive`](Self::receive).
    pub async fn round_trip(&mut self, payload: &str) -> Result<String> {
        self.send(payload).await?;
        self.receive().await
    }

    /// Shuts down the write half, signalling end-of-input to the peer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the shutdown fails.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }

    /// Returns the wrapped stream.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> S {
        self.stream
    }
}

// ============================================================================
// Tests
// ============================================================================
