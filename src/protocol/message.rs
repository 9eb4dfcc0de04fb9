//! Fixed NETCONF envelopes and the peer capability record.
//!
//! The client advertises exactly one capability in its hello. The server's
//! hello is kept verbatim; [`Capabilities`] only parses it on demand.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use quick_xml::Reader;
use quick_xml::events::Event;

use super::framing::SENTINEL;

// ============================================================================
// Constants
// ============================================================================

/// SSH subsystem that carries NETCONF.
pub const NETCONF_SUBSYSTEM: &str = "netconf";

/// The single capability the client advertises.
pub const BASE_CAPABILITY: &str = "urn:ietf:params:netconf:base:1.0";

/// Client hello envelope, sentinel included.
pub const HELLO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">
  <capabilities>
    <capability>urn:ietf:params:netconf:base:1.0</capability>
  </capabilities>
</hello>]]>]]>"#;

/// Close-session request sent on disconnect, sentinel included.
pub const CLOSE_SESSION: &str = r#"<rpc message-id="103" xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">
  <close-session/>
</rpc>]]>]]>"#;

// ============================================================================
// Capabilities
// ============================================================================

/// Server hello as received during the handshake.
///
/// The text is stored exactly as read, sentinel included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Verbatim hello text.
    raw: String,
}

impl Capabilities {
    /// Wraps the raw hello text.
    #[inline]
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Returns the verbatim hello text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Consumes the record and returns the verbatim text.
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.raw
    }

    /// Returns `true` if nothing was received during the handshake.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Lists the `<capability>` URIs the server advertised.
    ///
    /// Parsing stops at the first malformed token; URIs read up to that
    /// point are still returned.
    #[must_use]
    pub fn uris(&self) -> Vec<String> {
        let mut uris = Vec::new();
        self.scan_text_of(b"capability", |text| {
            uris.push(text);
            true
        });
        uris
    }

    /// Returns `true` if the server advertised `uri`.
    #[must_use]
    pub fn supports(&self, uri: &str) -> bool {
        self.uris().iter().any(|u| u == uri)
    }

    /// Returns the `<session-id>` the server assigned, if present.
    #[must_use]
    pub fn session_id(&self) -> Option<u32> {
        let mut id = None;
        self.scan_text_of(b"session-id", |text| {
            id = text.parse().ok();
            false
        });
        id
    }

    /// Calls `visit` with the trimmed text of each element named `local`.
    ///
    /// `visit` returns `false` to stop scanning.
    fn scan_text_of(&self, local: &[u8], mut visit: impl FnMut(String) -> bool) {
        let body = self.raw.split(SENTINEL).next().unwrap_or_default();
        let mut reader = Reader::from_str(body);
        let mut inside = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => inside = e.local_name().as_ref() == local,
                Ok(Event::Text(t)) if inside => {
                    let Ok(text) = t.unescape() else { break };
                    let text = text.trim();
                    if !text.is_empty() && !visit(text.to_string()) {
                        break;
                    }
                }
                Ok(Event::End(_)) => inside = false,
                Ok(Event::Eof) | Err(_) => break,
                Ok(_) => {}
            }
        }
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER_HELLO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">
  <capabilities>
    <capability>urn:ietf:params:netconf:base:1.0</capability>
    <capability>urn:ietf:params:netconf:capability:candidate:1.0</capability>
    <capability>
      http://openconfig.net/yang/terminal-device?module=openconfig-terminal-device
    </capability>
  </capabilities>
  <session-id>4711</session-id>
</hello>]]>]]>"#;

    #[test]
    fn test_hello_advertises_only_base_capability() {
        assert!(HELLO.ends_with(SENTINEL));
        assert_eq!(HELLO.matches(SENTINEL).count(), 1);
        assert_eq!(HELLO.matches("<capability>").count(), 1);
        assert!(HELLO.contains(BASE_CAPABILITY));
    }

    #[test]
    fn test_close_session_envelope() {
        assert!(CLOSE_SESSION.contains(r#"message-id="103""#));
        assert!(CLOSE_SESSION.contains("<close-session/>"));
        assert!(CLOSE_SESSION.ends_with(SENTINEL));
    }

    #[test]
    fn test_capabilities_keep_raw_text() {
        let caps = Capabilities::new(SERVER_HELLO);
        assert_eq!(caps.as_str(), SERVER_HELLO);
        assert_eq!(caps.to_string(), SERVER_HELLO);
        assert!(!caps.is_empty());
    }

    #[test]
    fn test_capabilities_uris() {
        let caps = Capabilities::new(SERVER_HELLO);
        let uris = caps.uris();

        assert_eq!(uris.len(), 3);
        assert_eq!(uris[0], BASE_CAPABILITY);
        assert_eq!(
            uris[2],
            "http://openconfig.net/yang/terminal-device?module=openconfig-terminal-device"
        );
        assert!(caps.supports("urn:ietf:params:netconf:capability:candidate:1.0"));
        assert!(!caps.supports("urn:ietf:params:netconf:capability:startup:1.0"));
    }

    #[test]
    fn test_capabilities_session_id() {
        let caps = Capabilities::new(SERVER_HELLO);
        assert_eq!(caps.session_id(), Some(4711));
    }

    #[test]
    fn test_capabilities_malformed_hello() {
        let caps = Capabilities::new("<hello><capabilities><capability>urn:a</capability><oops");
        assert_eq!(caps.uris(), vec!["urn:a".to_string()]);
        assert_eq!(caps.session_id(), None);
    }

    #[test]
    fn test_capabilities_empty() {
        let caps = Capabilities::default();
        assert!(caps.is_empty());
        assert!(caps.uris().is_empty());
        assert_eq!(caps.session_id(), None);
    }
}
