//! Session configuration and validation.
//!
//! Provides a fluent API for building a validated [`SessionConfig`].
//!
//! # Example
//!
//! ```
//! use netconf_client::SessionConfig;
//!
//! # fn example() -> netconf_client::Result<()> {
//! let config = SessionConfig::builder()
//!     .host("192.168.1.1")
//!     .port("830")
//!     .username("admin")
//!     .password("secret")
//!     .build()?;
//!
//! assert_eq!(config.address(), "192.168.1.1:830");
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Port used when none is supplied.
pub const DEFAULT_PORT: u16 = 830;

/// Port used when the supplied one is not a number.
pub const FALLBACK_PORT: u16 = 22;

/// Default username.
pub const DEFAULT_USERNAME: &str = "admin";

/// Default dial and authentication timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default deadline for one request/reply round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Credentials
// ============================================================================

/// Login credentials.
///
/// `Debug` never prints the password.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Password, always tried first.
    pub password: String,
    /// Optional private key file, tried after the password.
    pub private_key: Option<PathBuf>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("private_key", &self.private_key)
            .finish()
    }
}

// ============================================================================
// SessionConfig
// ============================================================================

/// Validated connection settings for one session.
///
/// Immutable once built; use [`SessionConfig::builder()`] to create one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Dotted-quad device address.
    host: String,
    /// SSH port.
    port: u16,
    /// Login credentials.
    credentials: Credentials,
    /// Dial and authentication timeout.
    connect_timeout: Duration,
    /// Per-request deadline.
    request_timeout: Duration,
}

impl SessionConfig {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::new()
    }

    /// Returns the device address.
    #[inline]
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the SSH port.
    #[inline]
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns `host:port`.
    #[inline]
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the login credentials.
    #[inline]
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the dial and authentication timeout.
    #[inline]
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the per-request deadline.
    #[inline]
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

// ============================================================================
// SessionConfigBuilder
// ============================================================================

/// Builder for [`SessionConfig`].
///
/// The port is taken as text, the way users type it; see
/// [`build`](Self::build) for how bad values are handled.
#[derive(Debug, Clone)]
pub struct SessionConfigBuilder {
    host: Option<String>,
    port: Option<String>,
    username: String,
    password: String,
    private_key: Option<PathBuf>,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl Default for SessionConfigBuilder {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            username: DEFAULT_USERNAME.to_string(),
            password: String::new(),
            private_key: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl SessionConfigBuilder {
    /// Creates a builder with default username and timeouts.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the device address (dotted quad).
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the SSH port as text.
    #[inline]
    #[must_use]
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    /// Sets the login name.
    #[inline]
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Sets the password.
    #[inline]
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Sets a private key file to try after the password.
    #[inline]
    #[must_use]
    pub fn private_key(mut self, path: impl Into<PathBuf>) -> Self {
        self.private_key = Some(path.into());
        self
    }

    /// Sets the dial and authentication timeout.
    #[inline]
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the per-request deadline.
    #[inline]
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builds the configuration with validation.
    ///
    /// A port that is not a number in `0..=65535` is not an error: a warning
    /// is logged and [`FALLBACK_PORT`] is used instead.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the host is missing or not a dotted quad
    pub fn build(self) -> Result<SessionConfig> {
        let host = self
            .host
            .ok_or_else(|| Error::validation("host address is required"))?;
        validate_address(&host)?;

        let port = match self.port.as_deref() {
            None => DEFAULT_PORT,
            Some(raw) => resolve_port(raw),
        };

        Ok(SessionConfig {
            host,
            port,
            credentials: Credentials {
                username: self.username,
                password: self.password,
                private_key: self.private_key,
            },
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
        })
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Checks that `address` has four dot-separated segments, each `0..=255`.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming the address and offending segment.
pub fn validate_address(address: &str) -> Result<()> {
    let segments: Vec<&str> = address.split('.').collect();
    if segments.len() != 4 {
        return Err(Error::validation(format!(
            "provided ip: {address} - ip address is not formatted properly"
        )));
    }

    for segment in segments {
        if segment.parse::<u8>().is_err() {
            return Err(Error::validation(format!(
                "provided ip: {address} - ip address includes wrong values: {segment}"
            )));
        }
    }

    Ok(())
}

/// Parses a port, falling back to [`FALLBACK_PORT`] with a warning.
#[must_use]
pub fn resolve_port(raw: &str) -> u16 {
    match raw.trim().parse::<u16>() {
        Ok(port) => port,
        Err(_) => {
            warn!(
                port = raw,
                fallback = FALLBACK_PORT,
                "Wrong port number, using fallback"
            );
            FALLBACK_PORT
        }
    }
}

/// Returns the key path if it exists, for logging decisions upstream.
#[inline]
pub(crate) fn existing_key(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| p.exists())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_validate_address_accepts_dotted_quad() {
        assert!(validate_address("10.10.10.10").is_ok());
        assert!(validate_address("0.0.0.0").is_ok());
        assert!(validate_address("255.255.255.255").is_ok());
    }

    #[test]
    fn test_validate_address_rejects_out_of_range() {
        let err = validate_address("10.10.10.256").expect_err("256 is out of range");
        assert!(matches!(err, Error::Validation { .. }));
        assert!(err.to_string().contains("256"));
    }

    #[test]
    fn test_validate_address_rejects_wrong_segment_count() {
        assert!(validate_address("10.10.10").is_err());
        assert!(validate_address("10.10.10.10.10").is_err());
        assert!(validate_address("").is_err());
    }

    #[test]
    fn test_validate_address_rejects_non_numeric() {
        assert!(validate_address("10.10.ten.10").is_err());
        assert!(validate_address("10..10.10").is_err());
        assert!(validate_address("router.example.com.x").is_err());
    }

    #[test]
    fn test_resolve_port_numeric() {
        assert_eq!(resolve_port("830"), 830);
        assert_eq!(resolve_port("22"), 22);
    }

    #[test]
    fn test_resolve_port_falls_back() {
        assert_eq!(resolve_port("netconf"), FALLBACK_PORT);
        assert_eq!(resolve_port("70000"), FALLBACK_PORT);
        assert_eq!(resolve_port(""), FALLBACK_PORT);
    }

    #[test]
    fn test_build_defaults() {
        let config = SessionConfig::builder()
            .host("10.10.10.10")
            .password("secret")
            .build()
            .expect("valid config");

        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.credentials().username, DEFAULT_USERNAME);
        assert_eq!(config.connect_timeout(), DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
        assert!(config.credentials().private_key.is_none());
    }

    #[test]
    fn test_build_bad_port_is_not_fatal() {
        let config = SessionConfig::builder()
            .host("10.10.10.10")
            .port("abc")
            .build()
            .expect("bad port only warns");

        assert_eq!(config.port(), FALLBACK_PORT);
        assert_eq!(config.address(), "10.10.10.10:22");
    }

    #[test]
    fn test_build_rejects_bad_host() {
        let result = SessionConfig::builder().host("10.10.10.256").build();
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_build_requires_host() {
        let err = SessionConfig::builder().build().expect_err("host required");
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn test_builder_chain() {
        let config = SessionConfig::builder()
            .host("192.168.1.1")
            .port("2830")
            .username("operator")
            .password("pw")
            .private_key("/tmp/id_ed25519")
            .timeout(Duration::from_secs(5))
            .request_timeout(Duration::from_secs(120))
            .build()
            .expect("valid config");

        assert_eq!(config.address(), "192.168.1.1:2830");
        assert_eq!(config.credentials().username, "operator");
        assert_eq!(
            config.credentials().private_key.as_deref(),
            Some(Path::new("/tmp/id_ed25519"))
        );
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials {
            username: "admin".into(),
            password: "hunter2".into(),
            private_key: None,
        };
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_existing_key_filters_missing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let present = dir.path().join("id_rsa");
        std::fs::write(&present, "not really a key").expect("write key");
        let missing = dir.path().join("missing");

        assert_eq!(existing_key(Some(&present)), Some(present.as_path()));
        assert_eq!(existing_key(Some(&missing)), None);
        assert_eq!(existing_key(None), None);
    }

    proptest! {
        #[test]
        fn prop_any_octets_are_accepted(a: u8, b: u8, c: u8, d: u8) {
            let address = format!("{a}.{b}.{c}.{d}");
            prop_assert!(validate_address(&address).is_ok());
        }

        #[test]
        fn prop_segment_over_255_is_rejected(a: u8, big in 256u32..100_000) {
            let address = format!("{a}.{big}.0.1");
            prop_assert!(validate_address(&address).is_err());
        }
    }
}
