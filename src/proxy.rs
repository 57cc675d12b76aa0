//! SOCKS5 proxy configuration for API traffic.
//!
//! Routes every request made by the transport through a SOCKS5 proxy. Host name
//! resolution happens on the proxy side (`socks5h`), so the platform's DNS
//! lookups never leave the proxy either.
//!
//! # Example
//!
//! ```
//! use discord_purge::Socks5Proxy;
//!
//! let proxy = Socks5Proxy::new("127.0.0.1", 9050);
//! assert_eq!(proxy.url(), "socks5h://127.0.0.1:9050");
//!
//! let proxy = Socks5Proxy::with_auth("proxy.example.com", 1080, "user", "pass");
//! assert!(proxy.requires_auth());
//! ```

use crate::error::{Error, Result};
use secrecy::{ExposeSecret, SecretString};

/// SOCKS5 proxy configuration.
#[derive(Debug, Clone)]
pub struct Socks5Proxy {
    /// Proxy server hostname or IP address.
    pub host: String,
    /// Proxy server port.
    pub port: u16,
    /// Optional authentication credentials.
    pub auth: Option<ProxyAuth>,
}

/// Authentication credentials for a SOCKS5 proxy.
#[derive(Debug, Clone)]
pub struct ProxyAuth {
    /// Username for proxy authentication.
    pub username: String,
    /// Password for proxy authentication.
    pub password: SecretString,
}

impl Socks5Proxy {
    /// Creates a proxy configuration without authentication.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            auth: None,
        }
    }

    /// Creates a proxy configuration with username/password authentication.
    #[must_use]
    pub fn with_auth(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            auth: Some(ProxyAuth {
                username: username.into(),
                password: SecretString::from(password.into()),
            }),
        }
    }

    /// Returns `true` if this proxy requires authentication.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.auth.is_some()
    }

    /// Returns the proxy URL without credentials.
    #[must_use]
    pub fn url(&self) -> String {
        format!("socks5h://{}:{}", self.host, self.port)
    }

    /// Converts this configuration into a proxy usable by the HTTP client.
    pub(crate) fn to_reqwest(&self) -> Result<reqwest::Proxy> {
        let proxy = reqwest::Proxy::all(self.url()).map_err(|source| Error::InvalidConfig {
            message: format!("invalid proxy {self}: {source}"),
        })?;

        Ok(match &self.auth {
            Some(auth) => proxy.basic_auth(&auth.username, auth.password.expose_secret()),
            None => proxy,
        })
    }
}

impl std::fmt::Display for Socks5Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.auth {
            Some(auth) => write!(
                f,
                "socks5h://{}:***@{}:{}",
                auth.username, self.host, self.port
            ),
            None => write!(f, "{}", self.url()),
        }
    }
}
