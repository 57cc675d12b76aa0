//! Locating the account token.
//!
//! The core only needs a non-empty token string. [`CredentialResolver`] finds
//! one the usual ways, in order:
//!
//! 1. a token file (default `token.txt`),
//! 2. the `DISCORD_TOKEN` environment variable,
//! 3. a caller-supplied prompt.
//!
//! # Example
//!
//! ```
//! use discord_purge::credentials::CredentialResolver;
//! use secrecy::ExposeSecret;
//!
//! let resolver = CredentialResolver::new()
//!     .without_file()
//!     .env_var("MY_APP_TOKEN_UNSET");
//!
//! let token = resolver
//!     .resolve(|| Ok("a-token-that-is-long-enough".to_string()))
//!     .unwrap();
//! assert_eq!(token.expose_secret(), "a-token-that-is-long-enough");
//! ```

use crate::error::{Error, Result};
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable checked for a token.
pub const TOKEN_ENV_VAR: &str = "DISCORD_TOKEN";

/// Token file checked before the environment.
pub const DEFAULT_TOKEN_FILE: &str = "token.txt";

/// Tokens shorter than this are rejected as malformed.
pub const MIN_TOKEN_LEN: usize = 20;

/// Finds a token from a file, the environment, or a prompt.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    file: Option<PathBuf>,
    env_var: Option<String>,
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self {
            file: Some(PathBuf::from(DEFAULT_TOKEN_FILE)),
            env_var: Some(TOKEN_ENV_VAR.to_string()),
        }
    }
}

impl CredentialResolver {
    /// Resolver with the default file and environment variable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the token from `path` instead of `token.txt`.
    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Skips the token file.
    #[must_use]
    pub fn without_file(mut self) -> Self {
        self.file = None;
        self
    }

    /// Checks `name` instead of `DISCORD_TOKEN`.
    #[must_use]
    pub fn env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var = Some(name.into());
        self
    }

    /// Skips the environment.
    #[must_use]
    pub fn without_env(mut self) -> Self {
        self.env_var = None;
        self
    }

    /// Returns a token from the file or environment, if either has one.
    ///
    /// # Errors
    ///
    /// Returns an error if the token file exists but cannot be read, or if the
    /// token found is malformed.
    pub fn lookup(&self) -> Result<Option<SecretString>> {
        if let Some(path) = &self.file {
            if let Some(token) = read_token_file(path)? {
                info!(path = %path.display(), "Loaded token from file");
                return validate(&token).map(Some);
            }
        }

        if let Some(name) = &self.env_var {
            if let Ok(token) = std::env::var(name) {
                if !token.trim().is_empty() {
                    info!(env_var = %name, "Loaded token from environment");
                    return validate(&token).map(Some);
                }
            }
        }

        Ok(None)
    }

    /// Returns a token from the file or environment, falling back to `prompt`.
    ///
    /// # Errors
    ///
    /// Returns an error if no source yields a well-formed token, or if the
    /// prompt itself fails.
    pub fn resolve<F>(&self, prompt: F) -> Result<SecretString>
    where
        F: FnOnce() -> Result<String>,
    {
        if let Some(token) = self.lookup()? {
            return Ok(token);
        }

        debug!("No stored token, prompting");
        validate(&prompt()?)
    }
}

/// Checks that a token is non-empty and plausibly long.
///
/// # Errors
///
/// Returns [`Error::InvalidCredential`] for blank or too-short input.
pub fn validate(token: &str) -> Result<SecretString> {
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::InvalidCredential {
            reason: "token cannot be empty".into(),
        });
    }
    if token.len() < MIN_TOKEN_LEN {
        return Err(Error::InvalidCredential {
            reason: format!("token is shorter than {MIN_TOKEN_LEN} characters"),
        });
    }
    Ok(SecretString::from(token.to_string()))
}

/// Reads a token file. A missing or blank file yields `None`.
fn read_token_file(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let token = contents.trim();
            Ok((!token.is_empty()).then(|| token.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(Error::ReadCredential {
            path: path.to_path_buf(),
            source,
        }),
    }
}
