//! Terminal credentials and gateway environments.
//!
//! A merchant terminal is identified by a `TerminalKey` and authenticated by
//! a password that never leaves the process: it only feeds the request
//! [`token`](crate::token).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Base URL of the test gateway.
pub const TEST_BASE_URL: &str = "https://rest-api-test.tinkoff.ru/v2";

/// Base URL of the production gateway.
pub const PROD_BASE_URL: &str = "https://securepay.tinkoff.ru/v2";

/// Gateway environment a terminal is registered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Sandbox gateway; no money moves.
    Test,
    /// Live gateway.
    #[default]
    Prod,
}

impl Environment {
    /// Returns the API base URL (without a trailing slash).
    #[must_use]
    pub const fn base_url(&self) -> &'static str {
        match self {
            Self::Test => TEST_BASE_URL,
            Self::Prod => PROD_BASE_URL,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Test => f.write_str("test"),
            Self::Prod => f.write_str("prod"),
        }
    }
}

/// Error returned when parsing an unknown environment name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown environment '{0}', expected 'test' or 'prod'")]
pub struct UnknownEnvironment(pub String);

impl FromStr for Environment {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" => Ok(Self::Test),
            "prod" | "production" => Ok(Self::Prod),
            other => Err(UnknownEnvironment(other.to_owned())),
        }
    }
}

/// Terminal key and password issued by the bank for one terminal.
///
/// The password is redacted from the [`Debug`] output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    terminal_key: String,
    password: String,
}

impl Credentials {
    /// Creates credentials from a terminal key and its password.
    #[must_use]
    pub fn new(terminal_key: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            terminal_key: terminal_key.into(),
            password: password.into(),
        }
    }

    /// Returns the terminal key.
    #[must_use]
    pub fn terminal_key(&self) -> &str {
        &self.terminal_key
    }

    /// Returns the terminal password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("terminal_key", &self.terminal_key)
            .field("password", &"<redacted>")
            .finish()
    }
}
