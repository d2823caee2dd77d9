//! Gateway settings for the command line client.
//!
//! Every option falls back to an environment variable, and a `.env` file in
//! the working directory is loaded before arguments are parsed.
//!
//! # Environment Variables
//!
//! - `TBANK_KASSA_TERMINAL_KEY` - Terminal key issued by the bank
//! - `TBANK_KASSA_PASSWORD` - Terminal password used for signing
//! - `TBANK_KASSA_TEST` - Use the test gateway (`true` / `false`)
//! - `TBANK_KASSA_BASE_URL` - Override the gateway base URL
//! - `TBANK_KASSA_TIMEOUT_SECS` - Request timeout in seconds
//! - `RUST_LOG` - Log level filter (default: `info`)

use std::fmt;
use std::time::Duration;

use clap::Args;
use tkassa::{Credentials, Environment};
use tkassa_http::ClientConfig;

#[derive(Args)]
pub struct GatewayArgs {
    /// Terminal key issued by the bank.
    #[arg(long, global = true, env = "TBANK_KASSA_TERMINAL_KEY")]
    pub terminal_key: Option<String>,

    /// Terminal password used to sign requests.
    #[arg(long, global = true, env = "TBANK_KASSA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Send requests to the test gateway.
    #[arg(long, global = true, env = "TBANK_KASSA_TEST")]
    pub test: bool,

    /// Base URL overriding the environment's.
    #[arg(long, global = true, env = "TBANK_KASSA_BASE_URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true, env = "TBANK_KASSA_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for GatewayArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayArgs")
            .field("terminal_key", &self.terminal_key)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("test", &self.test)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// A required setting was neither passed nor found in the environment.
#[derive(Debug, thiserror::Error)]
#[error("{option} is required (or set {env})")]
pub struct MissingSetting {
    option: &'static str,
    env: &'static str,
}

impl GatewayArgs {
    pub const fn environment(&self) -> Environment {
        if self.test {
            Environment::Test
        } else {
            Environment::Prod
        }
    }

    /// Returns the terminal credentials.
    ///
    /// # Errors
    ///
    /// Returns [`MissingSetting`] if the key or password is not configured.
    pub fn credentials(&self) -> Result<Credentials, MissingSetting> {
        let terminal_key = self.terminal_key.as_deref().ok_or(MissingSetting {
            option: "--terminal-key",
            env: "TBANK_KASSA_TERMINAL_KEY",
        })?;
        let password = self.password.as_deref().ok_or(MissingSetting {
            option: "--password",
            env: "TBANK_KASSA_PASSWORD",
        })?;
        Ok(Credentials::new(terminal_key, password))
    }

    /// Builds the HTTP client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MissingSetting`] if the credentials are incomplete.
    pub fn client_config(&self) -> Result<ClientConfig, MissingSetting> {
        let mut config = ClientConfig::new(self.credentials()?).with_environment(self.environment());
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> GatewayArgs {
        GatewayArgs {
            terminal_key: Some("TestKey".to_owned()),
            password: Some("secret".to_owned()),
            test: true,
            base_url: None,
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn test_client_config() {
        let config = args().client_config().unwrap();
        assert_eq!(config.base_url(), tkassa::config::TEST_BASE_URL);

        let mut overridden = args();
        overridden.base_url = Some("http://localhost:8080/v2".to_owned());
        let config = overridden.client_config().unwrap();
        assert_eq!(config.base_url(), "http://localhost:8080/v2");
    }

    #[test]
    fn test_missing_password() {
        let mut incomplete = args();
        incomplete.password = None;
        let err = incomplete.credentials().unwrap_err();
        assert_eq!(err.to_string(), "--password is required (or set TBANK_KASSA_PASSWORD)");
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", args());
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret"));
    }
}
