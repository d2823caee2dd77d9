#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP transport for the T-Bank (T-Kassa) acquiring API.
//!
//! Wraps [`reqwest`] to send signed requests built by [`tkassa`] and decode
//! the gateway's answers.
//!
//! ```no_run
//! use tkassa::proto::Init;
//! use tkassa::{Amount, Credentials, Environment};
//! use tkassa_http::{ClientConfig, TBankClient};
//!
//! # async fn run() -> Result<(), tkassa_http::ClientError> {
//! let config = ClientConfig::new(Credentials::new("TinkoffBankTest", "secret"))
//!     .with_environment(Environment::Test);
//! let client = TBankClient::try_new(config)?;
//! let payment = client
//!     .init(&Init::new(Amount::from_kopecks(19_200), "order-1"))
//!     .await?;
//! # let _ = payment;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`client`] - The gateway client and its configuration
//! - [`constants`] - Transport defaults
//! - [`error`] - Transport error types
//!
//! # Feature Flags
//!
//! - `telemetry` - Opens a `tracing` span per gateway call

pub mod client;
pub mod constants;
pub mod error;

pub use client::{ClientConfig, TBankClient};
pub use error::ClientError;
