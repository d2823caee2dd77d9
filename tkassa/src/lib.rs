#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the T-Bank (T-Kassa) acquiring API.
//!
//! This crate holds everything needed to talk to the gateway except the HTTP
//! transport itself: typed request and response bodies, the request signer,
//! fiscal receipt payloads and notification verification. The transport lives
//! in `tkassa-http`.
//!
//! # Overview
//!
//! Every call to the gateway is a JSON `POST` to `{base}/{Method}` whose body
//! carries the merchant's `TerminalKey` and a `Token`. The token is a SHA-256
//! digest over the body's top-level scalar values, sorted by field name, with
//! the terminal password mixed in (see [`token`]). The gateway answers with a
//! JSON envelope whose `Success` flag decides whether the rest of the payload
//! is meaningful (see [`proto::GatewayResponse`]).
//!
//! # Modules
//!
//! - [`amount`] - Kopeck amounts and ruble conversion
//! - [`config`] - Terminal credentials and gateway environments
//! - [`error`] - Validation, amount and signing errors
//! - [`notification`] - Incoming status notifications and their verification
//! - [`proto`] - Wire types for gateway operations (`Init`, `GetState`, ...)
//! - [`receipt`] - 54-FZ receipts in FFD 1.05 and FFD 1.2 layouts
//! - [`shop`] - Marketplace split payments
//! - [`token`] - Request signing
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod amount;
pub mod config;
pub mod error;
pub mod notification;
pub mod proto;
pub mod receipt;
pub mod shop;
pub mod token;

pub use amount::Amount;
pub use config::{Credentials, Environment};
pub use error::{AmountError, SignError, ValidationError};
pub use proto::{FailureResponse, GatewayResponse, TokenRequest};
pub use receipt::Receipt;
pub use rust_decimal::Decimal;
