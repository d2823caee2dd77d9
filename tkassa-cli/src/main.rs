//! Command line client for the T-Bank (T-Kassa) acquiring API.
//!
//! # Usage
//!
//! ```bash
//! # Create a payment on the test gateway
//! TBANK_KASSA_TEST=true tkassa init --amount 120 --order-id order-1
//!
//! # Check its status
//! tkassa state --payment-id 13660
//!
//! # Verify a notification captured from the webhook
//! tkassa verify-notification notification.json
//!
//! # Configure logging level
//! RUST_LOG=debug tkassa state --payment-id 13660
//! ```
//!
//! Results are printed to stdout as pretty JSON; logs go to stderr. See
//! `config.rs` for the environment variables.

mod cli;
mod config;

use std::path::Path;

use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use tkassa::Receipt;
use tkassa::notification::Notification;
use tkassa::proto::{Cancel, Confirm, GetState, Init};
use tkassa::token::sign_request;
use tkassa_http::TBankClient;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, InitArgs};
use crate::config::GatewayArgs;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        tracing::error!("tkassa failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => {
            let request = build_init(args)?;
            let payment = connect(&cli.gateway)?.init(&request).await?;
            tracing::info!(payment_id = %payment.payment_id, status = ?payment.status, "Payment created");
            print_json(&payment)?;
        }
        Commands::State { payment_id } => {
            let state = connect(&cli.gateway)?
                .get_state(&GetState::new(payment_id))
                .await?;
            print_json(&state)?;
        }
        Commands::Confirm { payment_id, amount } => {
            let mut request = Confirm::new(payment_id);
            if let Some(amount) = amount {
                request = request.with_amount(amount);
            }
            let confirmation = connect(&cli.gateway)?.confirm(&request).await?;
            print_json(&confirmation)?;
        }
        Commands::Cancel {
            payment_id,
            amount,
            external_request_id,
        } => {
            let mut request = Cancel::new(payment_id);
            if let Some(amount) = amount {
                request = request.with_amount(amount);
            }
            if let Some(id) = external_request_id {
                request = request.with_external_request_id(id);
            }
            let cancellation = connect(&cli.gateway)?.cancel(&request).await?;
            print_json(&cancellation)?;
        }
        Commands::Sign { file } => {
            let request: Value = serde_json::from_slice(&read(&file)?)?;
            let body = sign_request(&request, &cli.gateway.credentials()?)?;
            print_json(&body)?;
        }
        Commands::VerifyNotification { file } => {
            let notification =
                Notification::from_slice(&read(&file)?, &cli.gateway.credentials()?)?;
            tracing::info!(order_id = %notification.order_id, "Notification token is valid");
            print_json(&notification)?;
        }
    }

    Ok(())
}

fn connect(gateway: &GatewayArgs) -> Result<TBankClient, Box<dyn std::error::Error>> {
    let config = gateway.client_config()?;
    tracing::info!(
        environment = %gateway.environment(),
        base_url = config.base_url(),
        "Loaded configuration"
    );
    Ok(TBankClient::try_new(config)?)
}

fn build_init(args: InitArgs) -> Result<Init, Box<dyn std::error::Error>> {
    let mut request = Init::new(args.amount, args.order_id);
    if let Some(description) = args.description {
        request = request.with_description(description);
    }
    if let Some(customer_key) = args.customer_key {
        request = request.with_customer_key(customer_key);
    }
    if args.recurrent {
        request = request.recurrent();
    }
    if let Some(pay_type) = args.pay_type {
        request = request.with_pay_type(pay_type.into());
    }
    if let Some(language) = args.language {
        request = request.with_language(language.into());
    }
    if let Some(url) = args.notification_url {
        request = request.with_notification_url(url);
    }
    if let Some(url) = args.success_url {
        request = request.with_success_url(url);
    }
    if let Some(url) = args.fail_url {
        request = request.with_fail_url(url);
    }
    if let Some(path) = args.receipt {
        let receipt: Receipt = serde_json::from_slice(&read(&path)?)?;
        tracing::debug!(version = %receipt.version(), "Loaded receipt");
        request = request.with_receipt(receipt);
    }
    Ok(request)
}

fn read(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    std::fs::read(path).map_err(|e| format!("failed to read {}: {e}", path.display()).into())
}

#[allow(clippy::print_stdout)]
fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
