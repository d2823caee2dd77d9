//! Command line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tkassa::Amount;
use tkassa::proto::{Language, PaymentType};
use url::Url;

use crate::config::GatewayArgs;

#[derive(Parser, Debug)]
#[command(name = "tkassa", version, about = "T-Bank (T-Kassa) acquiring API client")]
pub struct Cli {
    #[command(flatten)]
    pub gateway: GatewayArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a payment and print the payment form URL.
    Init(InitArgs),
    /// Print the current status of a payment.
    State {
        #[arg(long)]
        payment_id: String,
    },
    /// Confirm a two-stage payment.
    Confirm {
        #[arg(long)]
        payment_id: String,
        /// Amount to confirm in rubles; the full amount when omitted.
        #[arg(long)]
        amount: Option<Amount>,
    },
    /// Cancel or refund a payment.
    Cancel {
        #[arg(long)]
        payment_id: String,
        /// Amount to cancel in rubles; the full amount when omitted.
        #[arg(long)]
        amount: Option<Amount>,
        #[arg(long)]
        external_request_id: Option<String>,
    },
    /// Print the signed body for a JSON request file without sending it.
    Sign {
        /// JSON object with the request fields.
        file: PathBuf,
    },
    /// Check the token of a notification saved as JSON.
    VerifyNotification {
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Amount in rubles, e.g. `120.50`.
    #[arg(long)]
    pub amount: Amount,
    #[arg(long)]
    pub order_id: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub customer_key: Option<String>,
    /// Register the payment as the parent of recurring charges.
    #[arg(long, requires = "customer_key")]
    pub recurrent: bool,
    #[arg(long, value_enum)]
    pub pay_type: Option<PayTypeArg>,
    #[arg(long, value_enum)]
    pub language: Option<LanguageArg>,
    #[arg(long, env = "TBANK_KASSA_NOTIFICATION_URL")]
    pub notification_url: Option<Url>,
    #[arg(long)]
    pub success_url: Option<Url>,
    #[arg(long)]
    pub fail_url: Option<Url>,
    /// JSON file with an FFD 1.05 or FFD 1.2 receipt.
    #[arg(long)]
    pub receipt: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PayTypeArg {
    /// One-stage: debit immediately.
    One,
    /// Two-stage: hold, then confirm.
    Two,
}

impl From<PayTypeArg> for PaymentType {
    fn from(arg: PayTypeArg) -> Self {
        match arg {
            PayTypeArg::One => Self::OneStage,
            PayTypeArg::Two => Self::TwoStage,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LanguageArg {
    Ru,
    En,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::Ru => Self::Ru,
            LanguageArg::En => Self::En,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREDENTIALS: [&str; 5] = ["tkassa", "--terminal-key", "TestKey", "--password", "secret"];

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(CREDENTIALS.iter().chain(args).copied())
    }

    #[test]
    fn test_parse_init() {
        let cli = parse(&[
            "init",
            "--amount",
            "120.50",
            "--order-id",
            "order-1",
            "--pay-type",
            "two",
            "--notification-url",
            "https://example.com/hook",
        ])
        .unwrap();
        let Commands::Init(init) = cli.command else {
            panic!("expected init");
        };
        assert_eq!(init.amount, Amount::from_kopecks(12_050));
        assert!(matches!(init.pay_type, Some(PayTypeArg::Two)));
        assert_eq!(init.notification_url.unwrap().host_str(), Some("example.com"));
    }

    #[test]
    fn test_recurrent_requires_customer_key() {
        assert!(parse(&["init", "--amount", "1", "--order-id", "o", "--recurrent"]).is_err());
        assert!(
            parse(&[
                "init",
                "--amount",
                "1",
                "--order-id",
                "o",
                "--recurrent",
                "--customer-key",
                "c"
            ])
            .is_ok()
        );
    }

    #[test]
    fn test_rejects_sub_kopeck_amount() {
        assert!(parse(&["confirm", "--payment-id", "1", "--amount", "1.001"]).is_err());
    }

    #[test]
    fn test_parse_offline_commands() {
        let cli = parse(&["verify-notification", "notification.json"]).unwrap();
        assert!(matches!(cli.command, Commands::VerifyNotification { .. }));
        let cli = parse(&["sign", "request.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Sign { .. }));
    }
}
