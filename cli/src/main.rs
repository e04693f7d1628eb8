//! Giftd command-line client.
//!
//! Checks and charges gift cards against the Giftd API. Credentials are read
//! from the command line or the environment.

use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgGroup, Args, Parser, Subcommand};
use giftd_sdk::client::config::DEFAULT_BASE_URL;
use giftd_sdk::{ClientConfig, GiftCard, GiftdClient};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "giftd", version, about = "Check and charge Giftd gift cards")]
struct Cli {
    /// Partner user id.
    #[arg(long, env = "GIFTD_USER_ID")]
    user_id: String,

    /// Partner API key used to sign requests.
    #[arg(long, env = "GIFTD_API_KEY", hide_env_values = true)]
    api_key: String,

    /// API base URL.
    #[arg(long, env = "GIFTD_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Connection timeout in milliseconds, 0 for none.
    #[arg(long, env = "GIFTD_TIMEOUT_MS", default_value_t = 0)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Look a card up by token or by the external id of a charge.
    Check(CheckArgs),
    /// Charge an amount from a card.
    Charge(ChargeArgs),
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("lookup")
        .required(true)
        .args(["token", "external_id"])
))]
struct CheckArgs {
    /// Card token.
    #[arg(long)]
    token: Option<String>,

    /// External id of a previous charge.
    #[arg(long)]
    external_id: Option<String>,

    /// Order total the card would be used on.
    #[arg(long)]
    amount_total: Option<Decimal>,

    /// IP address of the customer.
    #[arg(long)]
    client_ip: Option<String>,
}

#[derive(Debug, Args)]
struct ChargeArgs {
    /// Card token.
    #[arg(long)]
    token: String,

    /// Amount to charge.
    #[arg(long)]
    amount: Decimal,

    /// Order total.
    #[arg(long)]
    amount_total: Option<Decimal>,

    /// Partner-side id of the charge, e.g. an order number.
    #[arg(long)]
    external_id: Option<String>,

    /// Free-form comment stored with the charge.
    #[arg(long)]
    comment: Option<String>,

    /// IP address of the customer.
    #[arg(long)]
    client_ip: Option<String>,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.as_str()).with_timeout_ms(self.timeout_ms)
    }
}

fn print_card(card: &GiftCard) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(card).context("failed to encode gift card")?;
    println!("{}", json);
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = cli.client_config();
    tracing::debug!("Base URL: {}", config.base_url);

    let client = GiftdClient::new(cli.user_id.as_str(), cli.api_key.as_str(), config)
        .context("failed to create Giftd client")?;

    match cli.command {
        Command::Check(args) => {
            let card = client
                .check(
                    args.token.as_deref(),
                    args.external_id.as_deref(),
                    args.amount_total,
                    args.client_ip.as_deref(),
                )
                .await
                .context("gift card check failed")?;

            match card {
                Some(card) => {
                    tracing::info!("Found {}", card);
                    print_card(&card)?;
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("gift card not found");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Charge(args) => {
            let card = client
                .charge(
                    &args.token,
                    args.amount,
                    args.amount_total,
                    args.external_id.as_deref(),
                    args.comment.as_deref(),
                    args.client_ip.as_deref(),
                )
                .await
                .context("gift card charge failed")?;

            tracing::info!("Charged {} from {}", args.amount, card);
            print_card(&card)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,giftd=info,giftd_sdk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run(Cli::parse()).await
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::time::Duration;

    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let base = ["giftd", "--user-id", "42", "--api-key", "secret"];
        Cli::try_parse_from(base.iter().chain(args.iter()).copied())
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_by_token() {
        let cli = parse(&["check", "--token", "abc123", "--amount-total", "10.0"]).expect("parse");
        match cli.command {
            Command::Check(args) => {
                assert_eq!(args.token.as_deref(), Some("abc123"));
                assert!(args.external_id.is_none());
                assert_eq!(args.amount_total, Decimal::from_str("10.0").ok());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_check_requires_lookup_key() {
        assert!(parse(&["check"]).is_err());
        assert!(parse(&["check", "--token", "a", "--external-id", "b"]).is_err());
        assert!(parse(&["check", "--external-id", "order-17"]).is_ok());
    }

    #[test]
    fn test_parse_charge() {
        let cli = parse(&[
            "charge",
            "--token",
            "tok",
            "--amount",
            "3.00",
            "--comment",
            "web order",
        ])
        .expect("parse");
        match cli.command {
            Command::Charge(args) => {
                assert_eq!(args.token, "tok");
                assert_eq!(args.amount.to_string(), "3.00");
                assert_eq!(args.comment.as_deref(), Some("web order"));
                assert!(args.external_id.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_charge_rejects_bad_amount() {
        assert!(parse(&["charge", "--token", "tok", "--amount", "lots"]).is_err());
    }

    #[test]
    fn test_client_config_from_flags() {
        let cli = parse(&[
            "--base-url",
            "http://localhost:8080/v1",
            "--timeout-ms",
            "1500",
            "check",
            "--token",
            "abc",
        ])
        .expect("parse");
        let config = cli.client_config();
        assert_eq!(config.base_url, "http://localhost:8080/v1/");
        assert_eq!(config.connect_timeout, Some(Duration::from_millis(1500)));
    }
}
