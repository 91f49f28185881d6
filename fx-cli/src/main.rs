//! FX CLI
//!
//! Command-line interface for the FX conversion API.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use fx_client::FxClient;
use fx_money::{FormatOptions, Locale};
use fx_types::{FormatRequest, FormatStyle, RoundingMode};

#[derive(Parser)]
#[command(name = "fx")]
#[command(author, version, about = "FX conversion API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the FX API
    #[arg(long, env = "FX_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Client identity used for rate limiting
    #[arg(long, env = "FX_CLIENT_ID")]
    client_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an amount between currencies
    Convert {
        /// Amount in major units (at most two decimals)
        amount: Decimal,
        /// Source currency code
        from: String,
        /// Target currency code
        to: String,
        #[arg(long, value_enum, default_value_t = Mode::Nearest)]
        mode: Mode,
    },
    /// Sanitize a user-typed amount
    Validate {
        value: String,
        #[arg(long)]
        allow_negative: bool,
        /// Validate locally instead of calling the API
        #[arg(long)]
        offline: bool,
    },
    /// Render an amount for display
    Format {
        amount: Decimal,
        /// Use K/M/B compact notation
        #[arg(long)]
        compact: bool,
        /// Locale tag (en-US, en-GB, en-IN, de-DE, fr-FR, vi-VN, ja-JP)
        #[arg(long, default_value = "en-US")]
        locale: String,
        /// Currency symbol for locale rendering
        #[arg(long)]
        symbol: Option<String>,
        /// Currency code appended by compact rendering
        #[arg(long)]
        code: Option<String>,
        #[arg(long, default_value_t = 2)]
        min_fraction_digits: u32,
        #[arg(long, default_value_t = 2)]
        max_fraction_digits: u32,
        #[arg(long, value_enum, default_value_t = Mode::Nearest)]
        mode: Mode,
        /// Format locally instead of calling the API
        #[arg(long)]
        offline: bool,
    },
    /// Round an amount to two decimals locally (no server call)
    Round {
        amount: Decimal,
        #[arg(long, value_enum, default_value_t = Mode::Nearest)]
        mode: Mode,
    },
    /// Currency registry
    Currency {
        #[command(subcommand)]
        action: CurrencyCommands,
    },
    /// Override rate administration
    Override {
        #[command(subcommand)]
        action: OverrideCommands,
    },
    /// Cached provider rates
    Rates {
        #[command(subcommand)]
        action: RatesCommands,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum CurrencyCommands {
    /// List registered codes
    List,
    /// Register a code
    Add {
        code: String,
        #[arg(long, default_value = "")]
        name: String,
    },
}

#[derive(Subcommand)]
enum OverrideCommands {
    /// List override rates
    List,
    /// Set `FROM_VALUE FROM = TO_VALUE TO`
    Set {
        from: String,
        to: String,
        #[arg(long)]
        to_value: Decimal,
        #[arg(long, default_value = "1")]
        from_value: Decimal,
    },
    /// Delete the override for an ordered pair
    Delete { from: String, to: String },
}

#[derive(Subcommand)]
enum RatesCommands {
    /// Show the cached table for a base currency
    Show { base: String },
    /// Drop the cached table for a base currency
    Invalidate { base: String },
    /// Cache state per base currency
    Status,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Up,
    Down,
    Nearest,
}

impl From<Mode> for RoundingMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Up => RoundingMode::Up,
            Mode::Down => RoundingMode::Down,
            Mode::Nearest => RoundingMode::Nearest,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = FxClient::new(&cli.api_url);
    if let Some(id) = cli.client_id {
        client = client.with_client_id(id);
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Convert {
            amount,
            from,
            to,
            mode,
        } => {
            let converted = client.convert(amount, &from, &to, mode.into()).await?;
            println!("{}", serde_json::to_string_pretty(&converted)?);
        }

        Commands::Validate {
            value,
            allow_negative,
            offline,
        } => {
            let normalized = if offline {
                fx_money::validate_amount_string(&value, allow_negative)?.into_string()
            } else {
                client
                    .validate_amount(&value, allow_negative)
                    .await?
                    .normalized
            };
            println!("{}", normalized);
        }

        Commands::Format {
            amount,
            compact,
            locale,
            symbol,
            code,
            min_fraction_digits,
            max_fraction_digits,
            mode,
            offline,
        } => {
            let req = FormatRequest {
                amount,
                style: if compact {
                    FormatStyle::Compact
                } else {
                    FormatStyle::Locale
                },
                options: FormatOptions {
                    locale: Locale::from(locale),
                    currency_symbol: symbol,
                    min_fraction_digits,
                    max_fraction_digits,
                    mode: mode.into(),
                },
                currency_code: code,
            };
            let formatted = if offline {
                match req.style {
                    FormatStyle::Locale => fx_money::format_locale(req.amount, &req.options),
                    FormatStyle::Compact => fx_money::format_compact(
                        req.amount,
                        req.currency_code.as_deref().unwrap_or_default(),
                        req.options.mode,
                    ),
                }
            } else {
                client.format_amount(&req).await?.formatted
            };
            println!("{}", formatted);
        }

        Commands::Round { amount, mode } => {
            println!("{}", fx_money::round(amount, mode.into()));
        }

        Commands::Currency { action } => match action {
            CurrencyCommands::List => {
                let codes = client.list_currencies().await?;
                println!("{}", codes.join("\n"));
            }
            CurrencyCommands::Add { code, name } => {
                let code = client.add_currency(&code, &name).await?;
                println!("✓ Registered {}", code);
            }
        },

        Commands::Override { action } => match action {
            OverrideCommands::List => {
                let overrides = client.list_overrides().await?;
                println!("{}", serde_json::to_string_pretty(&overrides)?);
            }
            OverrideCommands::Set {
                from,
                to,
                to_value,
                from_value,
            } => {
                let record = client
                    .upsert_override(&from, &to, from_value, to_value)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
            OverrideCommands::Delete { from, to } => {
                client.delete_override(&from, &to).await?;
                println!("✓ Override deleted");
            }
        },

        Commands::Rates { action } => match action {
            RatesCommands::Show { base } => {
                let table = client.rate_table(&base).await?;
                println!("{}", serde_json::to_string_pretty(&table)?);
            }
            RatesCommands::Invalidate { base } => {
                client.invalidate_rates(&base).await?;
                println!("✓ Cached rates for {} dropped", base.to_uppercase());
            }
            RatesCommands::Status => {
                let status = client.cache_status().await?;
                println!("{}", serde_json::to_string_pretty(&status)?);
            }
        },
    }

    Ok(())
}
