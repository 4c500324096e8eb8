use std::path::PathBuf;

use alloy::primitives::Address;
use clap::Parser;

use crate::data::types::Contracts;

#[derive(Parser, Debug)]
#[command(name = "hotel-tui", about = "Browse, book and review hotel rooms on-chain")]
pub struct Config {
    /// RPC endpoint URL (http://)
    #[arg(short, long, env = "HOTEL_RPC_URL", default_value = "http://127.0.0.1:8545")]
    pub rpc_url: String,

    /// Hex private key used to sign transactions. Omit for read-only browsing.
    #[arg(long, env = "HOTEL_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Hotel booking contract address
    #[arg(
        long,
        env = "HOTEL_BOOKING_ADDRESS",
        default_value = "0x397e12962a9dCed668FD5b7B2bfAfE585bdad323"
    )]
    pub booking_address: Address,

    /// Payment token contract address
    #[arg(
        long,
        env = "HOTEL_TOKEN_ADDRESS",
        default_value = "0x7F5c43e497d7F3392e7114809856Ac2fCc9454A6"
    )]
    pub token_address: Address,

    /// Block explorer base URL for transaction links
    #[arg(
        long,
        env = "HOTEL_EXPLORER_URL",
        default_value = "https://explorer-testnet.morphl2.io"
    )]
    pub explorer_url: String,

    /// Tick rate in milliseconds for UI refresh
    #[arg(long, default_value = "100")]
    pub tick_rate_ms: u64,

    /// Receipt polling interval in milliseconds
    #[arg(long, default_value = "2000")]
    pub poll_interval_ms: u64,

    /// Give up waiting for a receipt after this many seconds
    #[arg(long, default_value = "180")]
    pub receipt_timeout_secs: u64,

    /// Log file path (defaults to the user data directory)
    #[arg(long, env = "HOTEL_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "HOTEL_LOG_LEVEL", default_value = "info")]
    pub log_level: tracing::Level,

    /// Directory CSV exports are written to
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,
}

impl Config {
    pub fn contracts(&self) -> Contracts {
        Contracts {
            booking: self.booking_address,
            token: self.token_address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["hotel-tui"]);
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.log_level, tracing::Level::INFO);
        assert_eq!(
            config.contracts().booking,
            "0x397e12962a9dCed668FD5b7B2bfAfE585bdad323"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn test_overrides() {
        let config = Config::parse_from([
            "hotel-tui",
            "--rpc-url",
            "https://rpc.example",
            "--log-level",
            "debug",
            "--receipt-timeout-secs",
            "30",
        ]);
        assert_eq!(config.rpc_url, "https://rpc.example");
        assert_eq!(config.log_level, tracing::Level::DEBUG);
        assert_eq!(config.receipt_timeout_secs, 30);
    }

    #[test]
    fn test_bad_address_rejected() {
        let result = Config::try_parse_from(["hotel-tui", "--booking-address", "0x1234"]);
        assert!(result.is_err());
    }
}
