use clap::Parser;
use color_eyre::{Result, eyre::eyre};
use std::{path::PathBuf, time::Duration};

pub const DEFAULT_PRICE_URL: &str = "https://api.coinmarketcap.com/v1/ticker/ethereum/";
pub const DEFAULT_BALANCE_URL: &str =
    "https://api.blockcypher.com/v1/eth/main/addrs/{address}/balance";
pub const ADDRESS_PLACEHOLDER: &str = "{address}";

/// Track Ethereum address balances and their USD value.
#[derive(Debug, Parser)]
#[command(name = "ethfolio", version, about)]
pub struct Cli {
    /// Route to open, e.g. "/addresses/0xabc 0xdef". Defaults to the last visited route.
    pub path: Option<String>,

    /// Price ticker endpoint returning a JSON array whose first entry has `price_usd`.
    #[arg(long, env = "ETHFOLIO_PRICE_URL", default_value = DEFAULT_PRICE_URL)]
    pub price_url: String,

    /// Balance endpoint template; `{address}` is replaced by each address.
    #[arg(long, env = "ETHFOLIO_BALANCE_URL", default_value = DEFAULT_BALANCE_URL)]
    pub balance_url: String,

    /// Seconds between automatic refreshes of the addresses view. 0 disables polling.
    #[arg(long, env = "ETHFOLIO_REFRESH_SECS", default_value_t = 60)]
    pub refresh_secs: u64,

    /// Directory holding the persisted route and the log file.
    #[arg(long, env = "ETHFOLIO_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub price_url: String,
    pub balance_url_template: String,
    pub refresh_interval: Option<Duration>,
    pub data_dir: PathBuf,
    pub initial_path: Option<String>,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        if !cli.balance_url.contains(ADDRESS_PLACEHOLDER) {
            return Err(eyre!(
                "balance URL \"{}\" must contain the {ADDRESS_PLACEHOLDER} placeholder",
                cli.balance_url
            ));
        }
        let data_dir = match cli.data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        let initial_path = cli
            .path
            .map(|path| path.trim_start().to_string())
            .filter(|path| !path.is_empty());

        Ok(Self {
            price_url: cli.price_url,
            balance_url_template: cli.balance_url,
            refresh_interval: (cli.refresh_secs > 0).then(|| Duration::from_secs(cli.refresh_secs)),
            data_dir,
            initial_path,
        })
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let mut root = dirs::data_local_dir()
        .unwrap_or(std::env::current_dir()?)
        .join("ethfolio");
    if cfg!(debug_assertions) {
        root = root.join("dev");
    }
    Ok(root)
}
