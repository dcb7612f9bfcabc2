use super::{balances, balances::BalanceRecord, prices};
use crate::config::Config;
use std::{fmt, time::Duration};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub enum FetchError {
    Http(reqwest::Error),
    Parse(serde_json::Error),
    Api(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Http(err) => write!(f, "network error: {err}"),
            FetchError::Parse(err) => write!(f, "response parse error: {err}"),
            FetchError::Api(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Http(err) => Some(err),
            FetchError::Parse(err) => Some(err),
            FetchError::Api(_) => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(value: reqwest::Error) -> Self {
        FetchError::Http(value)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(value: serde_json::Error) -> Self {
        FetchError::Parse(value)
    }
}

/// Shared HTTP client plus the two endpoints the addresses view polls.
#[derive(Debug, Clone)]
pub struct Services {
    client: reqwest::Client,
    price_url: String,
    balance_url_template: String,
}

impl Services {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ethfolio/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            price_url: config.price_url.clone(),
            balance_url_template: config.balance_url_template.clone(),
        })
    }

    /// `Ok(None)` when the ticker answered without a usable price.
    pub async fn fetch_price(&self) -> Result<Option<f64>, FetchError> {
        prices::fetch_ether_price(&self.client, &self.price_url).await
    }

    pub async fn fetch_balance(&self, address: &str) -> Result<BalanceRecord, FetchError> {
        let url = self
            .balance_url_template
            .replace(crate::config::ADDRESS_PLACEHOLDER, address);
        balances::fetch_balance(&self.client, &url).await
    }
}
