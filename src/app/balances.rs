use super::fetch::FetchError;
use serde::Deserialize;

pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Balance lookup response. Only `final_balance` is required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BalanceRecord {
    #[serde(default)]
    pub address: Option<String>,
    /// Confirmed plus unconfirmed balance, in wei.
    pub final_balance: u128,
    #[serde(default)]
    pub n_tx: Option<u64>,
}

impl BalanceRecord {
    #[cfg(test)]
    pub fn from_wei(final_balance: u128) -> Self {
        Self {
            address: None,
            final_balance,
            n_tx: None,
        }
    }

    pub fn ether(&self) -> f64 {
        wei_to_ether(self.final_balance)
    }
}

pub fn wei_to_ether(wei: u128) -> f64 {
    let whole = wei / WEI_PER_ETHER;
    let fraction = wei % WEI_PER_ETHER;
    whole as f64 + fraction as f64 / WEI_PER_ETHER as f64
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

pub async fn fetch_balance(client: &reqwest::Client, url: &str) -> Result<BalanceRecord, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        if let Ok(api) = serde_json::from_slice::<ApiErrorBody>(&body) {
            return Err(FetchError::Api(api.error));
        }
        return Err(FetchError::Api(format!("balance service answered {status}")));
    }
    parse_balance_body(&body)
}

/// Parses straight from bytes so balances beyond `u64` keep full precision.
pub fn parse_balance_body(body: &[u8]) -> Result<BalanceRecord, FetchError> {
    match serde_json::from_slice::<BalanceRecord>(body) {
        Ok(record) => Ok(record),
        Err(err) => match serde_json::from_slice::<ApiErrorBody>(body) {
            Ok(api) => Err(FetchError::Api(api.error)),
            Err(_) => Err(FetchError::Parse(err)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::fetch::canned::serve_once;

    #[test]
    fn parses_blockcypher_response() {
        let body = br#"{
            "address": "738d145faabb1e00cf5a017588a9c0f998318012",
            "total_received": 9762206505909057760,
            "total_sent": 9742951942909057760,
            "balance": 19254563000000000,
            "unconfirmed_balance": 0,
            "final_balance": 19254563000000000,
            "n_tx": 704,
            "unconfirmed_n_tx": 0,
            "final_n_tx": 704
        }"#;
        let record = parse_balance_body(body).expect("valid record");
        assert_eq!(record.final_balance, 19_254_563_000_000_000);
        assert_eq!(record.n_tx, Some(704));
        assert_eq!(
            record.address.as_deref(),
            Some("738d145faabb1e00cf5a017588a9c0f998318012")
        );
    }

    #[test]
    fn keeps_balances_beyond_u64() {
        let body = br#"{ "final_balance": 123456789000000000000000 }"#;
        let record = parse_balance_body(body).expect("valid record");
        assert_eq!(record.final_balance, 123_456_789_000_000_000_000_000);
        assert!((record.ether() - 123_456.789).abs() < 1e-6);
    }

    #[test]
    fn error_body_becomes_api_error() {
        let body = br#"{ "error": "Unable to find address" }"#;
        match parse_balance_body(body) {
            Err(FetchError::Api(message)) => assert_eq!(message, "Unable to find address"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_final_balance_is_a_parse_error() {
        let body = br#"{ "balance": 10 }"#;
        assert!(matches!(parse_balance_body(body), Err(FetchError::Parse(_))));
    }

    #[test]
    fn converts_wei_to_ether() {
        assert_eq!(wei_to_ether(2_000_000_000_000_000_000), 2.0);
        assert_eq!(wei_to_ether(500_000_000_000_000_000), 0.5);
        assert_eq!(wei_to_ether(0), 0.0);
    }

    #[tokio::test]
    async fn fetches_record_from_service() {
        let url = serve_once("200 OK", r#"{ "address": "0xabc", "final_balance": 2000000000000000000, "n_tx": 3 }"#).await;
        let record = fetch_balance(&reqwest::Client::new(), &url)
            .await
            .expect("balance");
        assert_eq!(record.final_balance, 2_000_000_000_000_000_000);
        assert_eq!(record.n_tx, Some(3));
    }

    #[tokio::test]
    async fn error_body_on_failure_status_is_an_api_error() {
        let url = serve_once("404 Not Found", r#"{ "error": "Unable to find address" }"#).await;
        match fetch_balance(&reqwest::Client::new(), &url).await {
            Err(FetchError::Api(message)) => assert_eq!(message, "Unable to find address"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failure_status_without_error_body_reports_status() {
        let url = serve_once("500 Internal Server Error", "oops").await;
        match fetch_balance(&reqwest::Client::new(), &url).await {
            Err(FetchError::Api(message)) => {
                assert!(message.starts_with("balance service answered 500"), "{message}")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
