use super::fetch::FetchError;
use serde_json::Value;

/// Fetches the ticker and reads the USD price of ether from its first entry.
pub async fn fetch_ether_price(
    client: &reqwest::Client,
    url: &str,
) -> Result<Option<f64>, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Api(format!("price service answered {status}")));
    }
    let payload: Value = response.json().await?;
    let price = parse_price_payload(&payload);
    if price.is_none() {
        log::debug!("price ticker at {url} returned no usable price_usd");
    }
    Ok(price)
}

/// `price_usd` of element 0, accepted as a numeric string or a number.
pub fn parse_price_payload(payload: &Value) -> Option<f64> {
    let price = match payload.get(0)?.get("price_usd")? {
        Value::String(raw) => raw.trim().parse::<f64>().ok()?,
        Value::Number(number) => number.as_f64()?,
        _ => return None,
    };
    (price.is_finite() && price > 0.0).then_some(price)
}
