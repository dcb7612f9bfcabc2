use alloy::primitives::{U256, utils::format_ether};

const DISPLAY_DECIMALS: usize = 6;

pub fn short_hex(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.len() <= 10 || !trimmed.is_ascii() {
        return trimmed.to_string();
    }
    let prefix_len = 6.min(trimmed.len());
    let suffix_len = 4.min(trimmed.len().saturating_sub(prefix_len));
    let prefix = &trimmed[..prefix_len];
    let suffix = &trimmed[trimmed.len() - suffix_len..];
    format!("{}...{}", prefix, suffix)
}

/// Exact decimal rendering of a wei amount, truncated to six decimals.
pub fn display_ether(wei: u128) -> String {
    let full = format_ether(U256::from(wei));
    let truncated = match full.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = &fraction[..DISPLAY_DECIMALS.min(fraction.len())];
            format!("{whole}.{fraction}")
        }
        None => full,
    };
    trim_decimal(truncated)
}

pub fn display_amount(value: f64) -> String {
    trim_decimal(format!("{value:.prec$}", prec = DISPLAY_DECIMALS))
}

pub fn display_usd(value: f64) -> String {
    format!("${value:.2}")
}

fn trim_decimal(value: String) -> String {
    if !value.contains('.') {
        return value;
    }
    value.trim_end_matches('0').trim_end_matches('.').to_string()
}
