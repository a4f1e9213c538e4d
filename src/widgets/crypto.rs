//! Crypto price widget backed by CoinGecko (free tier, no API key)

use std::time::Duration;

use serde_json::{json, Value};

use crate::cache::ResponseCache;

const CRYPTO_TTL: Duration = Duration::from_secs(120);
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Coins shown in the main widget.
pub const DEFAULT_COINS: &[&str] = &["bitcoin", "ethereum"];

/// Coins shown in the scrolling ticker bar.
pub const BAR_COINS: &[&str] = &[
    "bitcoin",
    "ethereum",
    "solana",
    "ripple",
    "cardano",
    "dogecoin",
    "polkadot",
    "avalanche-2",
];

pub async fn fetch(
    client: &reqwest::Client,
    cache: &ResponseCache<Value>,
    coins: &[&str],
) -> Option<Value> {
    let ids = coins.join(",");
    let cache_key = format!("crypto_{ids}");
    let client = client.clone();
    let coins: Vec<String> = coins.iter().map(|c| c.to_string()).collect();

    cache
        .get_or_fetch(&cache_key, CRYPTO_TTL, || async move {
            let url = format!(
                "https://api.coingecko.com/api/v3/simple/price\
                 ?ids={ids}&vs_currencies=usd&include_24hr_change=true"
            );
            let resp = client
                .get(&url)
                .timeout(FETCH_TIMEOUT)
                .send()
                .await?
                .error_for_status()?;
            let data: Value = resp.json().await?;

            let prices: Vec<Value> = coins
                .iter()
                .filter_map(|coin| {
                    let entry = data.get(coin)?;
                    Some(json!({
                        "id": coin,
                        "name": capitalize(coin),
                        "price": entry.get("usd").cloned().unwrap_or(json!(0)),
                        "change_24h": round2(entry.get("usd_24h_change").and_then(Value::as_f64).unwrap_or(0.0)),
                    }))
                })
                .collect();
            Ok(Value::Array(prices))
        })
        .await
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("bitcoin"), "Bitcoin");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(-0.005), -0.01);
    }
}
