//! Mi Hong quotes whole currency units; records keep whole thousands.

use crate::core::GoldPrice;
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

const GOLD_CODE: &str = "999";

#[derive(Debug, Deserialize)]
struct MiHongResponse {
    #[serde(default)]
    data: Vec<MiHongPrice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MiHongPrice {
    code: String,
    selling_price: Option<f64>,
    buying_price: Option<f64>,
    date_time: Option<String>,
}

fn to_thousands(value: f64) -> f64 {
    (value / 1000.0).floor()
}

pub fn normalize(seller: &str, body: &str) -> Result<GoldPrice> {
    let response: MiHongResponse = serde_json::from_str(body)
        .with_context(|| format!("Failed to parse Mi Hong response: '{body}'"))?;

    let price = response
        .data
        .into_iter()
        .find(|p| p.code == GOLD_CODE)
        .ok_or_else(|| anyhow!("Mi Hong price not found for code {}", GOLD_CODE))?;

    let (Some(sell), Some(buy)) = (price.selling_price, price.buying_price) else {
        return Err(anyhow!("Incomplete Mi Hong price for code {}", GOLD_CODE));
    };

    Ok(GoldPrice::new(
        seller,
        to_thousands(sell),
        to_thousands(buy),
        price
            .date_time
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
    ))
}
