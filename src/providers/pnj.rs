//! PNJ publishes a JSON list of products with prices already in thousands.

use crate::core::GoldPrice;
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

const PRODUCT_CODE: &str = "N24K";

#[derive(Debug, Deserialize)]
struct PnjResponse {
    #[serde(default)]
    data: Vec<PnjProduct>,
}

#[derive(Debug, Deserialize)]
struct PnjProduct {
    masp: String,
    giaban: Option<f64>,
    giamua: Option<f64>,
    #[serde(rename = "createDate")]
    create_date: Option<String>,
}

pub fn normalize(seller: &str, body: &str) -> Result<GoldPrice> {
    let response: PnjResponse = serde_json::from_str(body)
        .with_context(|| format!("Failed to parse PNJ response: '{body}'"))?;

    let product = response
        .data
        .into_iter()
        .find(|p| p.masp == PRODUCT_CODE)
        .ok_or_else(|| anyhow!("Gold price not found for product {}", PRODUCT_CODE))?;

    let (Some(sell), Some(buy)) = (product.giaban, product.giamua) else {
        return Err(anyhow!("Incomplete PNJ price for product {}", PRODUCT_CODE));
    };

    Ok(GoldPrice::new(
        seller,
        sell,
        buy,
        product
            .create_date
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
    ))
}
