//! DOJI publishes an XML price board. Each product is a `Row` element whose
//! `Sell`/`Buy` attributes hold comma-grouped prices in thousands.

use crate::core::GoldPrice;
use anyhow::{Context, Result, anyhow};
use roxmltree::Document;

const PRODUCT_NAME: &str = "Nhẫn Tròn 9999";

fn parse_grouped(value: &str) -> Result<f64> {
    value
        .replace(',', "")
        .trim()
        .parse::<i64>()
        .map(|v| v as f64)
        .map_err(|e| anyhow!("Invalid DOJI price '{}': {}", value, e))
}

pub fn normalize(seller: &str, body: &str) -> Result<GoldPrice> {
    let doc = Document::parse(body).context("Failed to parse DOJI price board")?;

    let row = doc
        .descendants()
        .filter(|node| node.has_tag_name("Row"))
        .find(|node| {
            node.attribute("Name")
                .is_some_and(|name| name.contains(PRODUCT_NAME))
        })
        .ok_or_else(|| anyhow!("DOJI price not found for product {}", PRODUCT_NAME))?;

    let sell = parse_grouped(row.attribute("Sell").unwrap_or("0"))?;
    let buy = parse_grouped(row.attribute("Buy").unwrap_or("0"))?;

    let updated_at = doc
        .descendants()
        .find(|node| node.has_tag_name("DateTime"))
        .and_then(|node| node.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

    Ok(GoldPrice::new(seller, sell, buy, updated_at))
}
