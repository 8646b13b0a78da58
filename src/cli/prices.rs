use super::ui;
use crate::core::{BitcoinPrice, GoldPrice};
use crate::tracker::{MarketSnapshot, Tracker};
use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn gold_price_table(prices: &[GoldPrice]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Seller"),
        ui::header_cell("Buy"),
        ui::header_cell("Sell"),
        ui::header_cell("Spread"),
        ui::header_cell("Updated"),
    ]);

    for price in prices {
        table.add_row(vec![
            Cell::new(&price.seller),
            ui::price_cell(price.buy_price, price.buy_diff),
            ui::price_cell(price.sell_price, price.sell_diff),
            ui::currency_cell(price.spread()),
            Cell::new(&price.updated_at),
        ]);
    }
    table
}

/// One-line bitcoin quote, e.g. `67250.12 USD (+250.00)`.
pub fn bitcoin_line(price: Option<&BitcoinPrice>) -> String {
    match price {
        Some(price) => format!(
            "{}: {:.2} USD ({:+.2})",
            ui::style_text("Bitcoin", ui::StyleType::TotalLabel),
            price.current_price,
            price.diff
        ),
        None => ui::style_text("Bitcoin price unavailable", ui::StyleType::Error),
    }
}

pub fn render(snapshot: &MarketSnapshot) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Gold prices (thousands)", ui::StyleType::Title)
    );

    if snapshot.gold_prices.is_empty() {
        output.push_str(&ui::style_text(
            "No gold prices available",
            ui::StyleType::Error,
        ));
    } else {
        output.push_str(&gold_price_table(&snapshot.gold_prices).to_string());
    }

    output.push_str("\n\n");
    output.push_str(&bitcoin_line(snapshot.bitcoin_price.as_ref()));
    output
}

pub async fn run(tracker: &Tracker) -> Result<()> {
    let pb = ui::new_spinner("Fetching prices...");
    let snapshot = tracker.refresh().await;
    pb.finish_and_clear();

    println!("{}", render(&snapshot));
    Ok(())
}
