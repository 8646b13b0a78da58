use super::{prices, ui};
use crate::core::allocation::{share_percentage, split_thousands, total_value};
use crate::core::analytics::BitcoinPosition;
use crate::core::config::HoldingsConfig;
use crate::core::report::{CashSection, GoldSection, PortfolioReport};
use crate::core::ValuationError;
use crate::tracker::{MarketSnapshot, Tracker};
use anyhow::Result;
use clap::ValueEnum;
use comfy_table::{Cell, CellAlignment};

/// Which parts of the portfolio to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ViewMode {
    #[default]
    All,
    Gold,
    Bitcoin,
    Cash,
}

impl ViewMode {
    fn shows(&self, section: ViewMode) -> bool {
        *self == ViewMode::All || *self == section
    }
}

fn section_title(title: &str) -> String {
    format!("{}\n\n", ui::style_text(title, ui::StyleType::Title))
}

fn error_text(err: &ValuationError) -> String {
    ui::style_text(&err.to_string(), ui::StyleType::Error)
}

fn gold_section(gold: &Result<GoldSection, ValuationError>) -> String {
    let mut output = section_title("Gold holdings");
    let gold = match gold {
        Ok(gold) => gold,
        Err(e) => {
            output.push_str(&error_text(e));
            return output;
        }
    };

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Seller"),
        ui::header_cell("Amount"),
        ui::header_cell("Buy price"),
        ui::header_cell("Current value"),
        ui::header_cell("Profit"),
        ui::header_cell("Profit (%)"),
    ]);

    for value in &gold.values {
        table.add_row(vec![
            Cell::new(&value.holding.seller),
            Cell::new(value.holding.amount).set_alignment(CellAlignment::Right),
            ui::currency_cell(value.holding.buy_price),
            ui::currency_cell(value.current_value),
            ui::profit_cell(value.profit),
            ui::change_cell(value.profit_percentage()),
        ]);
    }

    let totals = &gold.totals;
    table.add_row(vec![
        Cell::new(ui::style_text("Total", ui::StyleType::TotalLabel)),
        Cell::new(totals.total_amount).set_alignment(CellAlignment::Right),
        ui::currency_cell(totals.total_buy_price),
        ui::currency_cell(totals.total_current_value),
        ui::profit_cell(totals.total_profit),
        ui::change_cell(totals.total_profit_percentage),
    ]);

    output.push_str(&table.to_string());
    output
}

fn bitcoin_section(position: Option<&BitcoinPosition>, snapshot: &MarketSnapshot) -> String {
    let mut output = section_title("Bitcoin");
    output.push_str(&prices::bitcoin_line(snapshot.bitcoin_price.as_ref()));
    output.push_str("\n\n");

    let Some(position) = position else {
        output.push_str(&ui::style_text("No bitcoin position", ui::StyleType::Subtle));
        return output;
    };

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Amount"),
        ui::header_cell("Fund value"),
        ui::header_cell("Market value"),
        ui::header_cell("Profit"),
        ui::header_cell("Profit (%)"),
    ]);
    table.add_row(vec![
        Cell::new(position.amount).set_alignment(CellAlignment::Right),
        ui::currency_cell(position.fund_value),
        ui::currency_cell(position.market_value),
        ui::profit_cell(position.profit),
        ui::change_cell(position.profit_percentage()),
    ]);

    output.push_str(&table.to_string());
    output
}

fn cash_section(cash: &Result<CashSection, ValuationError>) -> String {
    let mut output = section_title("Cash (millions)");
    let cash = match cash {
        Ok(cash) => cash,
        Err(e) => {
            output.push_str(&error_text(e));
            return output;
        }
    };

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Amount"), ui::header_cell("Comment")]);
    for entry in &cash.entries {
        table.add_row(vec![
            Cell::new(entry.amount).set_alignment(CellAlignment::Right),
            Cell::new(entry.comment.as_deref().unwrap_or("")),
        ]);
    }
    table.add_row(vec![
        Cell::new(cash.total).set_alignment(CellAlignment::Right),
        Cell::new(ui::style_text("Total", ui::StyleType::TotalLabel)),
    ]);

    output.push_str(&table.to_string());
    output
}

fn allocation_section(report: &PortfolioReport) -> String {
    let mut output = section_title("Allocation (thousands)");
    let total = total_value(&report.allocation);

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Asset"),
        ui::header_cell("Value"),
        ui::header_cell("Share (%)"),
    ]);
    for entry in report.allocation.iter().filter(|e| e.value > 0.0) {
        let (name, emoji) = entry.category.display_info();
        table.add_row(vec![
            Cell::new(format!("{emoji} {name}")),
            ui::currency_cell(entry.value),
            Cell::new(format!("{:.2}%", share_percentage(entry, total)))
                .set_alignment(CellAlignment::Right),
        ]);
    }
    output.push_str(&table.to_string());

    let (millions, thousands) = split_thousands(total);
    output.push_str(&format!(
        "\n\nTotal: {} ({})",
        ui::style_text(&ui::format_currency(total), ui::StyleType::TotalValue),
        ui::style_text(
            &format!("{millions} million {thousands} thousand"),
            ui::StyleType::Subtle
        )
    ));
    output
}

/// Renders the sections selected by `view`.
pub fn render(report: &PortfolioReport, snapshot: &MarketSnapshot, view: ViewMode) -> String {
    let mut sections = Vec::new();

    if view.shows(ViewMode::Gold) {
        sections.push(format!(
            "{}{}",
            section_title("Gold prices (thousands)"),
            prices::gold_price_table(&snapshot.gold_prices)
        ));
        sections.push(gold_section(&report.gold));
    }
    if view.shows(ViewMode::Bitcoin) {
        sections.push(bitcoin_section(report.bitcoin.as_ref(), snapshot));
    }
    if view.shows(ViewMode::Cash) {
        sections.push(cash_section(&report.cash));
    }
    if view == ViewMode::All {
        sections.push(allocation_section(report));
    }

    sections.join("\n\n")
}

pub fn evaluate_and_render(
    holdings: &HoldingsConfig,
    snapshot: &MarketSnapshot,
    view: ViewMode,
) -> String {
    let report = PortfolioReport::evaluate(
        holdings,
        &snapshot.gold_prices,
        snapshot.bitcoin_price.as_ref(),
    );
    render(&report, snapshot, view)
}

pub async fn run(tracker: &Tracker, holdings: &HoldingsConfig, view: ViewMode) -> Result<()> {
    let pb = ui::new_spinner("Fetching prices...");
    let snapshot = tracker.refresh().await;
    pb.finish_and_clear();

    println!("{}", evaluate_and_render(holdings, &snapshot, view));
    Ok(())
}
