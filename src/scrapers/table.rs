//! Reads the area price table out of the R-TECH price popup.

use crate::money::{self, AmountError};
use crate::scrapers::types::AreaPrices;
use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use std::borrow::Cow;
use tracing::debug;

/// Blue price cells only render once the table has real data
pub const PRICE_CELL_SELECTOR: &str = "#areaList > tr > td.table_txt_blue";

const FIRST_ROW_SELECTOR: &str = "#areaList > tr:first-child";

// 1-based column positions within an area row
const SALE_LOWER_COLUMN: usize = 3;
const SALE_UPPER_COLUMN: usize = 4;
const RENT_LOWER_COLUMN: usize = 5;
const RENT_UPPER_COLUMN: usize = 6;

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector '{}': {}", css, e))
}

/// Whether the popup HTML already holds rendered price cells
pub fn has_price_table(html: &str) -> Result<bool> {
    let document = Html::parse_document(html);
    let selector = parse_selector(PRICE_CELL_SELECTOR)?;
    Ok(document.select(&selector).next().is_some())
}

/// Extract sale and rent averages from the first area row.
///
/// Missing rows or cells and unreadable amounts come back as `None`.
pub fn extract_area_prices(html: &str) -> Result<AreaPrices> {
    let document = Html::parse_document(html);
    let row_selector = parse_selector(FIRST_ROW_SELECTOR)?;

    let Some(row) = document.select(&row_selector).next() else {
        debug!("No area rows in price table");
        return Ok(AreaPrices::default());
    };

    let cells: Vec<String> = row
        .children()
        .filter_map(ElementRef::wrap)
        .map(|cell| cell.text().collect::<String>())
        .collect();
    debug!("First area row has {} cells", cells.len());

    let column = |n: usize| {
        cells
            .get(n - 1)
            .and_then(|text| parse_cell_amount(text))
    };

    Ok(AreaPrices {
        sale_lower_avg: column(SALE_LOWER_COLUMN),
        sale_upper_avg: column(SALE_UPPER_COLUMN),
        rent_lower_avg: column(RENT_LOWER_COLUMN),
        rent_upper_avg: column(RENT_UPPER_COLUMN),
    })
}

/// Read a price cell in won.
///
/// Cells normally hold bare 만원 numbers ("59,000"); some layouts print
/// unit words instead ("5억 9,000"), so both dialects are accepted. A bare
/// tail after 억 is counted in 만원, like the rest of the table.
pub fn parse_cell_amount(text: &str) -> Option<u64> {
    let parsed: Result<u64, AmountError> = if money::has_unit(text) {
        money::parse_marked_amount(&with_manwon_tail(text))
    } else {
        money::parse_bare_manwon_amount(text)
    };

    match parsed {
        Ok(won) => Some(won),
        Err(e) => {
            debug!(cell = text.trim(), error = %e, "Unreadable price cell");
            None
        }
    }
}

/// "5억 9,000" → "5억 9,000만"
fn with_manwon_tail(text: &str) -> Cow<'_, str> {
    let text = text.trim();
    if text.contains(money::MAN) {
        return Cow::Borrowed(text);
    }

    match text.split_once(money::EOK) {
        Some((_, tail)) if tail.chars().any(|c| c.is_ascii_digit()) => {
            Cow::Owned(format!("{}{}", text, money::MAN))
        }
        _ => Cow::Borrowed(text),
    }
}
