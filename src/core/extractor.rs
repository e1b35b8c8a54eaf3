//! Turns the forecast page into [`ForecastRecord`]s.
//!
//! Each block matched by the block selector is one region. Its first row
//! names the region, its last row is the summary text and every row with
//! exactly two cells is a measurement. A single bad measurement value fails
//! the whole document so a half-parsed page is never cached.

use crate::domain::model::{ForecastRecord, Measurement, Snapshot};
use crate::utils::error::{PollenError, Result};
use crate::utils::validation::validate_selector;
use scraper::{ElementRef, Html, Selector};

pub const DEFAULT_BLOCK_SELECTOR: &str = "div.tx-dmi-data-store table table";

/// Marks a pollen type the upstream did not report.
const PLACEHOLDER: &str = "-";

enum RowOutcome {
    Measurement(Measurement),
    Skipped,
}

#[derive(Debug, Clone)]
pub struct ForecastExtractor {
    block_selector: String,
}

impl ForecastExtractor {
    pub fn new(block_selector: impl Into<String>) -> Result<Self> {
        let block_selector = block_selector.into();
        validate_selector("block_selector", &block_selector)?;
        Ok(Self { block_selector })
    }

    pub fn block_selector(&self) -> &str {
        &self.block_selector
    }

    pub fn extract(&self, markup: &str) -> Result<Snapshot> {
        let document = Html::parse_document(markup);
        let blocks = compile(&self.block_selector)?;
        let rows = compile("tr")?;
        let cells = compile("td")?;

        let records = document
            .select(&blocks)
            .map(|block| extract_record(block, &rows, &cells))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(records = records.len(), "Extracted forecast blocks");
        Ok(Snapshot::new(records))
    }
}

impl Default for ForecastExtractor {
    fn default() -> Self {
        Self {
            block_selector: DEFAULT_BLOCK_SELECTOR.to_string(),
        }
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| PollenError::ConfigError {
        message: format!("invalid selector {:?}: {:?}", selector, e),
    })
}

fn extract_record(block: ElementRef<'_>, rows: &Selector, cells: &Selector) -> Result<ForecastRecord> {
    let block_rows: Vec<ElementRef<'_>> = block.select(rows).collect();

    // Blocks without rows are kept with empty strings rather than rejected.
    let location_name = block_rows.first().map(text_of).unwrap_or_default();
    let summary_text = block_rows.last().map(text_of).unwrap_or_default();

    let mut measurements = Vec::new();
    for row in &block_rows {
        if let RowOutcome::Measurement(measurement) = classify_row(row, cells)? {
            measurements.push(measurement);
        }
    }

    Ok(ForecastRecord {
        location_name,
        summary_text,
        measurements,
    })
}

fn classify_row(row: &ElementRef<'_>, cells: &Selector) -> Result<RowOutcome> {
    let row_cells: Vec<ElementRef<'_>> = row.select(cells).collect();
    let [name_cell, value_cell] = row_cells.as_slice() else {
        return Ok(RowOutcome::Skipped);
    };

    let value = parse_value(&text_of(value_cell))?;
    Ok(RowOutcome::Measurement(Measurement {
        name: text_of(name_cell),
        value,
    }))
}

fn parse_value(raw: &str) -> Result<i64> {
    if raw == PLACEHOLDER {
        return Ok(0);
    }
    raw.parse::<i64>().map_err(|source| PollenError::ParseError {
        value: raw.to_string(),
        source,
    })
}

fn text_of(element: &ElementRef<'_>) -> String {
    element.text().collect()
}
