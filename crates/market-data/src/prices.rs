use crate::error::MarketDataError;
use crate::DATE_FORMAT;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use nalgebra::DMatrix;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Clean adjusted close prices: every value finite and strictly positive, rows
/// sorted by date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    prices: DMatrix<f64>,
}

impl PriceTable {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Rows = dates, columns = assets.
    pub fn prices(&self) -> &DMatrix<f64> {
        &self.prices
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Keeps the rows with `start <= date < end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> PriceTable {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| self.dates[i] >= start && self.dates[i] < end)
            .collect();
        PriceTable {
            dates: keep.iter().map(|&i| self.dates[i]).collect(),
            assets: self.assets.clone(),
            prices: self.prices.select_rows(keep.iter()),
        }
    }
}

/// Reads a wide price CSV (`Date,<asset>,...`) from `path`.
///
/// See `parse_price_csv` for the cleaning rules.
pub fn read_price_csv(path: &Path, tickers: &[String]) -> Result<PriceTable, MarketDataError> {
    let file = File::open(path).map_err(|e| MarketDataError::io(path, e))?;
    let table = parse_price_csv(file, tickers)?;
    info!(
        path = %path.display(),
        rows = table.len(),
        assets = table.assets().len(),
        "Loaded price table."
    );
    Ok(table)
}

/// Parses a wide price CSV.
///
/// Only the `tickers` columns are kept, in the order given (all columns when
/// `tickers` is empty). A row with any missing, unparsable or non-positive
/// price among the kept columns is dropped with a warning.
pub fn parse_price_csv<R: Read>(reader: R, tickers: &[String]) -> Result<PriceTable, MarketDataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let columns = select_columns(&headers, tickers)?;
    let assets: Vec<String> = columns.iter().map(|&c| headers[c].to_string()).collect();

    let mut rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
    let mut dropped = 0usize;
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let date = parse_date(record.get(0).unwrap_or_default(), line)?;

        let prices: Option<Vec<f64>> = columns
            .iter()
            .map(|&c| parse_price(record.get(c).unwrap_or_default()))
            .collect();
        match prices {
            Some(prices) => rows.push((date, prices)),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(dropped, kept = rows.len(), "Dropped price rows with missing or non-positive values.");
    }

    rows.sort_by_key(|(date, _)| *date);
    let flat: Vec<f64> = rows.iter().flat_map(|(_, p)| p.iter().copied()).collect();
    Ok(PriceTable {
        prices: DMatrix::from_row_slice(rows.len(), assets.len(), &flat),
        dates: rows.into_iter().map(|(date, _)| date).collect(),
        assets,
    })
}

/// Indices of the asset columns to keep. Column 0 is the date index.
fn select_columns(headers: &StringRecord, tickers: &[String]) -> Result<Vec<usize>, MarketDataError> {
    if headers.len() < 2 {
        return Err(MarketDataError::Malformed {
            line: 1,
            message: "expected a date column followed by at least one asset column".to_string(),
        });
    }
    if tickers.is_empty() {
        return Ok((1..headers.len()).collect());
    }

    let mut columns = Vec::with_capacity(tickers.len());
    let mut missing = Vec::new();
    for ticker in tickers {
        match headers.iter().skip(1).position(|h| h == ticker) {
            Some(pos) => columns.push(pos + 1),
            None => missing.push(ticker.clone()),
        }
    }
    if !missing.is_empty() {
        return Err(MarketDataError::MissingTickers(missing));
    }
    Ok(columns)
}

/// Accepts `2024-01-31` as well as timestamps such as `2024-01-31 00:00:00`.
pub(crate) fn parse_date(raw: &str, line: u64) -> Result<NaiveDate, MarketDataError> {
    let day = raw.split(|c: char| c == ' ' || c == 'T').next().unwrap_or_default();
    NaiveDate::parse_from_str(day, DATE_FORMAT).map_err(|e| MarketDataError::Malformed {
        line,
        message: format!("bad date '{}': {}", raw, e),
    })
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|p| p.is_finite() && *p > 0.0)
}
