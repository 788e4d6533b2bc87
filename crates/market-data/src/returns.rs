use crate::error::MarketDataError;
use crate::prices::{parse_date, PriceTable};
use crate::DATE_FORMAT;
use core_types::ReturnSeries;
use csv::{ReaderBuilder, Trim, Writer};
use nalgebra::DMatrix;
use std::fs::File;
use std::path::Path;

/// Daily log returns `ln(p_t / p_{t-1})`. The first date has no return and is
/// dropped.
pub fn compute_log_returns(prices: &PriceTable) -> Result<ReturnSeries, MarketDataError> {
    if prices.len() < 2 {
        return Err(MarketDataError::NotEnoughPrices(prices.len()));
    }

    let p = prices.prices();
    let values = DMatrix::from_fn(p.nrows() - 1, p.ncols(), |i, j| (p[(i + 1, j)] / p[(i, j)]).ln());
    let series = ReturnSeries::new(prices.dates()[1..].to_vec(), prices.assets().to_vec(), values)?;
    Ok(series)
}

/// Writes `returns` as `Date,<asset>,...` with full float precision.
pub fn write_returns_csv(returns: &ReturnSeries, path: &Path) -> Result<(), MarketDataError> {
    let file = File::create(path).map_err(|e| MarketDataError::io(path, e))?;
    let mut writer = Writer::from_writer(file);

    let mut header = vec!["Date".to_string()];
    header.extend(returns.assets().iter().cloned());
    writer.write_record(&header)?;

    for (i, date) in returns.dates().iter().enumerate() {
        let mut record = vec![date.format(DATE_FORMAT).to_string()];
        record.extend(returns.values().row(i).iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush().map_err(|e| MarketDataError::io(path, e))?;
    Ok(())
}

/// Reads a returns table written by `write_returns_csv`.
///
/// Unlike prices, returns are never cleaned: a missing or unparsable cell is an
/// error.
pub fn read_returns_csv(path: &Path) -> Result<ReturnSeries, MarketDataError> {
    let file = File::open(path).map_err(|e| MarketDataError::io(path, e))?;
    let mut reader = ReaderBuilder::new().has_headers(true).trim(Trim::All).from_reader(file);

    let headers = reader.headers()?.clone();
    let assets: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut dates = Vec::new();
    let mut flat = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        dates.push(parse_date(record.get(0).unwrap_or_default(), line)?);
        for (j, cell) in record.iter().skip(1).enumerate() {
            let value = cell.parse::<f64>().map_err(|_| MarketDataError::Malformed {
                line,
                message: format!("bad return '{}' for {}", cell, assets[j]),
            })?;
            flat.push(value);
        }
    }

    let values = DMatrix::from_row_slice(dates.len(), assets.len(), &flat);
    Ok(ReturnSeries::new(dates, assets, values)?)
}
