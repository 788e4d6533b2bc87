use crate::error::MarketDataError;
use crate::repository::ensure_parent;
use crate::DATE_FORMAT;
use analytics::series::{cumulative_growth, drawdown_curve, rolling_volatility};
use analytics::PerformanceReport;
use chrono::NaiveDate;
use configuration::ReportSettings;
use csv::Writer;
use portfolio_backtester::{BacktestResult, StrategyTrack};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes a finished backtest into the report directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    rolling_vol_window: usize,
}

impl ReportWriter {
    pub fn new(settings: &ReportSettings) -> Self {
        Self {
            output_dir: settings.output_dir.clone(),
            rolling_vol_window: settings.rolling_vol_window,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes every table and returns the paths written, in write order.
    pub fn write_all(&self, result: &BacktestResult) -> Result<Vec<PathBuf>, MarketDataError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| MarketDataError::io(&self.output_dir, e))?;
        let mut written = Vec::new();

        written.push(self.write_metrics_csv(result)?);
        written.push(self.write_metrics_json(result)?);
        written.push(self.write_strategy_table(result, "returns.csv", |t| {
            t.returns.iter().map(|&r| Some(r)).collect()
        })?);
        written.push(self.write_strategy_table(result, "turnover.csv", |t| {
            t.turnover.iter().map(|&x| Some(x)).collect()
        })?);
        for track in &result.tracks {
            written.push(self.write_weights(result, track)?);
        }
        written.push(self.write_strategy_table(result, "cumulative.csv", |t| {
            cumulative_growth(&t.returns).into_iter().map(Some).collect()
        })?);
        written.push(self.write_strategy_table(result, "drawdowns.csv", |t| {
            drawdown_curve(&t.returns).into_iter().map(Some).collect()
        })?);

        let mut rolling = Vec::with_capacity(result.tracks.len());
        for track in &result.tracks {
            rolling.push(rolling_volatility(&track.returns, self.rolling_vol_window)?);
        }
        written.push(self.write_table("rolling_vol.csv", &result.dates, &strategy_headers(result), &rolling)?);

        written.push(self.write_vol_target_log(result)?);

        info!(dir = %self.output_dir.display(), files = written.len(), "Exported backtest report.");
        Ok(written)
    }

    fn write_metrics_csv(&self, result: &BacktestResult) -> Result<PathBuf, MarketDataError> {
        let path = self.output_dir.join("metrics.csv");
        let mut writer = create_writer(&path)?;

        let mut header = vec!["strategy"];
        header.extend(PerformanceReport::COLUMNS);
        writer.write_record(&header)?;
        for (strategy, report) in &result.metrics {
            let mut record = vec![strategy.as_str().to_string()];
            record.extend(report.values().iter().map(|v| v.to_string()));
            writer.write_record(&record)?;
        }
        writer.flush().map_err(|e| MarketDataError::io(&path, e))?;
        Ok(path)
    }

    fn write_metrics_json(&self, result: &BacktestResult) -> Result<PathBuf, MarketDataError> {
        let path = self.output_dir.join("metrics.json");
        let keyed: BTreeMap<&str, &PerformanceReport> =
            result.metrics.iter().map(|(id, report)| (id.as_str(), report)).collect();
        let json = serde_json::to_string_pretty(&keyed)?;
        fs::write(&path, json).map_err(|e| MarketDataError::io(&path, e))?;
        Ok(path)
    }

    fn write_weights(&self, result: &BacktestResult, track: &StrategyTrack) -> Result<PathBuf, MarketDataError> {
        let columns: Vec<Vec<Option<f64>>> = track
            .weights
            .column_iter()
            .map(|col| col.iter().map(|&w| Some(w)).collect())
            .collect();
        let name = format!("weights_{}.csv", track.strategy.as_str());
        self.write_table(&name, &result.dates, &result.assets, &columns)
    }

    fn write_vol_target_log(&self, result: &BacktestResult) -> Result<PathBuf, MarketDataError> {
        let path = self.output_dir.join("vol_target.csv");
        let mut writer = create_writer(&path)?;
        for record in &result.vol_target_log {
            writer.serialize(record)?;
        }
        writer.flush().map_err(|e| MarketDataError::io(&path, e))?;
        Ok(path)
    }

    /// One column per strategy, values derived from its track.
    fn write_strategy_table<F>(&self, result: &BacktestResult, name: &str, column: F) -> Result<PathBuf, MarketDataError>
    where
        F: Fn(&StrategyTrack) -> Vec<Option<f64>>,
    {
        let columns: Vec<Vec<Option<f64>>> = result.tracks.iter().map(column).collect();
        self.write_table(name, &result.dates, &strategy_headers(result), &columns)
    }

    /// Writes a `Date`-indexed table. `columns` is column-major and `None`
    /// becomes an empty cell.
    fn write_table(
        &self,
        name: &str,
        dates: &[NaiveDate],
        headers: &[String],
        columns: &[Vec<Option<f64>>],
    ) -> Result<PathBuf, MarketDataError> {
        let path = self.output_dir.join(name);
        let mut writer = create_writer(&path)?;

        let mut header = vec!["Date".to_string()];
        header.extend(headers.iter().cloned());
        writer.write_record(&header)?;

        for (i, date) in dates.iter().enumerate() {
            let mut record = vec![date.format(DATE_FORMAT).to_string()];
            record.extend(
                columns
                    .iter()
                    .map(|col| col.get(i).copied().flatten().map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }
        writer.flush().map_err(|e| MarketDataError::io(&path, e))?;
        Ok(path)
    }
}

fn strategy_headers(result: &BacktestResult) -> Vec<String> {
    result.strategies().map(|s| s.as_str().to_string()).collect()
}

fn create_writer(path: &Path) -> Result<Writer<File>, MarketDataError> {
    ensure_parent(path)?;
    let file = File::create(path).map_err(|e| MarketDataError::io(path, e))?;
    Ok(Writer::from_writer(file))
}
