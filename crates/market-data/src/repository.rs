use crate::error::MarketDataError;
use crate::prices::read_price_csv;
use crate::returns::{compute_log_returns, read_returns_csv, write_returns_csv};
use configuration::DataSettings;
use core_types::ReturnSeries;
use std::fs;
use std::path::Path;
use tracing::info;

/// The on-disk home of the return history: a price file plus a cached returns
/// file derived from it.
#[derive(Debug, Clone)]
pub struct ReturnRepository {
    settings: DataSettings,
}

impl ReturnRepository {
    pub fn new(settings: DataSettings) -> Self {
        Self { settings }
    }

    pub fn has_cache(&self) -> bool {
        self.settings.returns_path.is_file()
    }

    /// Returns the cached returns when present, otherwise builds them from the
    /// price file and caches the result. `force_refresh` always rebuilds.
    pub fn load_or_build(&self) -> Result<ReturnSeries, MarketDataError> {
        if self.has_cache() && !self.settings.force_refresh {
            let returns = self.load()?;
            info!(
                path = %self.settings.returns_path.display(),
                rows = returns.len(),
                "Using cached returns."
            );
            return Ok(returns);
        }

        let returns = self.build_from_prices()?;
        self.save(&returns)?;
        Ok(returns)
    }

    /// Reads the price file, keeps the configured tickers and date range, and
    /// converts to log returns.
    pub fn build_from_prices(&self) -> Result<ReturnSeries, MarketDataError> {
        let prices = read_price_csv(&self.settings.price_path, &self.settings.tickers)?
            .between(self.settings.start, self.settings.end);
        compute_log_returns(&prices)
    }

    pub fn load(&self) -> Result<ReturnSeries, MarketDataError> {
        read_returns_csv(&self.settings.returns_path)
    }

    pub fn save(&self, returns: &ReturnSeries) -> Result<(), MarketDataError> {
        let path = &self.settings.returns_path;
        ensure_parent(path)?;
        write_returns_csv(returns, path)?;
        info!(path = %path.display(), rows = returns.len(), "Cached returns.");
        Ok(())
    }
}

pub(crate) fn ensure_parent(path: &Path) -> Result<(), MarketDataError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| MarketDataError::io(parent, e))
        }
        _ => Ok(()),
    }
}
