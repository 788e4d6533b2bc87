use core_types::RebalanceFrequency;

/// Decides which simulated days are rebalance days.
///
/// A day `i` is due once at least `step` days have passed since the last
/// rebalance. The last rebalance index starts at 0, so the first rebalance can
/// only happen on day `step` or later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebalanceSchedule {
    frequency: RebalanceFrequency,
    last_rebalance: usize,
}

impl RebalanceSchedule {
    pub fn new(frequency: RebalanceFrequency) -> Self {
        Self {
            frequency,
            last_rebalance: 0,
        }
    }

    /// Unknown labels fall back to monthly with a warning.
    pub fn from_label(label: &str) -> Self {
        Self::new(RebalanceFrequency::from_label_or_monthly(label))
    }

    pub fn frequency(&self) -> RebalanceFrequency {
        self.frequency
    }

    pub fn step(&self) -> usize {
        self.frequency.trading_days()
    }

    pub fn is_due(&self, day: usize) -> bool {
        day.saturating_sub(self.last_rebalance) >= self.step()
    }

    pub fn mark_rebalanced(&mut self, day: usize) {
        self.last_rebalance = day;
    }
}
