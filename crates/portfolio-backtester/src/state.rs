use core_types::StrategyId;
use nalgebra::DVector;

/// What one strategy did on one simulated day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayOutcome {
    /// Net return after transaction costs.
    pub net_return: f64,
    /// L1 distance between the new and previous weights; 0 off rebalance days.
    pub turnover: f64,
}

/// The weights a strategy currently holds.
///
/// Starts all-zero, so the first rebalance pays costs on the full position.
/// Only the simulator mutates it, once per day through `advance`.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyState {
    strategy: StrategyId,
    previous: DVector<f64>,
}

impl StrategyState {
    pub fn new(strategy: StrategyId, n_assets: usize) -> Self {
        Self {
            strategy,
            previous: DVector::zeros(n_assets),
        }
    }

    pub fn strategy(&self) -> StrategyId {
        self.strategy
    }

    pub fn weights(&self) -> &DVector<f64> {
        &self.previous
    }

    /// Moves the state through one day.
    ///
    /// `target` is `Some` only on rebalance days. `cost_rate` is the fractional
    /// cost per unit of turnover (`tc_bps / 10_000`).
    pub fn advance(
        &mut self,
        target: Option<DVector<f64>>,
        todays_returns: &DVector<f64>,
        cost_rate: f64,
    ) -> DayOutcome {
        let turnover = match target {
            Some(new_weights) => {
                let turnover = (&new_weights - &self.previous).lp_norm(1);
                self.previous = new_weights;
                turnover
            }
            None => 0.0,
        };

        let cost = cost_rate * turnover;
        DayOutcome {
            net_return: self.previous.dot(todays_returns) - cost,
            turnover,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_rebalance_pays_for_the_full_position() {
        let mut state = StrategyState::new(StrategyId::EqualWeight, 2);
        let today = DVector::from_vec(vec![0.01, 0.03]);
        let outcome = state.advance(Some(DVector::from_vec(vec![0.5, 0.5])), &today, 0.001);

        assert_relative_eq!(outcome.turnover, 1.0, epsilon = 1e-12);
        assert_relative_eq!(outcome.net_return, 0.02 - 0.001, epsilon = 1e-12);
    }

    #[test]
    fn test_new_state_holds_nothing() {
        let state = StrategyState::new(StrategyId::MeanVariance, 3);
        assert_eq!(state.strategy(), StrategyId::MeanVariance);
        assert_eq!(state.weights(), &DVector::zeros(3));
    }

    #[test]
    fn test_weights_carry_forward_without_cost() {
        let mut state = StrategyState::new(StrategyId::MinVariance, 2);
        let today = DVector::from_vec(vec![0.01, -0.01]);
        state.advance(Some(DVector::from_vec(vec![0.75, 0.25])), &today, 0.001);

        let outcome = state.advance(None, &today, 0.001);
        assert_eq!(outcome.turnover, 0.0);
        assert_relative_eq!(outcome.net_return, 0.005, epsilon = 1e-12);
        assert_eq!(state.weights(), &DVector::from_vec(vec![0.75, 0.25]));
    }

    #[test]
    fn test_unchanged_target_is_free() {
        let mut state = StrategyState::new(StrategyId::RiskParity, 2);
        let w = DVector::from_vec(vec![0.6, 0.4]);
        let today = DVector::zeros(2);
        state.advance(Some(w.clone()), &today, 0.01);
        let outcome = state.advance(Some(w), &today, 0.01);
        assert_eq!(outcome.turnover, 0.0);
        assert_eq!(outcome.net_return, 0.0);
    }
}
