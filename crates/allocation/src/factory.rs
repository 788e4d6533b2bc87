use crate::error::AllocationError;
use crate::mean_variance::MeanVariance;
use crate::min_variance::MinVariance;
use crate::risk_parity::RiskParity;
use crate::solver::SolverOptions;
use crate::vol_target::VolTarget;
use crate::{Allocator, EqualWeight};
use configuration::{BacktestSettings, OptimizerSettings};
use core_types::StrategyId;

/// Creates a new allocator instance for `id` from the run's settings.
///
/// The match is exhaustive, so adding a `StrategyId` without a rule here is a
/// compile error.
pub fn create_allocator(
    id: StrategyId,
    backtest: &BacktestSettings,
    optimizer: &OptimizerSettings,
) -> Result<Box<dyn Allocator>, AllocationError> {
    let solver = SolverOptions::from(optimizer);
    match id {
        StrategyId::EqualWeight => Ok(Box::new(EqualWeight)),
        StrategyId::MinVariance => Ok(Box::new(MinVariance::new(solver))),
        StrategyId::MeanVariance => Ok(Box::new(MeanVariance::new(backtest.gamma, solver)?)),
        StrategyId::RiskParity => Ok(Box::new(RiskParity::new(optimizer))),
        StrategyId::VolTarget => Ok(Box::new(VolTarget::new(backtest.target_vol, backtest.lmax)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_strategy_has_an_allocator_reporting_its_id() {
        let backtest = BacktestSettings::default();
        let optimizer = OptimizerSettings::default();
        for id in StrategyId::ALL {
            let allocator = create_allocator(id, &backtest, &optimizer).unwrap();
            assert_eq!(allocator.id(), id);
        }
    }

    #[test]
    fn test_invalid_parameters_surface_from_factory() {
        let backtest = BacktestSettings { lmax: 0.0, ..Default::default() };
        let result = create_allocator(StrategyId::VolTarget, &backtest, &OptimizerSettings::default());
        assert!(matches!(result, Err(AllocationError::InvalidParameters(_))));
    }
}
