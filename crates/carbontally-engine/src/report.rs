// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Result assembly: the one place display rounding happens

use crate::estimator::Estimate;
use crate::settlement::{Settlement, CREDIT_PRICE};
use carbontally_types::{
    AwardFigures, CalculationRequest, CalculationResult, CreditFigures, EmissionFigures,
    NetFigures,
};

/// Round to two decimals for display copies
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Package estimate and settlement into the immutable result structure
///
/// Emission and money figures are rounded to two decimals here; the
/// inputs keep full precision so nothing upstream ever rounds.
pub fn assemble(
    request: &CalculationRequest,
    estimate: &Estimate,
    settlement: &Settlement,
) -> CalculationResult {
    CalculationResult {
        request: request.clone(),
        calculations: EmissionFigures {
            emission_factor: estimate.emission_factor,
            energy_multiplier: estimate.energy_multiplier,
            time_multiplier: estimate.time_multiplier,
            base_emissions: round2(estimate.base_emissions.0),
            total_emissions: round2(estimate.total_emissions.0),
        },
        credits: CreditFigures {
            needed: settlement.credits_needed,
            cost: round2(settlement.total_cost),
            price: CREDIT_PRICE,
        },
        awards: AwardFigures {
            tier: settlement.tier.clone(),
            energy_bonus: settlement.energy_bonus.clone(),
            efficiency_bonus: settlement.efficiency_bonus.clone(),
            total_awarded: settlement.total_awarded,
            value: round2(settlement.total_awarded as f64 * CREDIT_PRICE),
        },
        net_results: NetFigures {
            credits_needed: settlement.net_credits_needed,
            cost: round2(settlement.net_cost),
            savings: round2(settlement.savings),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::estimator::estimate;
    use crate::settlement::settle;
    use carbontally_types::Period;

    #[test]
    fn test_round2() {
        assert_eq!(round2(15.833333333333334), 15.83);
        assert_eq!(round2(1.5833333333333335), 1.58);
        assert_eq!(round2(13.940000000000001), 13.94);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(2.0), 2.0);
    }

    #[test]
    fn test_display_copies_rounded_inputs_untouched() {
        let catalog = Catalog::default();
        let request = CalculationRequest::new("steel", 100.0, Period::Monthly, "renewable");
        let estimate = estimate(&catalog, &request).unwrap();
        let settlement = settle(&catalog, &request, &estimate).unwrap();
        let result = assemble(&request, &estimate, &settlement);

        // The result shows two decimals, the estimate keeps full precision
        assert_eq!(result.calculations.base_emissions, 15.83);
        assert_eq!(result.calculations.total_emissions, 1.58);
        assert!((estimate.base_emissions.0 - 15.833333333333334).abs() < 1e-9);
        assert!(estimate.total_emissions.0 > result.calculations.total_emissions);
    }

    #[test]
    fn test_money_figures_rounded() {
        let catalog = Catalog::default();
        let request = CalculationRequest::new("steel", 100.0, Period::Monthly, "renewable");
        let estimate = estimate(&catalog, &request).unwrap();
        let settlement = settle(&catalog, &request, &estimate).unwrap();
        let result = assemble(&request, &estimate, &settlement);

        assert_eq!(result.credits.needed, 2);
        assert_eq!(result.credits.cost, 13.94);
        assert_eq!(result.credits.price, CREDIT_PRICE);
        // 45 awarded credits at 6.97
        assert_eq!(result.awards.total_awarded, 45);
        assert_eq!(result.awards.value, 313.65);
        assert_eq!(result.net_results.credits_needed, 0);
        assert_eq!(result.net_results.cost, 0.0);
        assert_eq!(result.net_results.savings, 13.94);
    }
}
