// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Credit settlement: requirement, award tier, bonus stacking, netting

use crate::catalog::Catalog;
use crate::error::Result;
use crate::estimator::Estimate;
use carbontally_types::{AwardTier, BonusOutcome, CalculationRequest, Period};

/// Fixed price per carbon credit in currency units
pub const CREDIT_PRICE: f64 = 6.97;

/// Settlement figures at full precision
#[derive(Debug, Clone)]
pub struct Settlement {
    pub credits_needed: u64,
    pub tier: AwardTier,
    pub energy_bonus: BonusOutcome,
    pub efficiency_bonus: BonusOutcome,
    pub total_awarded: u64,
    pub net_credits_needed: u64,
    pub total_cost: f64,
    pub net_cost: f64,
    pub savings: f64,
}

/// Settle credits for an estimate
///
/// Assumes the request already passed estimation; no further input
/// validation happens here.
pub fn settle(
    catalog: &Catalog,
    request: &CalculationRequest,
    estimate: &Estimate,
) -> Result<Settlement> {
    let credits_needed = estimate.total_emissions.0.ceil() as u64;

    let ladder = catalog.award_ladder()?;
    let tier = ladder.lookup(estimate.total_emissions.0).clone();

    let (rate_source, bonus_rate) = catalog
        .energy_bonus_rates
        .resolve_entry(&request.energy_source);
    let energy_bonus = BonusOutcome {
        amount: (credits_needed as f64 * bonus_rate).floor() as u64,
        reason: format!("{} energy rate", rate_source),
        multiplier: Some(bonus_rate),
    };

    let intensity = estimate.total_emissions.0 / request.quantity;
    let efficiency_bonus = efficiency_bonus(intensity, request.period);

    let total_awarded = u64::from(tier.base_credits)
        .saturating_add(energy_bonus.amount)
        .saturating_add(efficiency_bonus.amount);
    let net_credits_needed = credits_needed.saturating_sub(total_awarded);

    let total_cost = credits_needed as f64 * CREDIT_PRICE;
    let net_cost = net_credits_needed as f64 * CREDIT_PRICE;
    let savings = total_cost - net_cost;

    Ok(Settlement {
        credits_needed,
        tier,
        energy_bonus,
        efficiency_bonus,
        total_awarded,
        net_credits_needed,
        total_cost,
        net_cost,
        savings,
    })
}

/// Stepped bonus for low emission intensity (total per unit produced)
///
/// Thresholds are strict: an intensity sitting exactly on a step earns
/// the next band down. Yearly reporting adds 5 credits, but only when
/// the stepped bonus itself is non-zero.
fn efficiency_bonus(intensity: f64, period: Period) -> BonusOutcome {
    let (mut amount, reason) = if intensity < 0.3 {
        (15, "very low emission intensity")
    } else if intensity < 0.7 {
        (10, "low emission intensity")
    } else if intensity < 1.2 {
        (5, "moderate emission intensity")
    } else {
        (0, "no efficiency bonus")
    };

    let mut reason = reason.to_string();
    if amount > 0 && period == Period::Yearly {
        amount += 5;
        reason.push_str(" with long-term commitment");
    }

    BonusOutcome {
        amount,
        reason,
        multiplier: None,
    }
}
