// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Emission estimation from quantity, factor, period and energy source

use crate::catalog::Catalog;
use crate::error::{EngineError, Result};
use carbontally_types::{CalculationRequest, Emissions};

/// Emission figures at full precision
///
/// Nothing here is rounded; display rounding happens at result assembly
/// so later stages never accumulate rounding error.
#[derive(Debug, Clone)]
pub struct Estimate {
    pub emission_factor: f64,
    pub energy_multiplier: f64,
    pub time_multiplier: f64,
    pub base_emissions: Emissions,
    pub total_emissions: Emissions,
}

/// Estimate emissions for a request
///
/// Unknown categories and energy sources degrade to the catalog's
/// fallback entries; invalid quantity or an empty category fail before
/// any computation happens.
pub fn estimate(catalog: &Catalog, request: &CalculationRequest) -> Result<Estimate> {
    validate_request(request)?;

    let emission_factor = catalog.industry_factors.resolve(&request.category);
    let time_multiplier = request.period.time_multiplier();
    let base_emissions =
        Emissions::tonnes_co2e(request.quantity * emission_factor * time_multiplier);

    let energy_multiplier = catalog.energy_multipliers.resolve(&request.energy_source);
    let total_emissions = base_emissions * energy_multiplier;

    Ok(Estimate {
        emission_factor,
        energy_multiplier,
        time_multiplier,
        base_emissions,
        total_emissions,
    })
}

fn validate_request(request: &CalculationRequest) -> Result<()> {
    if request.category.trim().is_empty() {
        return Err(EngineError::validation("category", "must not be empty"));
    }

    if !request.quantity.is_finite() || request.quantity <= 0.0 {
        return Err(EngineError::validation(
            "quantity",
            format!("must be a positive number, got {}", request.quantity),
        ));
    }

    Ok(())
}
