// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! # CarbonTally Engine
//!
//! Deterministic emission estimation and carbon-credit settlement.
//! Pure and synchronous: tables in, result out, no I/O past catalog
//! loading. Share a `Catalog` freely across threads.

pub mod catalog;
pub mod error;
pub mod estimator;
pub mod ladder;
pub mod packaging;
pub mod report;
pub mod settlement;

pub use catalog::{load_catalog, write_default_catalog, Catalog, FactorTable};
pub use error::{EngineError, Result};
pub use settlement::CREDIT_PRICE;

use carbontally_types::{
    CalculationRequest, CalculationResult, PackagingAssessment, PackagingRequest,
};

/// Run the full industrial pipeline: estimate, settle, assemble
pub fn calculate(catalog: &Catalog, request: &CalculationRequest) -> Result<CalculationResult> {
    let estimate = estimator::estimate(catalog, request)?;
    let settlement = settlement::settle(catalog, request, &estimate)?;
    Ok(report::assemble(request, &estimate, &settlement))
}

/// Assess a packaging choice and grade its efficiency
pub fn assess_packaging(
    catalog: &Catalog,
    request: &PackagingRequest,
) -> Result<PackagingAssessment> {
    packaging::assess(catalog, request)
}
