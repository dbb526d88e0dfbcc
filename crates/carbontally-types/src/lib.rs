// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! # CarbonTally Types
//!
//! Core data types for emission estimation and carbon-credit settlement.
//! Everything here is plain data: the calculation engine lives in
//! `carbontally-engine`, presentation layers consume the serialized forms.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul};
use std::str::FromStr;

/// Carbon emissions in tonnes of CO2 equivalent
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Emissions(pub f64);

impl Emissions {
    pub const ZERO: Self = Emissions(0.0);

    pub fn tonnes_co2e(t: f64) -> Self {
        Emissions(t)
    }

    pub fn kilograms_co2e(kg: f64) -> Self {
        Emissions(kg / 1000.0)
    }

    pub fn as_kilograms(&self) -> f64 {
        self.0 * 1000.0
    }
}

impl Add for Emissions {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Emissions(self.0 + rhs.0)
    }
}

impl Mul<f64> for Emissions {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Emissions(self.0 * rhs)
    }
}

/// Reporting period for an emission estimate
///
/// Factor tables are denominated per year; a monthly report scales the
/// yearly factor by 1/12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Monthly,
    Yearly,
}

impl Period {
    pub fn time_multiplier(&self) -> f64 {
        match self {
            Period::Monthly => 1.0 / 12.0,
            Period::Yearly => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(Period::Monthly),
            "yearly" => Ok(Period::Yearly),
            other => Err(format!(
                "unknown period '{}', expected 'monthly' or 'yearly'",
                other
            )),
        }
    }
}

/// Input to an industrial emission calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    /// Industry category, matched case-insensitively against the catalog
    pub category: String,
    /// Production quantity over the reporting period
    pub quantity: f64,
    pub period: Period,
    /// Energy source powering production
    pub energy_source: String,
}

impl CalculationRequest {
    pub fn new(
        category: impl Into<String>,
        quantity: f64,
        period: Period,
        energy_source: impl Into<String>,
    ) -> Self {
        CalculationRequest {
            category: category.into(),
            quantity,
            period,
            energy_source: energy_source.into(),
        }
    }
}

/// Input to a packaging emission assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingRequest {
    /// Packaging material, matched case-insensitively against the catalog
    pub material: String,
    /// Material amount in kilograms
    pub amount: f64,
    /// Use recycled-content factors instead of virgin factors
    #[serde(default)]
    pub recycled: bool,
    /// Product state the packaging must hold (e.g. solid, liquid)
    #[serde(default)]
    pub state: Option<String>,
}

impl PackagingRequest {
    pub fn new(material: impl Into<String>, amount: f64) -> Self {
        PackagingRequest {
            material: material.into(),
            amount,
            recycled: false,
            state: None,
        }
    }
}

/// Credit-award bracket keyed by a total-emissions upper bound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardTier {
    pub base_credits: u32,
    pub bonus_rate: f64,
    pub label: String,
}

/// One bonus applied during settlement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusOutcome {
    pub amount: u64,
    pub reason: String,
    /// Rate the bonus was derived from; absent for stepped bonuses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
}

/// Emission figures derived from a request
///
/// `base_emissions` and `total_emissions` are display copies rounded to
/// two decimals; the engine keeps full precision internally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionFigures {
    pub emission_factor: f64,
    pub energy_multiplier: f64,
    pub time_multiplier: f64,
    pub base_emissions: f64,
    pub total_emissions: f64,
}

/// Credits required before awards are applied
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditFigures {
    pub needed: u64,
    pub cost: f64,
    /// Price per credit in currency units
    pub price: f64,
}

/// Everything awarded during settlement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardFigures {
    pub tier: AwardTier,
    pub energy_bonus: BonusOutcome,
    pub efficiency_bonus: BonusOutcome,
    pub total_awarded: u64,
    /// Monetary value of the awarded credits
    pub value: f64,
}

/// Net position after awards are subtracted from the requirement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetFigures {
    pub credits_needed: u64,
    pub cost: f64,
    pub savings: f64,
}

/// Complete result of one industrial calculation
///
/// Immutable once assembled; presentation layers render it as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub request: CalculationRequest,
    pub calculations: EmissionFigures,
    pub credits: CreditFigures,
    pub awards: AwardFigures,
    pub net_results: NetFigures,
}

/// Packaging efficiency letter grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(s)
    }
}

/// Grade plus its human-readable description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EfficiencyGrade {
    pub grade: Grade,
    pub description: String,
}

/// Complete result of one packaging assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingAssessment {
    pub material: String,
    /// Material amount in the catalog unit
    pub amount: f64,
    pub unit: String,
    pub recycled: bool,
    /// Factor applied, in kg CO2e per unit
    pub emission_factor: f64,
    /// Total emissions in kg CO2e, rounded to two decimals for display
    pub total_emissions: f64,
    /// Emission intensity in kg CO2e per kg, rounded to two decimals
    pub emissions_per_kg: f64,
    pub grade: EfficiencyGrade,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emissions_arithmetic() {
        let a = Emissions::tonnes_co2e(1.5);
        let b = Emissions::tonnes_co2e(0.5);
        assert_eq!(a + b, Emissions::tonnes_co2e(2.0));
        assert_eq!(a * 2.0, Emissions::tonnes_co2e(3.0));
    }

    #[test]
    fn test_emissions_unit_conversion() {
        let e = Emissions::kilograms_co2e(2500.0);
        assert_eq!(e, Emissions::tonnes_co2e(2.5));
        assert_eq!(e.as_kilograms(), 2500.0);
    }

    #[test]
    fn test_period_time_multiplier() {
        assert_eq!(Period::Yearly.time_multiplier(), 1.0);
        // Monthly reports scale yearly factors down by twelve
        assert!((Period::Monthly.time_multiplier() - 1.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("monthly".parse::<Period>().unwrap(), Period::Monthly);
        assert_eq!(" Yearly ".parse::<Period>().unwrap(), Period::Yearly);
        assert!("weekly".parse::<Period>().is_err());
    }

    #[test]
    fn test_grade_display() {
        assert_eq!(Grade::APlus.to_string(), "A+");
        assert_eq!(Grade::F.to_string(), "F");
    }

    #[test]
    fn test_grade_serde_rename() {
        let json = serde_json::to_string(&Grade::APlus).unwrap();
        assert_eq!(json, "\"A+\"");
        let back: Grade = serde_json::from_str("\"A+\"").unwrap();
        assert_eq!(back, Grade::APlus);
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = CalculationRequest::new("steel", 100.0, Period::Monthly, "renewable");
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"energySource\":\"renewable\""));
        assert!(json.contains("\"period\":\"monthly\""));
    }

    #[test]
    fn test_bonus_multiplier_omitted_when_absent() {
        let bonus = BonusOutcome {
            amount: 15,
            reason: "very low emission intensity".to_string(),
            multiplier: None,
        };
        let json = serde_json::to_string(&bonus).unwrap();
        assert!(!json.contains("multiplier"));

        let with_rate = BonusOutcome {
            amount: 0,
            reason: "renewable energy rate".to_string(),
            multiplier: Some(0.25),
        };
        let json = serde_json::to_string(&with_rate).unwrap();
        assert!(json.contains("\"multiplier\":0.25"));
    }
}
