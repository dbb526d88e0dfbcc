// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Packaging assessment: material factors and efficiency grading

use crate::catalog::{normalize, Catalog};
use crate::error::{EngineError, Result};
use crate::ladder::{Boundary, Ladder, Rung};
use crate::report::round2;
use carbontally_types::{EfficiencyGrade, Emissions, Grade, PackagingAssessment, PackagingRequest};
use tracing::debug;

/// Grade bands in kg CO2e per kg of material, strict upper bounds
fn grade_bands() -> Ladder<(Grade, &'static str)> {
    Ladder::from_static(
        Boundary::Exclusive,
        vec![
            Rung::new(0.5, (Grade::APlus, "Excellent")),
            Rung::new(1.0, (Grade::A, "Very Good")),
            Rung::new(2.0, (Grade::B, "Good")),
            Rung::new(3.0, (Grade::C, "Average")),
            Rung::new(4.0, (Grade::D, "Below Average")),
            Rung::new(f64::INFINITY, (Grade::F, "Poor")),
        ],
    )
}

/// Grade packaging emissions by per-kilogram intensity
///
/// Bounds are strict: an intensity of exactly 0.5 grades "A", not "A+".
/// The amount must be positive; `assess` validates before calling.
pub fn grade(total_emissions: Emissions, amount_kg: f64) -> EfficiencyGrade {
    let per_kg = total_emissions.as_kilograms() / amount_kg;
    let (grade, description) = *grade_bands().lookup(per_kg);
    EfficiencyGrade {
        grade,
        description: description.to_string(),
    }
}

/// Assess a packaging choice against the catalog's material table
///
/// Unlike the industrial tables there is no fallback material: a factor
/// picked at random would be off by up to 20x, so unknown materials are
/// a validation failure.
pub fn assess(catalog: &Catalog, request: &PackagingRequest) -> Result<PackagingAssessment> {
    if request.material.trim().is_empty() {
        return Err(EngineError::validation("material", "must not be empty"));
    }

    if !request.amount.is_finite() || request.amount <= 0.0 {
        return Err(EngineError::validation(
            "amount",
            format!("must be a positive number, got {}", request.amount),
        ));
    }

    let key = normalize(&request.material);
    let material = catalog.packaging_materials.get(&key).ok_or_else(|| {
        let known = catalog
            .packaging_materials
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        EngineError::validation(
            "material",
            format!("unknown material '{}' (known: {})", key, known),
        )
    })?;

    if let Some(ref state) = request.state {
        let state = normalize(state);
        if !material.allowed_states.contains(&state) {
            return Err(EngineError::validation(
                "state",
                format!(
                    "material '{}' cannot hold {} products (allowed: {})",
                    key,
                    state,
                    material.allowed_states.join(", ")
                ),
            ));
        }
    }

    let emission_factor = if request.recycled {
        material.recycled_factor
    } else {
        material.factor
    };
    let total_emissions = Emissions::kilograms_co2e(request.amount * emission_factor);
    let graded = grade(total_emissions, request.amount);

    debug!(
        material = %key,
        recycled = request.recycled,
        factor = emission_factor,
        grade = %graded.grade,
        "Assessed packaging"
    );

    Ok(PackagingAssessment {
        material: key,
        amount: request.amount,
        unit: material.unit.clone(),
        recycled: request.recycled,
        emission_factor,
        total_emissions: round2(total_emissions.as_kilograms()),
        emissions_per_kg: round2(total_emissions.as_kilograms() / request.amount),
        grade: graded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn per_kg(intensity: f64) -> EfficiencyGrade {
        // Amount 1.0 keeps the intensity equal to the total
        grade(Emissions::kilograms_co2e(intensity), 1.0)
    }

    #[test]
    fn test_grade_band_walk() {
        assert_eq!(per_kg(0.2).grade, Grade::APlus);
        assert_eq!(per_kg(0.7).grade, Grade::A);
        assert_eq!(per_kg(1.5).grade, Grade::B);
        assert_eq!(per_kg(2.5).grade, Grade::C);
        assert_eq!(per_kg(3.5).grade, Grade::D);
        assert_eq!(per_kg(9.0).grade, Grade::F);
    }

    #[test]
    fn test_intensity_on_bound_takes_next_grade() {
        // Exactly 0.5 kg/kg is "A", not "A+"
        let rating = grade(Emissions::kilograms_co2e(50.0), 100.0);
        assert_eq!(rating.grade, Grade::A);
        assert_eq!(rating.description, "Very Good");

        // Exactly 1.0 kg/kg is "B"
        let rating = grade(Emissions::kilograms_co2e(100.0), 100.0);
        assert_eq!(rating.grade, Grade::B);
    }

    #[test]
    fn test_assess_virgin_plastic() {
        let catalog = Catalog::default();
        let request = PackagingRequest::new("plastic", 100.0);
        let assessment = assess(&catalog, &request).unwrap();

        // 100 kg * 2.5 = 250 kg CO2e at 2.5 per kg
        assert_eq!(assessment.emission_factor, 2.5);
        assert_eq!(assessment.total_emissions, 250.0);
        assert_eq!(assessment.emissions_per_kg, 2.5);
        assert_eq!(assessment.grade.grade, Grade::C);
        assert_eq!(assessment.unit, "kg");
    }

    #[test]
    fn test_recycled_content_improves_grade() {
        let catalog = Catalog::default();
        let mut request = PackagingRequest::new("plastic", 100.0);
        request.recycled = true;
        let assessment = assess(&catalog, &request).unwrap();

        assert_eq!(assessment.emission_factor, 1.1);
        assert_eq!(assessment.total_emissions, 110.0);
        assert_eq!(assessment.grade.grade, Grade::B);
    }

    #[test]
    fn test_recycled_glass_grades_a() {
        let catalog = Catalog::default();
        let mut request = PackagingRequest::new("Glass", 40.0);
        request.recycled = true;
        let assessment = assess(&catalog, &request).unwrap();

        // Material lookup is case-insensitive; 0.55 per kg sits in [0.5, 1)
        assert_eq!(assessment.material, "glass");
        assert_eq!(assessment.grade.grade, Grade::A);
    }

    #[test]
    fn test_unknown_material_rejected() {
        let catalog = Catalog::default();
        let err = assess(&catalog, &PackagingRequest::new("unobtainium", 10.0)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation { ref field, .. } if field == "material"
        ));
    }

    #[test]
    fn test_disallowed_state_rejected() {
        let catalog = Catalog::default();
        let mut request = PackagingRequest::new("steel", 10.0);
        request.state = Some("liquid".to_string());
        let err = assess(&catalog, &request).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation { ref field, .. } if field == "state"
        ));
    }

    #[test]
    fn test_allowed_state_accepted() {
        let catalog = Catalog::default();
        let mut request = PackagingRequest::new("plastic", 10.0);
        request.state = Some("Liquid".to_string());
        assert!(assess(&catalog, &request).is_ok());
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let catalog = Catalog::default();
        for amount in [0.0, -5.0, f64::NAN] {
            let err = assess(&catalog, &PackagingRequest::new("plastic", amount)).unwrap_err();
            assert!(
                matches!(err, EngineError::Validation { ref field, .. } if field == "amount"),
                "amount {} should fail validation",
                amount
            );
        }
    }
}
