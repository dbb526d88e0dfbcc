// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Factor catalog: the versioned constant tables driving every calculation

use crate::error::{EngineError, Result};
use crate::ladder::{Boundary, Ladder, Rung};
use carbontally_types::AwardTier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Case-normalized lookup key
pub(crate) fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Mapping from categorical keys to multipliers, with a designated
/// fallback entry for unknown keys
///
/// `resolve` assumes the table passed validation; unknown keys degrade
/// silently to the fallback entry rather than erroring. A fallback key
/// without an entry is a programming error caught by a debug assertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorTable {
    pub fallback: String,
    pub entries: BTreeMap<String, f64>,
}

impl FactorTable {
    /// Look up a key, falling back to the designated entry when absent
    pub fn resolve(&self, key: &str) -> f64 {
        self.resolve_entry(key).1
    }

    /// Like `resolve`, but also reports which entry was actually used
    pub fn resolve_entry(&self, key: &str) -> (&str, f64) {
        let normalized = normalize(key);
        if let Some((k, v)) = self.entries.get_key_value(&normalized) {
            return (k.as_str(), *v);
        }

        debug!(
            requested = %key,
            fallback = %self.fallback,
            "no table entry for key, using fallback"
        );
        debug_assert!(
            self.entries.contains_key(&self.fallback),
            "fallback '{}' has no table entry; the table skipped validation",
            self.fallback
        );
        match self.entries.get_key_value(&self.fallback) {
            Some((k, v)) => (k.as_str(), *v),
            // Release builds degrade to 0.0 on an unvalidated table
            None => (self.fallback.as_str(), 0.0),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.get(&normalize(key)).copied()
    }

    /// All values must be finite and strictly positive
    pub fn validate_positive(&self, name: &str) -> Result<()> {
        self.validate_values(name, false)
    }

    /// All values must be finite and non-negative (rate tables may hold 0)
    pub fn validate_non_negative(&self, name: &str) -> Result<()> {
        self.validate_values(name, true)
    }

    fn validate_values(&self, name: &str, allow_zero: bool) -> Result<()> {
        if self.entries.is_empty() {
            return Err(EngineError::Catalog(format!("{} table is empty", name)));
        }

        for (key, value) in &self.entries {
            let ok = value.is_finite() && (*value > 0.0 || (allow_zero && *value == 0.0));
            if !ok {
                let wanted = if allow_zero { "non-negative" } else { "positive" };
                return Err(EngineError::Catalog(format!(
                    "{} entry '{}' must be a {} number, got {}",
                    name, key, wanted, value
                )));
            }
        }

        if !self.entries.contains_key(&self.fallback) {
            return Err(EngineError::Catalog(format!(
                "{} fallback '{}' has no table entry",
                name, self.fallback
            )));
        }

        Ok(())
    }

    fn normalize_keys(&mut self, name: &str) -> Result<()> {
        let mut entries = BTreeMap::new();
        for (key, value) in std::mem::take(&mut self.entries) {
            if entries.insert(normalize(&key), value).is_some() {
                return Err(EngineError::Catalog(format!(
                    "{} holds duplicate entries for '{}'",
                    name,
                    normalize(&key)
                )));
            }
        }
        self.entries = entries;
        self.fallback = normalize(&self.fallback);
        Ok(())
    }
}

/// One credit-award bracket as written in catalog files
///
/// `up_to` is the inclusive total-emissions upper bound in tonnes;
/// exactly the last tier omits it and catches everything above.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_to: Option<f64>,
    pub base_credits: u32,
    pub bonus_rate: f64,
    pub label: String,
}

/// Packaging material entry: virgin and recycled-content factors in
/// kg CO2e per unit, plus the product states the packaging may hold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagingMaterial {
    pub factor: f64,
    pub recycled_factor: f64,
    pub unit: String,
    pub allowed_states: Vec<String>,
}

/// The full versioned table set
///
/// Built-in defaults apply when no catalog file is supplied. Loaded
/// catalogs are normalized and validated before the engine sees them;
/// an invalid catalog is a fatal load error, never silently repaired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Industry category to tCO2e per unit per year
    #[serde(default = "default_industry_factors")]
    pub industry_factors: FactorTable,

    /// Energy source to emission multiplier
    #[serde(default = "default_energy_multipliers")]
    pub energy_multipliers: FactorTable,

    /// Energy source to credit bonus rate
    #[serde(default = "default_energy_bonus_rates")]
    pub energy_bonus_rates: FactorTable,

    /// Credit-award brackets, ascending by upper bound
    #[serde(default = "default_award_tiers")]
    pub award_tiers: Vec<TierSpec>,

    /// Packaging materials for the packaging assessment
    #[serde(default = "default_packaging_materials")]
    pub packaging_materials: BTreeMap<String, PackagingMaterial>,
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog {
            industry_factors: default_industry_factors(),
            energy_multipliers: default_energy_multipliers(),
            energy_bonus_rates: default_energy_bonus_rates(),
            award_tiers: default_award_tiers(),
            packaging_materials: default_packaging_materials(),
        }
    }
}

impl Catalog {
    /// Lowercase and trim every lookup key; duplicate keys after
    /// normalization are rejected
    pub fn normalize(&mut self) -> Result<()> {
        self.industry_factors.normalize_keys("industry_factors")?;
        self.energy_multipliers.normalize_keys("energy_multipliers")?;
        self.energy_bonus_rates.normalize_keys("energy_bonus_rates")?;

        let mut materials = BTreeMap::new();
        for (key, mut material) in std::mem::take(&mut self.packaging_materials) {
            material.allowed_states = material
                .allowed_states
                .iter()
                .map(|s| normalize(s))
                .collect();
            if materials.insert(normalize(&key), material).is_some() {
                return Err(EngineError::Catalog(format!(
                    "packaging_materials holds duplicate entries for '{}'",
                    normalize(&key)
                )));
            }
        }
        self.packaging_materials = materials;
        Ok(())
    }

    /// Check every table invariant; called once at load time
    pub fn validate(&self) -> Result<()> {
        self.industry_factors.validate_positive("industry_factors")?;
        self.energy_multipliers
            .validate_positive("energy_multipliers")?;
        self.energy_bonus_rates
            .validate_non_negative("energy_bonus_rates")?;

        // Builds and discards the ladder to surface malformed tiers now
        self.award_ladder()?;

        for (key, material) in &self.packaging_materials {
            if !material.factor.is_finite() || material.factor <= 0.0 {
                return Err(EngineError::Catalog(format!(
                    "packaging material '{}' factor must be a positive number, got {}",
                    key, material.factor
                )));
            }
            if !material.recycled_factor.is_finite() || material.recycled_factor <= 0.0 {
                return Err(EngineError::Catalog(format!(
                    "packaging material '{}' recycled_factor must be a positive number, got {}",
                    key, material.recycled_factor
                )));
            }
            if material.unit.trim().is_empty() {
                return Err(EngineError::Catalog(format!(
                    "packaging material '{}' has no unit",
                    key
                )));
            }
        }

        Ok(())
    }

    /// Build the credit-award ladder from the tier specs
    pub fn award_ladder(&self) -> Result<Ladder<AwardTier>> {
        if let Some(open) = self.award_tiers.iter().position(|t| t.up_to.is_none()) {
            if open != self.award_tiers.len() - 1 {
                return Err(EngineError::Catalog(
                    "only the last award tier may omit up_to".to_string(),
                ));
            }
        } else if !self.award_tiers.is_empty() {
            return Err(EngineError::Catalog(
                "the last award tier must omit up_to to stay open-ended".to_string(),
            ));
        }

        let rungs = self
            .award_tiers
            .iter()
            .map(|tier| {
                Rung::new(
                    tier.up_to.unwrap_or(f64::INFINITY),
                    AwardTier {
                        base_credits: tier.base_credits,
                        bonus_rate: tier.bonus_rate,
                        label: tier.label.clone(),
                    },
                )
            })
            .collect();

        Ladder::new(Boundary::Inclusive, rungs)
    }
}

fn default_industry_factors() -> FactorTable {
    FactorTable {
        entries: BTreeMap::from([
            ("aluminum".to_string(), 11.5),
            ("cement".to_string(), 0.9),
            ("chemicals".to_string(), 2.3),
            ("electronics".to_string(), 0.6),
            ("food".to_string(), 0.8),
            ("other".to_string(), 0.7),
            ("paper".to_string(), 1.1),
            ("steel".to_string(), 1.9),
            ("textiles".to_string(), 1.7),
        ]),
        fallback: "other".to_string(),
    }
}

fn default_energy_multipliers() -> FactorTable {
    FactorTable {
        entries: BTreeMap::from([
            ("coal".to_string(), 1.0),
            ("hydro".to_string(), 0.15),
            ("mixed".to_string(), 0.55),
            ("natural-gas".to_string(), 0.75),
            ("renewable".to_string(), 0.1),
        ]),
        fallback: "mixed".to_string(),
    }
}

fn default_energy_bonus_rates() -> FactorTable {
    FactorTable {
        entries: BTreeMap::from([
            ("coal".to_string(), 0.0),
            ("hydro".to_string(), 0.2),
            ("mixed".to_string(), 0.1),
            ("natural-gas".to_string(), 0.05),
            ("renewable".to_string(), 0.25),
        ]),
        fallback: "coal".to_string(),
    }
}

fn default_award_tiers() -> Vec<TierSpec> {
    vec![
        TierSpec {
            up_to: Some(5.0),
            base_credits: 30,
            bonus_rate: 0.5,
            label: "Green Pioneer".to_string(),
        },
        TierSpec {
            up_to: Some(20.0),
            base_credits: 20,
            bonus_rate: 0.3,
            label: "Climate Leader".to_string(),
        },
        TierSpec {
            up_to: Some(50.0),
            base_credits: 15,
            bonus_rate: 0.2,
            label: "Eco Committed".to_string(),
        },
        TierSpec {
            up_to: Some(100.0),
            base_credits: 10,
            bonus_rate: 0.1,
            label: "Transition Track".to_string(),
        },
        TierSpec {
            up_to: None,
            base_credits: 5,
            bonus_rate: 0.05,
            label: "Heavy Emitter".to_string(),
        },
    ]
}

fn default_packaging_materials() -> BTreeMap<String, PackagingMaterial> {
    BTreeMap::from([
        (
            "plastic".to_string(),
            PackagingMaterial {
                factor: 2.5,
                recycled_factor: 1.1,
                unit: "kg".to_string(),
                allowed_states: vec![
                    "solid".to_string(),
                    "liquid".to_string(),
                    "powder".to_string(),
                ],
            },
        ),
        (
            "glass".to_string(),
            PackagingMaterial {
                factor: 0.85,
                recycled_factor: 0.55,
                unit: "kg".to_string(),
                allowed_states: vec!["solid".to_string(), "liquid".to_string()],
            },
        ),
        (
            "aluminum".to_string(),
            PackagingMaterial {
                factor: 11.5,
                recycled_factor: 0.65,
                unit: "kg".to_string(),
                allowed_states: vec!["solid".to_string(), "liquid".to_string()],
            },
        ),
        (
            "cardboard".to_string(),
            PackagingMaterial {
                factor: 1.1,
                recycled_factor: 0.7,
                unit: "kg".to_string(),
                allowed_states: vec!["solid".to_string(), "powder".to_string()],
            },
        ),
        (
            "steel".to_string(),
            PackagingMaterial {
                factor: 1.9,
                recycled_factor: 0.75,
                unit: "kg".to_string(),
                allowed_states: vec!["solid".to_string()],
            },
        ),
    ])
}

/// Load a catalog from a YAML or TOML file, chosen by extension
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)?;

    let mut catalog: Catalog = if path.extension().map(|e| e == "toml").unwrap_or(false) {
        toml::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    catalog.normalize()?;
    catalog.validate()?;

    debug!(
        path = %path.display(),
        industries = catalog.industry_factors.entries.len(),
        materials = catalog.packaging_materials.len(),
        "Loaded factor catalog"
    );
    Ok(catalog)
}

/// Write the built-in catalog to a file as a starting point for edits
pub fn write_default_catalog(path: &Path) -> Result<()> {
    let catalog = Catalog::default();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = if path.extension().map(|e| e == "toml").unwrap_or(false) {
        toml::to_string_pretty(&catalog).map_err(|e| EngineError::Catalog(e.to_string()))?
    } else {
        serde_yaml::to_string(&catalog)?
    };

    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_validates() {
        let catalog = Catalog::default();
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let catalog = Catalog::default();
        assert_eq!(catalog.industry_factors.resolve("Steel"), 1.9);
        assert_eq!(catalog.industry_factors.resolve("  STEEL  "), 1.9);
    }

    #[test]
    fn test_resolve_unknown_key_uses_fallback() {
        let catalog = Catalog::default();
        // Unknown industries degrade to the 'other' entry
        assert_eq!(catalog.industry_factors.resolve("unknown-xyz"), 0.7);
        assert_eq!(catalog.energy_multipliers.resolve("fusion"), 0.55);
        assert_eq!(catalog.energy_bonus_rates.resolve("fusion"), 0.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "has no table entry")]
    fn test_resolve_trips_on_missing_fallback_entry() {
        // A hand-built table that would never pass validate()
        let table = FactorTable {
            fallback: "absent".to_string(),
            entries: BTreeMap::from([("steel".to_string(), 1.9)]),
        };
        table.resolve("unlisted");
    }

    #[test]
    fn test_resolve_entry_reports_used_key() {
        let catalog = Catalog::default();
        let (used, value) = catalog.energy_bonus_rates.resolve_entry("fusion");
        assert_eq!(used, "coal");
        assert_eq!(value, 0.0);

        let (used, value) = catalog.energy_bonus_rates.resolve_entry("renewable");
        assert_eq!(used, "renewable");
        assert_eq!(value, 0.25);
    }

    #[test]
    fn test_validate_rejects_negative_factor() {
        let mut catalog = Catalog::default();
        catalog
            .industry_factors
            .entries
            .insert("bogus".to_string(), -1.0);
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_multiplier() {
        let mut catalog = Catalog::default();
        catalog
            .energy_multipliers
            .entries
            .insert("void".to_string(), 0.0);
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_bonus_rate_table_may_hold_zero() {
        let catalog = Catalog::default();
        assert_eq!(catalog.energy_bonus_rates.get("coal"), Some(0.0));
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_fallback_entry() {
        let mut catalog = Catalog::default();
        catalog.industry_factors.fallback = "nonexistent".to_string();
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_award_ladder_from_defaults() {
        let catalog = Catalog::default();
        let ladder = catalog.award_ladder().unwrap();

        // Inclusive bound: exactly 5 tonnes still lands in the first tier
        assert_eq!(ladder.lookup(5.0).label, "Green Pioneer");
        assert_eq!(ladder.lookup(5.0).base_credits, 30);
        assert_eq!(ladder.lookup(5.1).label, "Climate Leader");
        assert_eq!(ladder.lookup(1e6).label, "Heavy Emitter");
    }

    #[test]
    fn test_award_ladder_rejects_open_tier_mid_list() {
        let mut catalog = Catalog::default();
        catalog.award_tiers[1].up_to = None;
        assert!(catalog.award_ladder().is_err());
    }

    #[test]
    fn test_award_ladder_rejects_bounded_last_tier() {
        let mut catalog = Catalog::default();
        if let Some(last) = catalog.award_tiers.last_mut() {
            last.up_to = Some(500.0);
        }
        assert!(catalog.award_ladder().is_err());
    }

    #[test]
    fn test_normalize_lowercases_keys() {
        let mut catalog = Catalog::default();
        catalog
            .industry_factors
            .entries
            .insert("Shipping".to_string(), 3.2);
        catalog.normalize().unwrap();
        assert_eq!(catalog.industry_factors.get("shipping"), Some(3.2));
    }

    #[test]
    fn test_normalize_rejects_colliding_keys() {
        let mut catalog = Catalog::default();
        catalog
            .industry_factors
            .entries
            .insert("Steel".to_string(), 2.4);
        assert!(catalog.normalize().is_err());
    }
}
