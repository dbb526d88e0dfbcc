// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! # CarbonTally CLI
//!
//! Carbon-emission estimates and credit settlement from the command line.
//! The engine does the arithmetic; this front end parses input, picks the
//! catalog and renders results.

use anyhow::{anyhow, Result};
use carbontally_engine::{
    assess_packaging, calculate, load_catalog, write_default_catalog, Catalog,
};
use carbontally_types::{
    CalculationRequest, CalculationResult, PackagingAssessment, PackagingRequest, Period,
};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "carbontally")]
#[command(about = "Carbon emission estimates & credit settlement", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate industrial emissions and settle credits
    Industrial {
        /// Industry category (e.g. steel, cement)
        #[arg(short, long)]
        category: String,

        /// Production quantity over the reporting period
        #[arg(short, long)]
        quantity: f64,

        /// Reporting period (monthly, yearly)
        #[arg(short, long, default_value = "yearly")]
        period: String,

        /// Energy source powering production
        #[arg(short, long, default_value = "mixed")]
        energy: String,

        /// Catalog file overriding the built-in tables
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Write output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Assess packaging material emissions and grade efficiency
    Packaging {
        /// Packaging material (e.g. plastic, glass)
        #[arg(short, long)]
        material: String,

        /// Material amount in kilograms
        #[arg(short, long)]
        amount: f64,

        /// Use recycled-content factors
        #[arg(long)]
        recycled: bool,

        /// Product state the packaging must hold (e.g. solid, liquid)
        #[arg(long)]
        state: Option<String>,

        /// Catalog file overriding the built-in tables
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Write output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect or scaffold factor catalogs
    Catalog {
        #[command(subcommand)]
        action: CatalogCommands,
    },
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// Print the active catalog
    Show {
        /// Catalog file; the built-in tables when omitted
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Write the built-in catalog to a file as a starting point
    Init {
        /// Destination file (.yml or .toml)
        #[arg(short, long, default_value = "carbontally.yml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .init();

    match cli.command {
        Commands::Industrial {
            category,
            quantity,
            period,
            energy,
            catalog,
            format,
            output,
        } => {
            let catalog = load_or_default(catalog.as_deref())?;
            let period: Period = period.parse().map_err(|e: String| anyhow!(e))?;
            let request = CalculationRequest::new(category, quantity, period, energy);

            info!(
                category = %request.category,
                quantity = request.quantity,
                "Calculating industrial estimate"
            );
            let result = calculate(&catalog, &request)?;

            let text = match format.as_str() {
                "json" => serde_json::to_string_pretty(&result)?,
                "text" => format_industrial_text(&result),
                other => {
                    eprintln!("Unsupported format: {}", other);
                    return Ok(());
                }
            };
            emit(&text, output.as_deref())
        }

        Commands::Packaging {
            material,
            amount,
            recycled,
            state,
            catalog,
            format,
            output,
        } => {
            let catalog = load_or_default(catalog.as_deref())?;
            let request = PackagingRequest {
                material,
                amount,
                recycled,
                state,
            };

            info!(material = %request.material, "Assessing packaging");
            let assessment = assess_packaging(&catalog, &request)?;

            let text = match format.as_str() {
                "json" => serde_json::to_string_pretty(&assessment)?,
                "text" => format_packaging_text(&assessment),
                other => {
                    eprintln!("Unsupported format: {}", other);
                    return Ok(());
                }
            };
            emit(&text, output.as_deref())
        }

        Commands::Catalog { action } => match action {
            CatalogCommands::Show { catalog, format } => {
                let catalog = load_or_default(catalog.as_deref())?;
                let text = match format.as_str() {
                    "json" => serde_json::to_string_pretty(&catalog)?,
                    "text" => format_catalog_text(&catalog),
                    other => {
                        eprintln!("Unsupported format: {}", other);
                        return Ok(());
                    }
                };
                println!("{}", text);
                Ok(())
            }

            CatalogCommands::Init { output } => {
                write_default_catalog(&output)?;
                println!("Catalog written to: {}", output.display());
                Ok(())
            }
        },
    }
}

/// Load the catalog from a file, or fall back to the built-in tables
fn load_or_default(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading catalog");
            Ok(load_catalog(path)?)
        }
        None => Ok(Catalog::default()),
    }
}

/// Print to stdout or write to the requested file
fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text)?;
            eprintln!("Output written to: {}", path.display());
        }
        None => {
            println!("{}", text);
        }
    }
    Ok(())
}

fn format_industrial_text(result: &CalculationResult) -> String {
    let mut out = String::new();
    let request = &result.request;

    out.push_str(&format!(
        "Industrial estimate: {} ({} units, {}, {} energy)\n",
        request.category, request.quantity, request.period, request.energy_source
    ));

    out.push_str("\nEmissions:\n");
    out.push_str(&format!(
        "  Factor:            {:.2} tCO2e/unit/yr\n",
        result.calculations.emission_factor
    ));
    out.push_str(&format!(
        "  Time multiplier:   {:.4}\n",
        result.calculations.time_multiplier
    ));
    out.push_str(&format!(
        "  Energy multiplier: {:.2}\n",
        result.calculations.energy_multiplier
    ));
    out.push_str(&format!(
        "  Base:              {:.2} tCO2e\n",
        result.calculations.base_emissions
    ));
    out.push_str(&format!(
        "  Total:             {:.2} tCO2e\n",
        result.calculations.total_emissions
    ));

    out.push_str("\nCredits:\n");
    out.push_str(&format!(
        "  Needed:            {} @ {:.2} = {:.2}\n",
        result.credits.needed, result.credits.price, result.credits.cost
    ));

    out.push_str("\nAwards:\n");
    out.push_str(&format!(
        "  Tier:              {} ({} credits)\n",
        result.awards.tier.label, result.awards.tier.base_credits
    ));
    out.push_str(&format!(
        "  Energy bonus:      {} ({})\n",
        result.awards.energy_bonus.amount, result.awards.energy_bonus.reason
    ));
    out.push_str(&format!(
        "  Efficiency bonus:  {} ({})\n",
        result.awards.efficiency_bonus.amount, result.awards.efficiency_bonus.reason
    ));
    out.push_str(&format!(
        "  Total awarded:     {} (value {:.2})\n",
        result.awards.total_awarded, result.awards.value
    ));

    out.push_str("\nNet settlement:\n");
    out.push_str(&format!(
        "  Credits needed:    {}\n",
        result.net_results.credits_needed
    ));
    out.push_str(&format!("  Cost:              {:.2}\n", result.net_results.cost));
    out.push_str(&format!("  Savings:           {:.2}", result.net_results.savings));

    out
}

fn format_packaging_text(assessment: &PackagingAssessment) -> String {
    let mut out = String::new();
    let content = if assessment.recycled { "recycled" } else { "virgin" };

    out.push_str(&format!(
        "Packaging assessment: {} ({} {}, {})\n",
        assessment.material, assessment.amount, assessment.unit, content
    ));
    out.push_str(&format!(
        "\n  Factor:            {:.2} kgCO2e/{}\n",
        assessment.emission_factor, assessment.unit
    ));
    out.push_str(&format!(
        "  Total emissions:   {:.2} kgCO2e\n",
        assessment.total_emissions
    ));
    out.push_str(&format!(
        "  Intensity:         {:.2} kgCO2e/kg\n",
        assessment.emissions_per_kg
    ));
    out.push_str(&format!(
        "  Grade:             {} ({})",
        assessment.grade.grade, assessment.grade.description
    ));

    out
}

fn format_catalog_text(catalog: &Catalog) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Industry factors (tCO2e per unit per year, fallback: {}):\n",
        catalog.industry_factors.fallback
    ));
    for (key, value) in &catalog.industry_factors.entries {
        out.push_str(&format!("  {:<14} {:>8.2}\n", key, value));
    }

    out.push_str(&format!(
        "\nEnergy multipliers (fallback: {}):\n",
        catalog.energy_multipliers.fallback
    ));
    for (key, value) in &catalog.energy_multipliers.entries {
        out.push_str(&format!("  {:<14} {:>8.2}\n", key, value));
    }

    out.push_str(&format!(
        "\nEnergy bonus rates (fallback: {}):\n",
        catalog.energy_bonus_rates.fallback
    ));
    for (key, value) in &catalog.energy_bonus_rates.entries {
        out.push_str(&format!("  {:<14} {:>8.2}\n", key, value));
    }

    out.push_str("\nAward tiers:\n");
    for tier in &catalog.award_tiers {
        let bound = match tier.up_to {
            Some(bound) => format!("up to {}", bound),
            None => "above".to_string(),
        };
        out.push_str(&format!(
            "  {:<12} {:>3} credits  rate {:.2}  {}\n",
            bound, tier.base_credits, tier.bonus_rate, tier.label
        ));
    }

    out.push_str("\nPackaging materials (virgin/recycled per unit):\n");
    for (key, material) in &catalog.packaging_materials {
        out.push_str(&format!(
            "  {:<10} {:>6.2} / {:.2} kgCO2e/{}  holds: {}\n",
            key,
            material.factor,
            material.recycled_factor,
            material.unit,
            material.allowed_states.join(", ")
        ));
    }

    out
}
