//! Command-line interaction checker.
//!
//! Loads the synonym and interaction reference tables once, then runs a
//! single check, an autocomplete query, or a visit history listing, and
//! prints the result as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ddi_guard_core::{CheckRequest, Database, InteractionChecker, Visit};

#[derive(Parser)]
#[command(name = "ddi-guard", version, about = "Drug-drug interaction checker")]
struct Cli {
    /// Path to the synonym table (alias,canonical CSV)
    #[arg(long, global = true, default_value = "data/synonyms.csv")]
    synonyms: PathBuf,

    /// Path to the interaction table CSV
    #[arg(long, global = true, default_value = "data/interactions.csv")]
    interactions: PathBuf,

    /// Path to the visit history database
    #[arg(long, global = true, default_value = "ddi-visits.sqlite3")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a proposed new drug against current medications
    Check {
        /// Proposed new drug name
        #[arg(long)]
        new_drug: String,

        /// Current medication, repeatable
        #[arg(long = "current")]
        current: Vec<String>,

        /// Patient name for the visit record
        #[arg(long)]
        patient_name: Option<String>,

        /// Patient age
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=130))]
        age: Option<u32>,

        /// Prescribing doctor for the visit record
        #[arg(long)]
        doctor_name: Option<String>,

        /// Persist the check as a visit
        #[arg(long)]
        save: bool,
    },

    /// Autocomplete drug name suggestions
    Suggest {
        /// Partial drug name
        query: String,

        /// Maximum number of suggestions
        #[arg(long, default_value_t = 8)]
        limit: usize,
    },

    /// List recent visits, newest first
    History {
        /// Maximum number of visits
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            new_drug,
            current,
            patient_name,
            age,
            doctor_name,
            save,
        } => {
            let checker = InteractionChecker::load(&cli.synonyms, &cli.interactions)
                .context("failed to load reference tables")?;

            let request = CheckRequest {
                new_drug,
                current,
                patient_name,
                age,
                doctor_name,
            };
            let response = checker.check(&request);

            if save {
                let db = Database::open(&cli.db)
                    .with_context(|| format!("failed to open {}", cli.db.display()))?;
                let visit = Visit::new(&request, &response);
                db.insert_visit(&visit)?;
                tracing::info!("visit {} saved", visit.visit_id);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Suggest { query, limit } => {
            let checker = InteractionChecker::load(&cli.synonyms, &cli.interactions)
                .context("failed to load reference tables")?;
            let suggestions = checker.suggestions(&query, limit);
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
        }

        Commands::History { limit } => {
            let db = Database::open(&cli.db)
                .with_context(|| format!("failed to open {}", cli.db.display()))?;
            let visits = db.list_recent_visits(limit)?;
            println!("{}", serde_json::to_string_pretty(&visits)?);
        }
    }

    Ok(())
}
