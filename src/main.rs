//! Diet Planner - Entry Point
//!
//! Loads a catalog snapshot, filters and prices it, solves the diet model
//! and prints the selected consumables with gross and net profit.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use ordered_float::OrderedFloat;
use tracing_subscriber::EnvFilter;

use diet_planner::catalog::StaticCatalog;
use diet_planner::core::config::PlannerConfig;
use diet_planner::core::error::Result;
use diet_planner::diet::{DietPlanner, MicroLpSolver};

/// Diet Planner - choose what to eat, drink and chew for the most profit
#[derive(Parser, Debug)]
#[command(name = "diet-planner")]
#[command(about = "Optimize an organ-constrained consumption plan")]
struct Args {
    /// Catalog snapshot (.toml or .json)
    #[arg(long)]
    catalog: PathBuf,

    /// Planner configuration (run parameters, thresholds, registry)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Turns banked before consuming anything
    #[arg(long)]
    starting_turns: Option<u32>,

    /// Payoff per turn
    #[arg(long)]
    meat_per_turn: Option<f64>,

    /// Base payoff scaled by meat-drop effects
    #[arg(long)]
    base_meat: Option<f64>,

    /// Chance a turn benefits from a bonus effect
    #[arg(long)]
    combat_chance: Option<f64>,

    /// Stomach capacity
    #[arg(long)]
    stomach: Option<u32>,

    /// Liver capacity
    #[arg(long)]
    liver: Option<u32>,

    /// Spleen capacity
    #[arg(long)]
    spleen: Option<u32>,

    /// Threads used for price lookups
    #[arg(long)]
    jobs: Option<usize>,

    /// Write the model as an LP dump before solving
    #[arg(long)]
    dump_lp: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<(PlannerConfig, PathBuf, Option<PathBuf>)> {
        let mut config = match &self.config {
            Some(path) => PlannerConfig::load_from_toml(path)?,
            None => PlannerConfig::default(),
        };

        let run = &mut config.run;
        if let Some(v) = self.starting_turns {
            run.starting_turns = v;
        }
        if let Some(v) = self.meat_per_turn {
            run.meat_per_turn = v;
        }
        if let Some(v) = self.base_meat {
            run.base_meat = v;
        }
        if let Some(v) = self.combat_chance {
            run.combat_chance = v;
        }
        if let Some(v) = self.stomach {
            run.organ_limits.stomach = v;
        }
        if let Some(v) = self.liver {
            run.organ_limits.liver = v;
        }
        if let Some(v) = self.spleen {
            run.organ_limits.spleen = v;
        }
        if let Some(v) = self.jobs {
            config.price_jobs = v;
        }

        Ok((config, self.catalog, self.dump_lp))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("diet_planner=info")),
        )
        .init();

    let (config, catalog_path, dump_lp) = Args::parse().into_config()?;
    let catalog = StaticCatalog::load(&catalog_path)?;
    tracing::info!("Loaded {} resources from {}", catalog.len(), catalog_path.display());

    let planner = DietPlanner::new(config)?;
    let prepared = planner.prepare(&catalog)?;

    if let Some(path) = dump_lp {
        let mut out = BufWriter::new(File::create(&path)?);
        prepared.model.write_lp(&mut out)?;
        out.flush()?;
        tracing::info!("Wrote model to {}", path.display());
    }

    let run = planner.solve(prepared, &MicroLpSolver)?;
    let params = &planner.config().run;

    let mut entries: Vec<_> = run.plan.entries().iter().collect();
    entries.sort_by_key(|e| std::cmp::Reverse(OrderedFloat(e.profit(&run.prices, params))));

    println!("\n=== DIET ===");
    for entry in entries {
        let price = entry
            .unit_price(&run.prices)
            .map_or_else(|| "unpriced".to_string(), |p| format!("{:.0}", p));
        println!(
            "  {:>3} x {:<40} {:>6.1} adv  @ {:>10}",
            entry.quantity,
            entry.consumable.to_string(),
            entry.adventures(),
            price
        );
    }

    if run.plan.is_empty() {
        println!("  (nothing worth consuming)");
    }

    println!();
    println!("Adventures gained: {:.0}", run.plan.total_adventures());
    println!("Acquisition cost:  {:.0}", run.plan.total_cost(&run.prices));
    println!("Gross profit:      {:.0}", run.plan.gross_profit(&run.prices));
    println!("Net profit:        {:.0}", run.plan.net_profit());

    Ok(())
}
