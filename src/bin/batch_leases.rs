//! Run every deal in a leases CSV and write one KPI row per deal
//!
//! Reads LEASES_CSV (default leases.csv) and writes KPIS_OUTPUT
//! (default lease_kpis.csv). Engine settings come from LEASING_* variables.

use anyhow::{Context, Result};
use leasing_engine::leasing::load_leases;
use leasing_engine::scenario::LeaseKpis;
use leasing_engine::{EngineConfig, EngineError, ScenarioRunner};
use log::{info, warn};
use std::env;
use std::time::Instant;

fn main() -> Result<()> {
    env_logger::init();

    let input_path = env::var("LEASES_CSV").unwrap_or_else(|_| "leases.csv".to_string());
    let output_path = env::var("KPIS_OUTPUT").unwrap_or_else(|_| "lease_kpis.csv".to_string());

    let config = EngineConfig::from_env().context("reading LEASING_* environment")?;
    let runner = ScenarioRunner::with_config(&config);

    let start = Instant::now();
    println!("Loading leases from {}...", input_path);
    let leases = load_leases(&input_path).with_context(|| format!("loading {}", input_path))?;
    println!("Loaded {} leases in {:?}", leases.len(), start.elapsed());

    let calc_start = Instant::now();
    let mut kpis: Vec<LeaseKpis> = Vec::with_capacity(leases.len());
    let mut rejected = 0usize;
    let mut unconverged = 0usize;
    for (lease, result) in leases.iter().zip(runner.run_batch_checked(&leases)) {
        match result {
            Ok(results) => kpis.push(LeaseKpis::from_results(&lease.lease_id, &results)),
            Err(e) => {
                warn!("skipping lease {}: {}", lease.lease_id, e);
                if matches!(e, EngineError::IrrNotConverged { .. }) {
                    unconverged += 1;
                }
                rejected += 1;
            }
        }
    }
    info!("computed {} leases in {:?}", kpis.len(), calc_start.elapsed());

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {}", output_path))?;
    for row in &kpis {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("Output written to {}", output_path);

    let total_npv: f64 = kpis.iter().map(|k| k.net_present_value).sum();
    let total_profit: f64 = kpis.iter().map(|k| k.total_profit).sum();
    let never_recovered = kpis.iter().filter(|k| k.payback_period.is_infinite()).count();

    println!("\nBatch Summary:");
    println!("  Leases:           {} ({} rejected)", kpis.len(), rejected);
    println!("  Total NPV:        {:.2}", total_npv);
    println!("  Total Profit:     {:.2}", total_profit);
    println!("  IRR unconverged:  {}", unconverged);
    println!("  Never recovered:  {}", never_recovered);

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
