//! Scenario runner for batch and sensitivity calculations
//!
//! Every calculation is a pure function of its inputs, so independent deals and
//! parameter variants run in parallel without coordination.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::leasing::{LeaseInput, LeasingEngine, LeasingParameters, LeasingResults};

/// Headline figures for one deal in a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseKpis {
    pub lease_id: String,
    pub net_present_value: f64,
    pub irr: f64,
    pub irr_converged: bool,
    #[serde(with = "crate::leasing::payback_months")]
    pub payback_period: f64,
    pub total_profit: f64,
    pub monthly_rent: f64,
}

impl LeaseKpis {
    pub fn from_results(lease_id: &str, results: &LeasingResults) -> Self {
        Self {
            lease_id: lease_id.to_string(),
            net_present_value: results.net_present_value,
            irr: results.irr,
            irr_converged: results.irr_converged,
            payback_period: results.payback_period,
            total_profit: results.total_profit,
            monthly_rent: results.rent.total,
        }
    }
}

/// Runner holding one configuration for many calculations
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let curve = runner.run_sensitivity(&params, start, &[4.0, 6.0, 8.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: LeasingEngine,
}

impl ScenarioRunner {
    /// Runner with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            engine: config.leasing_engine(),
        }
    }

    pub fn engine(&self) -> &LeasingEngine {
        &self.engine
    }

    /// Run a single calculation
    pub fn run(&self, params: &LeasingParameters, start_date: NaiveDate) -> LeasingResults {
        self.engine.compute(params, start_date)
    }

    /// Run every deal, in input order
    pub fn run_batch(&self, leases: &[LeaseInput]) -> Vec<LeasingResults> {
        leases
            .par_iter()
            .map(|lease| self.engine.compute(&lease.params, lease.start_date))
            .collect()
    }

    /// Validate and run every deal; one result per deal, in input order
    pub fn run_batch_checked(&self, leases: &[LeaseInput]) -> Vec<Result<LeasingResults>> {
        leases
            .par_iter()
            .map(|lease| self.engine.compute_checked(&lease.params, lease.start_date))
            .collect()
    }

    /// KPIs for every deal
    pub fn batch_kpis(&self, leases: &[LeaseInput]) -> Vec<LeaseKpis> {
        leases
            .par_iter()
            .map(|lease| {
                let results = self.engine.compute(&lease.params, lease.start_date);
                LeaseKpis::from_results(&lease.lease_id, &results)
            })
            .collect()
    }

    /// Re-run one deal at each discount rate (percent)
    pub fn run_sensitivity(
        &self,
        params: &LeasingParameters,
        start_date: NaiveDate,
        discount_rates_pct: &[f64],
    ) -> Vec<LeasingResults> {
        discount_rates_pct
            .par_iter()
            .map(|&rate| {
                let variant = LeasingParameters {
                    discount_rate_pct: rate,
                    ..params.clone()
                };
                self.engine.compute(&variant, start_date)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn deal(id: &str, asset_cost: f64) -> LeaseInput {
        LeaseInput {
            lease_id: id.to_string(),
            start_date: start(),
            params: LeasingParameters {
                asset_cost,
                annual_margin_pct: 12.0,
                fixed_monthly_fee: 200.0,
                residual_value_pct: 10.0,
                discount_rate_pct: 6.0,
                term_months: 24,
                loan_amount: asset_cost * 0.8,
                loan_rate_pct: 8.0,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_batch_preserves_order() {
        let runner = ScenarioRunner::new();
        let leases = vec![deal("a", 10_000.0), deal("b", 50_000.0), deal("c", 90_000.0)];

        let kpis = runner.batch_kpis(&leases);
        let ids: Vec<&str> = kpis.iter().map(|k| k.lease_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);

        let results = runner.run_batch(&leases);
        assert_eq!(results.len(), 3);
        assert_eq!(results[1].net_present_value, kpis[1].net_present_value);
    }

    #[test]
    fn test_higher_discount_rate_lowers_npv() {
        let runner = ScenarioRunner::new();
        let lease = deal("s", 60_000.0);

        let curve = runner.run_sensitivity(&lease.params, start(), &[2.0, 6.0, 12.0]);
        assert_eq!(curve.len(), 3);
        // Profit is discount-independent; NPV falls as the rate rises for a profitable deal
        assert_eq!(curve[0].total_profit, curve[2].total_profit);
        assert!(curve[0].net_present_value > curve[2].net_present_value);
    }

    #[test]
    fn test_unrecovered_kpis_round_trip_through_csv() {
        let mut lease = deal("loss", 10_000.0);
        lease.params.monthly_operating_expenses = 50_000.0;
        let kpis = ScenarioRunner::new().batch_kpis(&[lease]);
        assert!(kpis[0].payback_period.is_infinite());

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(&kpis[0]).unwrap();
        let bytes = writer.into_inner().unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let back: LeaseKpis = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(back.lease_id, "loss");
        assert!(back.payback_period.is_infinite());
    }

    #[test]
    fn test_checked_batch_reports_bad_deal() {
        let runner = ScenarioRunner::new();
        let mut bad = deal("bad", 10_000.0);
        bad.params.term_months = 0;

        let results = runner.run_batch_checked(&[deal("ok", 10_000.0), bad]);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
