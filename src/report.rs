//! Report output: summaries stamped with a caller-supplied as-of time, and CSV export

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::Result;
use crate::investors::InvestorReturn;
use crate::leasing::{CashFlowEntry, LeasingParameters, LeasingResults};
use crate::schedule::PaymentScheduleEntry;

/// Headline view of one leasing calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseSummary {
    /// When the report was produced; never read from the clock here
    pub as_of: NaiveDateTime,
    pub start_date: NaiveDate,
    pub term_months: u32,

    pub asset_cost: f64,
    pub monthly_rent: f64,
    pub loan_payment: f64,
    pub total_loan_interest: f64,
    pub residual_value: f64,
    pub security_deposit: f64,

    pub net_present_value: f64,
    pub irr: f64,
    pub irr_converged: bool,

    /// `None` when the investment is never recovered
    pub payback_period: Option<f64>,
    pub total_profit: f64,
}

impl LeaseSummary {
    pub fn new(
        params: &LeasingParameters,
        results: &LeasingResults,
        start_date: NaiveDate,
        as_of: NaiveDateTime,
    ) -> Self {
        Self {
            as_of,
            start_date,
            term_months: params.term_months,
            asset_cost: params.asset_cost,
            monthly_rent: results.rent.total,
            loan_payment: results.loan_payment(),
            total_loan_interest: results.total_loan_interest(),
            residual_value: results.residual_value,
            security_deposit: results.security_deposit,
            net_present_value: results.net_present_value,
            irr: results.irr,
            irr_converged: results.irr_converged,
            payback_period: results.is_recovered().then_some(results.payback_period),
            total_profit: results.total_profit,
        }
    }
}

/// Flat row for investor CSV export
#[derive(Debug, Serialize)]
struct InvestorRow<'a> {
    investor_id: &'a str,
    name: &'a str,
    contribution: f64,
    share: f64,
    total_return: f64,
    total_interest: f64,
    roi: f64,
}

/// Write a payment schedule as CSV with a header row
pub fn write_schedule_csv<W: Write>(writer: W, entries: &[PaymentScheduleEntry]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for entry in entries {
        csv.serialize(entry)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write a cash-flow ledger as CSV with a header row
pub fn write_cash_flows_csv<W: Write>(writer: W, entries: &[CashFlowEntry]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for entry in entries {
        csv.serialize(entry)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write one row per investor (per-period detail is left out)
pub fn write_investor_returns_csv<W: Write>(writer: W, returns: &[InvestorReturn]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for r in returns {
        csv.serialize(InvestorRow {
            investor_id: &r.investor_id,
            name: &r.name,
            contribution: r.contribution,
            share: r.share,
            total_return: r.total_return,
            total_interest: r.total_interest,
            roi: r.roi,
        })?;
    }
    csv.flush()?;
    Ok(())
}
