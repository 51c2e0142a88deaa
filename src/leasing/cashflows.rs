//! Cash-flow ledger and KPI output structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::schedule::PaymentScheduleEntry;

/// One period of the lessor's cash-flow ledger. Period 0 is the initial investment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowEntry {
    pub period: u32,
    pub date: NaiveDate,

    pub inflow: f64,
    pub outflow: f64,

    /// inflow − outflow
    pub net_cash_flow: f64,

    /// Sum of net flows for periods 0..=period
    pub cumulative_cash_flow: f64,

    /// This period's net flow discounted to period 0
    pub present_value: f64,
    pub cumulative_npv: f64,
}

/// Serde adapter for payback periods: `f64::INFINITY` (never recovered) is
/// written as `null` and read back from `null`, which JSON and CSV can carry.
pub(crate) mod payback_months {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(months: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        let value = if *months == f64::INFINITY { None } else { Some(*months) };
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// Monthly rent and what it is made of
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RentBreakdown {
    pub base_amortization: f64,
    pub lessor_profit: f64,
    pub fixed_fee: f64,
    pub total: f64,
}

/// Complete leasing calculation result
///
/// `payback_period` is `f64::INFINITY` when cumulative cash flow never turns
/// non-negative. `irr` and `irr_periodic` are whatever the solver reached;
/// `irr_converged` says whether that was a root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeasingResults {
    pub net_present_value: f64,

    /// Annualized IRR (decimal)
    pub irr: f64,
    /// Monthly IRR (decimal)
    pub irr_periodic: f64,
    pub irr_converged: bool,

    /// Months until cumulative cash flow is recovered, interpolated.
    /// Written as `null` when never recovered.
    #[serde(with = "payback_months")]
    pub payback_period: f64,

    /// Terminal cumulative cash flow
    pub total_profit: f64,

    pub rent: RentBreakdown,
    pub residual_value: f64,
    pub security_deposit: f64,
    pub admin_commission: f64,

    /// Investor-facing loan schedule
    pub loan_schedule: Vec<PaymentScheduleEntry>,

    /// Client-facing schedule: asset cost amortized at the margin down to the residual value
    pub client_schedule: Vec<PaymentScheduleEntry>,

    /// Periods 0..=N
    pub cash_flows: Vec<CashFlowEntry>,
}

impl LeasingResults {
    /// Net flows for periods 0..=N
    pub fn net_flows(&self) -> Vec<f64> {
        self.cash_flows.iter().map(|e| e.net_cash_flow).collect()
    }

    pub fn is_recovered(&self) -> bool {
        self.payback_period.is_finite()
    }

    /// Payment on the first loan period, 0 without a loan
    pub fn loan_payment(&self) -> f64 {
        self.loan_schedule.first().map(|e| e.payment).unwrap_or(0.0)
    }

    pub fn total_loan_interest(&self) -> f64 {
        crate::schedule::total_interest(&self.loan_schedule)
    }
}
