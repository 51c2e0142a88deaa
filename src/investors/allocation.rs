//! Pro-rata allocation of a loan schedule across capital contributors

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::schedule::PaymentScheduleEntry;

/// Which part of each scheduled payment is shared out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationBasis {
    /// Interest only; principal is returned as the contribution itself
    #[default]
    Interest,
    /// Whole payment, principal included
    Payment,
}

/// One investor's stake in the pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub investor_id: String,
    pub name: String,
    pub amount: f64,
}

impl Contribution {
    pub fn new(investor_id: impl Into<String>, name: impl Into<String>, amount: f64) -> Self {
        Self {
            investor_id: investor_id.into(),
            name: name.into(),
            amount,
        }
    }
}

/// Amount allocated to one investor for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReturn {
    pub period: u32,
    pub date: NaiveDate,
    pub amount: f64,
}

/// Returns attributable to one investor over a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorReturn {
    pub investor_id: String,
    pub name: String,
    pub contribution: f64,

    /// contribution / total contributions
    pub share: f64,

    pub period_returns: Vec<PeriodReturn>,

    /// Interest basis: contribution + allocated interest. Payment basis: allocated payments.
    pub total_return: f64,

    /// Interest earned on the share, whatever the basis
    pub total_interest: f64,

    /// total_interest / contribution (0 for a zero contribution)
    pub roi: f64,
}

/// Allocate a schedule's interest to one investor.
///
/// `share` is 0 when `total_contributions` is 0.
pub fn allocate(
    contribution: f64,
    total_contributions: f64,
    schedule: &[PaymentScheduleEntry],
    investor_id: &str,
    name: &str,
) -> InvestorReturn {
    allocate_with_basis(
        contribution,
        total_contributions,
        schedule,
        investor_id,
        name,
        AllocationBasis::Interest,
    )
}

/// Allocate a schedule to one investor on the given basis
pub fn allocate_with_basis(
    contribution: f64,
    total_contributions: f64,
    schedule: &[PaymentScheduleEntry],
    investor_id: &str,
    name: &str,
    basis: AllocationBasis,
) -> InvestorReturn {
    let share = if total_contributions == 0.0 {
        0.0
    } else {
        contribution / total_contributions
    };

    let period_returns: Vec<PeriodReturn> = schedule
        .iter()
        .map(|entry| {
            let base = match basis {
                AllocationBasis::Interest => entry.interest,
                AllocationBasis::Payment => entry.payment,
            };
            PeriodReturn {
                period: entry.period,
                date: entry.date,
                amount: base * share,
            }
        })
        .collect();

    let allocated: f64 = period_returns.iter().map(|r| r.amount).sum();
    let total_interest = match basis {
        AllocationBasis::Interest => allocated,
        AllocationBasis::Payment => schedule.iter().map(|e| e.interest * share).sum(),
    };
    let total_return = match basis {
        AllocationBasis::Interest => contribution + allocated,
        AllocationBasis::Payment => allocated,
    };
    let roi = if contribution == 0.0 {
        0.0
    } else {
        total_interest / contribution
    };

    InvestorReturn {
        investor_id: investor_id.to_string(),
        name: name.to_string(),
        contribution,
        share,
        period_returns,
        total_return,
        total_interest,
        roi,
    }
}

/// Allocate a schedule across every contributor in the pool
pub fn allocate_pool(
    contributions: &[Contribution],
    schedule: &[PaymentScheduleEntry],
    basis: AllocationBasis,
) -> Vec<InvestorReturn> {
    let total: f64 = contributions.iter().map(|c| c.amount).sum();
    contributions
        .iter()
        .map(|c| allocate_with_basis(c.amount, total, schedule, &c.investor_id, &c.name, basis))
        .collect()
}

/// Check that contributions are non-negative and add up to the loan principal
/// within `tolerance`
pub fn validate_pool(contributions: &[Contribution], principal: f64, tolerance: f64) -> Result<()> {
    for c in contributions {
        if !c.amount.is_finite() || c.amount < 0.0 {
            return Err(EngineError::invalid(
                "contribution amount",
                format!("investor {} has {}", c.investor_id, c.amount),
            ));
        }
    }

    let contributed: f64 = contributions.iter().map(|c| c.amount).sum();
    if (contributed - principal).abs() > tolerance {
        return Err(EngineError::ContributionMismatch { contributed, principal });
    }
    Ok(())
}

/// Totals across all investors of a pool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub investors: usize,
    pub total_contribution: f64,
    pub share_sum: f64,
    pub total_return: f64,
    pub total_interest: f64,
}

impl PoolSummary {
    pub fn from_returns(returns: &[InvestorReturn]) -> Self {
        Self {
            investors: returns.len(),
            total_contribution: returns.iter().map(|r| r.contribution).sum(),
            share_sum: returns.iter().map(|r| r.share).sum(),
            total_return: returns.iter().map(|r| r.total_return).sum(),
            total_interest: returns.iter().map(|r| r.total_interest).sum(),
        }
    }
}
