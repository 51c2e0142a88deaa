//! Leasing cash-flow engine: monthly ledger, NPV, IRR and payback

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use super::cashflows::{CashFlowEntry, LeasingResults, RentBreakdown};
use super::params::LeasingParameters;
use super::state::LedgerState;
use crate::error::{EngineError, Result};
use crate::schedule::{
    generate_schedule_with_residual, next_payment_date, AmortizationEngine, Frequency,
    PaymentScheduleEntry,
};
use crate::solver::{annualize, solve_irr_with, IrrAnnualization, SolverConfig};

/// Variant switches for the leasing calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeasingConfig {
    /// Add VAT on the asset cost to the period-0 outflow
    pub vat_on_asset_cost: bool,

    /// VAT rate in percent, used when `vat_on_asset_cost` is set
    pub vat_rate_pct: f64,

    /// Amortize the loan down to the residual value and repay that balloon at term end
    pub balloon_residual: bool,

    /// How the monthly IRR is annualized
    pub irr_annualization: IrrAnnualization,
}

impl Default for LeasingConfig {
    fn default() -> Self {
        Self {
            vat_on_asset_cost: false,
            vat_rate_pct: 0.0,
            balloon_residual: false,
            irr_annualization: IrrAnnualization::Effective,
        }
    }
}

/// Months until cumulative net cash flow first turns non-negative.
///
/// The crossing is interpolated linearly inside the recovering period: with
/// cumulative −500 after period 3 and a net flow of +700 in period 4 the result
/// is 3 + 500/700. Returns 0 when period 0 is already non-negative and
/// `f64::INFINITY` when the flows never recover.
pub fn payback_period(net_flows: &[f64]) -> f64 {
    let mut cumulative = 0.0;

    for (period, &flow) in net_flows.iter().enumerate() {
        let previous = cumulative;
        cumulative += flow;

        if cumulative >= 0.0 {
            if period == 0 {
                return 0.0;
            }
            // previous < 0 and the flow brought it to >= 0, so flow > 0
            return (period - 1) as f64 + (-previous / flow);
        }
    }

    f64::INFINITY
}

/// Leasing engine
#[derive(Debug, Clone, Default)]
pub struct LeasingEngine {
    config: LeasingConfig,
    solver: SolverConfig,
}

impl LeasingEngine {
    pub fn new(config: LeasingConfig, solver: SolverConfig) -> Self {
        Self { config, solver }
    }

    pub fn config(&self) -> &LeasingConfig {
        &self.config
    }

    pub fn solver(&self) -> &SolverConfig {
        &self.solver
    }

    /// Investor-facing loan schedule for the deal
    pub fn loan_schedule(&self, params: &LeasingParameters, start_date: NaiveDate) -> Vec<PaymentScheduleEntry> {
        if params.loan_amount == 0.0 {
            return Vec::new();
        }
        let loan = params.loan(start_date);
        let engine = if self.config.balloon_residual {
            let balloon = params.residual_value().min(params.loan_amount);
            AmortizationEngine::with_residual(loan, balloon)
        } else {
            AmortizationEngine::new(loan)
        };
        engine.schedule()
    }

    /// Run the full calculation. Never fails; non-finite inputs give non-finite outputs.
    pub fn compute(&self, params: &LeasingParameters, start_date: NaiveDate) -> LeasingResults {
        let term = params.term_months;

        let rent = RentBreakdown {
            base_amortization: params.base_rent_amortization(),
            lessor_profit: params.lessor_monthly_profit(),
            fixed_fee: params.fixed_monthly_fee,
            total: params.total_monthly_rent(),
        };
        let residual_value = params.residual_value();
        let security_deposit = params.security_deposit();
        let admin_commission = params.admin_commission();

        let loan_schedule = self.loan_schedule(params, start_date);
        let (loan_outflows, loan_payoff) = loan_outflows_by_month(&loan_schedule, params, term);

        let client_schedule = generate_schedule_with_residual(
            params.asset_cost,
            params.annual_margin_pct,
            term,
            start_date,
            residual_value,
            Frequency::Monthly,
        );

        debug!(
            "leasing: asset {:.2}, term {}, rent {:.2}, loan {:.2} ({} payments), residual {:.2}",
            params.asset_cost,
            term,
            rent.total,
            params.loan_amount,
            loan_schedule.len(),
            residual_value
        );

        let mut state = LedgerState::new(params.monthly_discount_rate());
        let mut cash_flows: Vec<CashFlowEntry> = Vec::with_capacity(term as usize + 1);

        // Period 0: funding in, asset and set-up costs out
        let vat = if self.config.vat_on_asset_cost {
            params.asset_cost * self.config.vat_rate_pct / 100.0
        } else {
            0.0
        };
        let initial_inflow = params.loan_amount + admin_commission + security_deposit;
        let initial_outflow = params.asset_cost + vat + params.delivery_costs + params.other_initial_expenses;
        cash_flows.push(state.record(start_date, initial_inflow, initial_outflow));

        // Operating periods
        for month in 1..=term {
            let date = next_payment_date(start_date, month, Frequency::Monthly);
            let outflow = loan_outflows[month as usize] + params.monthly_operating_expenses;
            cash_flows.push(state.record(date, rent.total, outflow));
        }

        // Term end: residual realized, deposit returned, any remaining loan balance settled
        if let Some(last) = cash_flows.last_mut() {
            state.adjust_last(last, residual_value, security_deposit + loan_payoff);
        }

        self.summarize(cash_flows, rent, residual_value, security_deposit, admin_commission, loan_schedule, client_schedule)
    }

    #[allow(clippy::too_many_arguments)]
    fn summarize(
        &self,
        cash_flows: Vec<CashFlowEntry>,
        rent: RentBreakdown,
        residual_value: f64,
        security_deposit: f64,
        admin_commission: f64,
        loan_schedule: Vec<PaymentScheduleEntry>,
        client_schedule: Vec<PaymentScheduleEntry>,
    ) -> LeasingResults {
        let net_flows: Vec<f64> = cash_flows.iter().map(|e| e.net_cash_flow).collect();

        let net_present_value = cash_flows.last().map(|e| e.cumulative_npv).unwrap_or(0.0);
        let total_profit = cash_flows.last().map(|e| e.cumulative_cash_flow).unwrap_or(0.0);

        let irr_solution = solve_irr_with(&net_flows, self.solver.irr_guess, &self.solver);
        let irr = annualize(irr_solution.estimate, 12, self.config.irr_annualization);

        LeasingResults {
            net_present_value,
            irr,
            irr_periodic: irr_solution.estimate,
            irr_converged: irr_solution.converged,
            payback_period: payback_period(&net_flows),
            total_profit,
            rent,
            residual_value,
            security_deposit,
            admin_commission,
            loan_schedule,
            client_schedule,
            cash_flows,
        }
    }

    /// Validate inputs, compute, and reject non-finite KPIs or an IRR that is
    /// not a root of the ledger.
    ///
    /// An unrecovered investment (infinite payback) is a valid result, not an error.
    pub fn compute_checked(&self, params: &LeasingParameters, start_date: NaiveDate) -> Result<LeasingResults> {
        params.validate()?;
        if self.config.vat_on_asset_cost {
            crate::error::require_non_negative("vat_rate_pct", self.config.vat_rate_pct)?;
        }

        let results = self.compute(params, start_date);

        for (what, value) in [
            ("net_present_value", results.net_present_value),
            ("total_profit", results.total_profit),
            ("irr", results.irr),
        ] {
            if !value.is_finite() {
                return Err(EngineError::non_finite(what, value));
            }
        }
        if !results.irr_converged {
            return Err(EngineError::IrrNotConverged {
                estimate: results.irr_periodic,
            });
        }

        Ok(results)
    }
}

/// Loan payments per lease month (index 0..=term), plus the balance still owed
/// at term end.
///
/// A payment for loan period k falls in month `k · months_per_period`.
fn loan_outflows_by_month(schedule: &[PaymentScheduleEntry], params: &LeasingParameters, term: u32) -> (Vec<f64>, f64) {
    let mut outflows = vec![0.0; term as usize + 1];
    let months_per_period = params.loan_frequency.months_per_period();
    let mut outstanding = params.loan_amount;

    for entry in schedule {
        let month = entry.period.saturating_mul(months_per_period);
        if month > term {
            break;
        }
        outflows[month as usize] += entry.payment;
        outstanding = entry.balance;
    }

    (outflows, outstanding)
}

/// Leasing results with default settings
pub fn compute_leasing_results(params: &LeasingParameters, start_date: NaiveDate) -> LeasingResults {
    LeasingEngine::default().compute(params, start_date)
}
