//! Leasing deal inputs and the rent figures derived from them

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{require_finite, require_non_negative, EngineError, Result};
use crate::schedule::{Frequency, LoanParameters};

/// Economics of one lease and the loan that funds it.
///
/// Percentages are given in percent (15.0 = 15%). Amounts are in a single
/// currency unit; `asset_cost` excludes tax.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeasingParameters {
    pub asset_cost: f64,

    /// Lessor's target annual margin on the asset cost
    pub annual_margin_pct: f64,

    pub fixed_monthly_fee: f64,

    /// One-off commission on the asset cost, collected at signing
    pub admin_commission_pct: f64,

    /// Months of rent held as a security deposit, returned at term end
    pub security_deposit_term: u32,

    pub delivery_costs: f64,
    pub other_initial_expenses: f64,
    pub monthly_operating_expenses: f64,

    /// Residual value as a percent of the asset cost
    pub residual_value_pct: f64,

    /// Annual discount rate for NPV
    pub discount_rate_pct: f64,

    /// Lease term in months
    pub term_months: u32,

    /// Investor-facing loan advanced at signing
    pub loan_amount: f64,
    pub loan_rate_pct: f64,

    /// Loan term in months; the lease term when absent
    pub loan_term_months: Option<u32>,

    pub loan_frequency: Frequency,
}

impl LeasingParameters {
    /// Lessor's monthly profit: `asset_cost · margin / 12`
    pub fn lessor_monthly_profit(&self) -> f64 {
        self.asset_cost * self.annual_margin_pct / 100.0 / 12.0
    }

    /// Straight-line recovery of the asset cost per month; 0 for a zero-length term
    pub fn base_rent_amortization(&self) -> f64 {
        if self.term_months == 0 {
            0.0
        } else {
            self.asset_cost / self.term_months as f64
        }
    }

    /// Rent charged to the client each month
    pub fn total_monthly_rent(&self) -> f64 {
        self.base_rent_amortization() + self.lessor_monthly_profit() + self.fixed_monthly_fee
    }

    pub fn residual_value(&self) -> f64 {
        self.asset_cost * self.residual_value_pct / 100.0
    }

    pub fn admin_commission(&self) -> f64 {
        self.asset_cost * self.admin_commission_pct / 100.0
    }

    pub fn security_deposit(&self) -> f64 {
        self.security_deposit_term as f64 * self.total_monthly_rent()
    }

    /// Periodic discount rate applied to monthly flows
    pub fn monthly_discount_rate(&self) -> f64 {
        self.discount_rate_pct / 100.0 / 12.0
    }

    pub fn effective_loan_term(&self) -> u32 {
        self.loan_term_months.unwrap_or(self.term_months)
    }

    /// The funding loan as amortization input
    pub fn loan(&self, start_date: NaiveDate) -> LoanParameters {
        LoanParameters::new(
            self.loan_amount,
            self.loan_rate_pct,
            self.effective_loan_term(),
            self.loan_frequency,
            start_date,
        )
    }

    /// Boundary validation; the engine itself accepts anything
    pub fn validate(&self) -> Result<()> {
        require_non_negative("asset_cost", self.asset_cost)?;
        require_finite("annual_margin_pct", self.annual_margin_pct)?;
        require_non_negative("fixed_monthly_fee", self.fixed_monthly_fee)?;
        require_non_negative("admin_commission_pct", self.admin_commission_pct)?;
        require_non_negative("delivery_costs", self.delivery_costs)?;
        require_non_negative("other_initial_expenses", self.other_initial_expenses)?;
        require_non_negative("monthly_operating_expenses", self.monthly_operating_expenses)?;
        require_non_negative("residual_value_pct", self.residual_value_pct)?;
        require_finite("discount_rate_pct", self.discount_rate_pct)?;
        require_non_negative("loan_amount", self.loan_amount)?;
        require_finite("loan_rate_pct", self.loan_rate_pct)?;

        if self.term_months == 0 {
            return Err(EngineError::invalid("term_months", "must be at least 1"));
        }
        if self.residual_value_pct > 100.0 {
            return Err(EngineError::invalid("residual_value_pct", "must not exceed 100"));
        }
        if self.discount_rate_pct <= -1200.0 {
            return Err(EngineError::invalid("discount_rate_pct", "monthly discount factor would be non-positive"));
        }
        if self.loan_amount > 0.0 {
            self.loan(NaiveDate::MIN).validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn params() -> LeasingParameters {
        LeasingParameters {
            asset_cost: 500_000.0,
            annual_margin_pct: 15.0,
            fixed_monthly_fee: 1_000.0,
            admin_commission_pct: 2.0,
            security_deposit_term: 2,
            residual_value_pct: 20.0,
            discount_rate_pct: 6.0,
            term_months: 36,
            loan_amount: 400_000.0,
            loan_rate_pct: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_rent_components() {
        let p = params();
        assert_abs_diff_eq!(p.lessor_monthly_profit(), 6_250.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.base_rent_amortization(), 500_000.0 / 36.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.total_monthly_rent(), 500_000.0 / 36.0 + 7_250.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.security_deposit(), 2.0 * p.total_monthly_rent(), epsilon = 1e-9);
        assert_abs_diff_eq!(p.residual_value(), 100_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.admin_commission(), 10_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_term_rent_has_no_amortization() {
        let p = LeasingParameters { term_months: 0, ..params() };
        assert_eq!(p.base_rent_amortization(), 0.0);
        assert!(p.total_monthly_rent().is_finite());
    }

    #[test]
    fn test_loan_term_defaults_to_lease_term() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let p = params();
        assert_eq!(p.loan(start).term_months, 36);

        let p = LeasingParameters { loan_term_months: Some(24), ..params() };
        assert_eq!(p.loan(start).term_months, 24);
    }

    #[test]
    fn test_validate() {
        assert!(params().validate().is_ok());
        assert!(LeasingParameters { term_months: 0, ..params() }.validate().is_err());
        assert!(LeasingParameters { residual_value_pct: 120.0, ..params() }.validate().is_err());
        assert!(LeasingParameters { asset_cost: f64::NAN, ..params() }.validate().is_err());
    }
}
