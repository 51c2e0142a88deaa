//! Loan inputs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::period::Frequency;
use crate::error::{require_finite, require_non_negative, EngineError, Result};

/// Terms of an amortizing loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    pub principal: f64,

    /// Annual nominal interest rate in percent (12.0 = 12%)
    pub annual_rate_pct: f64,

    /// Loan term in calendar months; the number of payments follows from `frequency`
    pub term_months: u32,

    #[serde(default)]
    pub frequency: Frequency,

    pub start_date: NaiveDate,
}

impl LoanParameters {
    pub fn new(
        principal: f64,
        annual_rate_pct: f64,
        term_months: u32,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            principal,
            annual_rate_pct,
            term_months,
            frequency,
            start_date,
        }
    }

    /// Monthly loan with the given terms
    pub fn monthly(principal: f64, annual_rate_pct: f64, term_months: u32, start_date: NaiveDate) -> Self {
        Self::new(principal, annual_rate_pct, term_months, Frequency::Monthly, start_date)
    }

    /// Boundary check for callers that want errors instead of NaN/Infinity outputs
    pub fn validate(&self) -> Result<()> {
        require_non_negative("principal", self.principal)?;
        require_finite("annual_rate_pct", self.annual_rate_pct)?;
        if self.annual_rate_pct <= -100.0 {
            return Err(EngineError::invalid("annual_rate_pct", "must be greater than -100"));
        }
        if self.term_months == 0 {
            return Err(EngineError::invalid("term_months", "must be at least 1"));
        }
        Ok(())
    }

    /// Additionally check that a balloon/residual target is reachable
    pub fn validate_residual(&self, residual_value: f64) -> Result<()> {
        self.validate()?;
        require_non_negative("residual_value", residual_value)?;
        if residual_value > self.principal {
            return Err(EngineError::invalid(
                "residual_value",
                format!("{:.2} exceeds principal {:.2}", residual_value, self.principal),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_validate_accepts_zero_rate() {
        let loan = LoanParameters::monthly(120_000.0, 0.0, 12, start());
        assert!(loan.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_term() {
        let loan = LoanParameters::monthly(120_000.0, 5.0, 0, start());
        assert!(loan.validate().is_err());
    }

    #[test]
    fn test_validate_residual_bounds() {
        let loan = LoanParameters::monthly(100_000.0, 5.0, 36, start());
        assert!(loan.validate_residual(20_000.0).is_ok());
        assert!(loan.validate_residual(150_000.0).is_err());
        assert!(loan.validate_residual(-1.0).is_err());
    }

    #[test]
    fn test_frequency_defaults_when_missing() {
        let json = r#"{"principal":1000.0,"annual_rate_pct":5.0,"term_months":12,"start_date":"2024-01-01"}"#;
        let loan: LoanParameters = serde_json::from_str(json).unwrap();
        assert_eq!(loan.frequency, Frequency::Monthly);
    }
}
