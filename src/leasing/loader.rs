//! Load leasing deals from CSV
//!
//! Expected header. Columns other than LeaseId, StartDate, AssetCost, MarginPct
//! and TermMonths may be omitted; LoanTermMonths and LoanFrequency may be empty.
//! `LeaseId,StartDate,AssetCost,MarginPct,FixedFee,AdminCommissionPct,DepositTerm,
//! DeliveryCosts,OtherInitialExpenses,MonthlyOpEx,ResidualPct,DiscountRatePct,
//! TermMonths,LoanAmount,LoanRatePct,LoanTermMonths,LoanFrequency`

use chrono::NaiveDate;
use csv::Reader;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::params::LeasingParameters;
use crate::error::Result;
use crate::schedule::Frequency;

/// A deal as loaded: identity, start date, parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseInput {
    pub lease_id: String,
    pub start_date: NaiveDate,
    pub params: LeasingParameters,
}

/// Raw CSV row
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "LeaseId")]
    lease_id: String,
    #[serde(rename = "StartDate")]
    start_date: NaiveDate,
    #[serde(rename = "AssetCost")]
    asset_cost: f64,
    #[serde(rename = "MarginPct")]
    margin_pct: f64,
    #[serde(rename = "FixedFee", default)]
    fixed_fee: f64,
    #[serde(rename = "AdminCommissionPct", default)]
    admin_commission_pct: f64,
    #[serde(rename = "DepositTerm", default)]
    deposit_term: u32,
    #[serde(rename = "DeliveryCosts", default)]
    delivery_costs: f64,
    #[serde(rename = "OtherInitialExpenses", default)]
    other_initial_expenses: f64,
    #[serde(rename = "MonthlyOpEx", default)]
    monthly_opex: f64,
    #[serde(rename = "ResidualPct", default)]
    residual_pct: f64,
    #[serde(rename = "DiscountRatePct", default)]
    discount_rate_pct: f64,
    #[serde(rename = "TermMonths")]
    term_months: u32,
    #[serde(rename = "LoanAmount", default)]
    loan_amount: f64,
    #[serde(rename = "LoanRatePct", default)]
    loan_rate_pct: f64,
    #[serde(rename = "LoanTermMonths", default)]
    loan_term_months: Option<u32>,
    #[serde(rename = "LoanFrequency", default)]
    loan_frequency: Option<String>,
}

impl CsvRow {
    fn into_input(self) -> LeaseInput {
        let loan_frequency = self
            .loan_frequency
            .as_deref()
            .map(Frequency::parse)
            .unwrap_or_default();

        LeaseInput {
            lease_id: self.lease_id,
            start_date: self.start_date,
            params: LeasingParameters {
                asset_cost: self.asset_cost,
                annual_margin_pct: self.margin_pct,
                fixed_monthly_fee: self.fixed_fee,
                admin_commission_pct: self.admin_commission_pct,
                security_deposit_term: self.deposit_term,
                delivery_costs: self.delivery_costs,
                other_initial_expenses: self.other_initial_expenses,
                monthly_operating_expenses: self.monthly_opex,
                residual_value_pct: self.residual_pct,
                discount_rate_pct: self.discount_rate_pct,
                term_months: self.term_months,
                loan_amount: self.loan_amount,
                loan_rate_pct: self.loan_rate_pct,
                loan_term_months: self.loan_term_months,
                loan_frequency,
            },
        }
    }
}

/// Load all deals from a CSV file
pub fn load_leases<P: AsRef<Path>>(path: P) -> Result<Vec<LeaseInput>> {
    let reader = Reader::from_path(path)?;
    read_rows(reader)
}

/// Load deals from any reader (e.g., string buffer, network stream)
pub fn load_leases_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<LeaseInput>> {
    read_rows(Reader::from_reader(reader))
}

fn read_rows<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<LeaseInput>> {
    let mut leases = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        leases.push(row.into_input());
    }
    Ok(leases)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
LeaseId,StartDate,AssetCost,MarginPct,FixedFee,AdminCommissionPct,DepositTerm,DeliveryCosts,OtherInitialExpenses,MonthlyOpEx,ResidualPct,DiscountRatePct,TermMonths,LoanAmount,LoanRatePct,LoanTermMonths,LoanFrequency
L-001,2024-01-01,500000,15,1000,2,0,0,0,2000,20,6,36,400000,10,,
L-002,2024-03-15,80000,12,250,1.5,2,1200,300,150,10,7,48,60000,9,36,quarterly
";

    #[test]
    fn test_load_leases_from_reader() {
        let leases = load_leases_from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(leases.len(), 2);

        let first = &leases[0];
        assert_eq!(first.lease_id, "L-001");
        assert_eq!(first.params.term_months, 36);
        assert_eq!(first.params.loan_term_months, None);
        assert_eq!(first.params.loan_frequency, Frequency::Monthly);

        let second = &leases[1];
        assert_eq!(second.start_date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(second.params.security_deposit_term, 2);
        assert_eq!(second.params.loan_term_months, Some(36));
        assert_eq!(second.params.loan_frequency, Frequency::Quarterly);
    }

    #[test]
    fn test_bad_row_is_an_error() {
        let bad = "LeaseId,StartDate,AssetCost,MarginPct,TermMonths\nX,not-a-date,1,1,1\n";
        assert!(load_leases_from_reader(bad.as_bytes()).is_err());
    }
}
