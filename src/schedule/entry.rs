//! Amortization schedule output structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One scheduled payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentScheduleEntry {
    /// Payment number (1-indexed)
    pub period: u32,
    pub date: NaiveDate,

    /// Total payment for the period (principal + interest)
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,

    /// Outstanding balance after this payment
    pub balance: f64,
}

impl PaymentScheduleEntry {
    pub fn new(period: u32, date: NaiveDate, principal: f64, interest: f64, balance: f64) -> Self {
        Self {
            period,
            date,
            payment: principal + interest,
            principal,
            interest,
            balance,
        }
    }
}

/// Totals over a complete schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub total_periods: u32,
    pub total_payments: f64,
    pub total_principal: f64,
    pub total_interest: f64,
    pub final_balance: f64,
}

impl ScheduleSummary {
    /// Get summary statistics for a schedule
    pub fn from_entries(entries: &[PaymentScheduleEntry]) -> Self {
        let total_payments: f64 = entries.iter().map(|e| e.payment).sum();
        let total_principal: f64 = entries.iter().map(|e| e.principal).sum();
        let total_interest: f64 = entries.iter().map(|e| e.interest).sum();
        let final_balance = entries.last().map(|e| e.balance).unwrap_or(0.0);

        Self {
            total_periods: entries.len() as u32,
            total_payments,
            total_principal,
            total_interest,
            final_balance,
        }
    }
}

/// Sum of the interest component across a schedule
pub fn total_interest(entries: &[PaymentScheduleEntry]) -> f64 {
    entries.iter().map(|e| e.interest).sum()
}
