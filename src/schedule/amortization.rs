//! Annuity payment and amortization schedule generation
//!
//! Both schedule variants run the same forward loop. The last period absorbs
//! whatever floating-point drift is left so the schedule lands exactly on its
//! target balance: zero for a fully amortizing loan, the residual value otherwise.

use chrono::NaiveDate;
use log::debug;

use super::entry::{PaymentScheduleEntry, ScheduleSummary};
use super::loan::LoanParameters;
use super::period::{next_payment_date, total_periods, Frequency};

/// Rates closer to zero than this use the straight-line formulas
const ZERO_RATE_EPSILON: f64 = 1e-12;

/// Level payment that retires `principal` over `n` periods at periodic rate `r`
fn annuity_payment(principal: f64, r: f64, n: u32) -> f64 {
    if n == 0 {
        return 0.0;
    }
    if r.abs() < ZERO_RATE_EPSILON {
        return principal / n as f64;
    }
    let growth = (1.0 + r).powi(n as i32);
    principal * r * growth / (growth - 1.0)
}

/// Principal left to amortize once the residual value is discounted out
fn net_of_residual(principal: f64, residual_value: f64, r: f64, n: u32) -> f64 {
    if r.abs() < ZERO_RATE_EPSILON {
        principal - residual_value
    } else {
        principal - residual_value / (1.0 + r).powi(n as i32)
    }
}

/// Fixed per-period payment for a fully amortizing loan.
///
/// `annual_rate_pct == 0` gives `principal / periods`. A term too short to hold a
/// single period gives 0.
pub fn periodic_payment(principal: f64, annual_rate_pct: f64, term_months: u32, frequency: Frequency) -> f64 {
    let n = total_periods(term_months, frequency);
    annuity_payment(principal, frequency.periodic_rate(annual_rate_pct), n)
}

/// Fixed per-period payment for a schedule that ends on `residual_value`
pub fn periodic_payment_with_residual(
    principal: f64,
    annual_rate_pct: f64,
    term_months: u32,
    residual_value: f64,
    frequency: Frequency,
) -> f64 {
    let n = total_periods(term_months, frequency);
    let r = frequency.periodic_rate(annual_rate_pct);
    annuity_payment(net_of_residual(principal, residual_value, r, n), r, n)
}

/// Full amortization schedule ending at a zero balance
pub fn generate_schedule(
    principal: f64,
    annual_rate_pct: f64,
    term_months: u32,
    start_date: NaiveDate,
    frequency: Frequency,
) -> Vec<PaymentScheduleEntry> {
    let loan = LoanParameters::new(principal, annual_rate_pct, term_months, frequency, start_date);
    AmortizationEngine::new(loan).schedule()
}

/// Amortization schedule whose final balance equals `residual_value`
pub fn generate_schedule_with_residual(
    principal: f64,
    annual_rate_pct: f64,
    term_months: u32,
    start_date: NaiveDate,
    residual_value: f64,
    frequency: Frequency,
) -> Vec<PaymentScheduleEntry> {
    let loan = LoanParameters::new(principal, annual_rate_pct, term_months, frequency, start_date);
    AmortizationEngine::with_residual(loan, residual_value).schedule()
}

/// Amortization engine for one loan
#[derive(Debug, Clone)]
pub struct AmortizationEngine {
    loan: LoanParameters,

    /// Balance the schedule must end on
    target_balance: f64,
}

impl AmortizationEngine {
    /// Fully amortizing engine
    pub fn new(loan: LoanParameters) -> Self {
        Self {
            loan,
            target_balance: 0.0,
        }
    }

    /// Engine whose schedule ends on `residual_value` instead of zero
    pub fn with_residual(loan: LoanParameters, residual_value: f64) -> Self {
        Self {
            loan,
            target_balance: residual_value,
        }
    }

    pub fn loan(&self) -> &LoanParameters {
        &self.loan
    }

    pub fn target_balance(&self) -> f64 {
        self.target_balance
    }

    pub fn total_periods(&self) -> u32 {
        total_periods(self.loan.term_months, self.loan.frequency)
    }

    pub fn periodic_rate(&self) -> f64 {
        self.loan.frequency.periodic_rate(self.loan.annual_rate_pct)
    }

    /// Level payment for every period but (possibly) the last
    pub fn payment(&self) -> f64 {
        let n = self.total_periods();
        let r = self.periodic_rate();
        annuity_payment(net_of_residual(self.loan.principal, self.target_balance, r, n), r, n)
    }

    /// Build the schedule
    pub fn schedule(&self) -> Vec<PaymentScheduleEntry> {
        let n = self.total_periods();
        let r = self.periodic_rate();
        let payment = self.payment();
        let target = self.target_balance;

        debug!(
            "amortizing {:.2} over {} {} periods at {:.6}/period, payment {:.6}, target {:.2}",
            self.loan.principal, n, self.loan.frequency, r, payment, target
        );

        let mut entries = Vec::with_capacity(n as usize);
        let mut balance = self.loan.principal;

        for period in 1..=n {
            let date = next_payment_date(self.loan.start_date, period, self.loan.frequency);
            let interest = balance * r;

            let entry = if period == n {
                // Final period: whatever is left above the target goes out as principal
                let principal = balance - target;
                balance = target;
                PaymentScheduleEntry::new(period, date, principal, interest, balance)
            } else {
                let principal = payment - interest;
                let headroom = (balance - target).max(0.0);
                if principal > headroom {
                    // Overshoot from drift: stop at the target and shrink the payment to match
                    balance = target;
                    PaymentScheduleEntry::new(period, date, headroom, interest, balance)
                } else {
                    balance -= principal;
                    PaymentScheduleEntry {
                        period,
                        date,
                        payment,
                        principal,
                        interest,
                        balance,
                    }
                }
            };

            entries.push(entry);
        }

        entries
    }

    /// Build the schedule and its totals
    pub fn schedule_with_summary(&self) -> (Vec<PaymentScheduleEntry>, ScheduleSummary) {
        let entries = self.schedule();
        let summary = ScheduleSummary::from_entries(&entries);
        (entries, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_annuity_payment_matches_closed_form() {
        let payment = periodic_payment(100_000.0, 12.0, 12, Frequency::Monthly);
        let r: f64 = 0.01;
        let expected = 100_000.0 * r * (1.0 + r).powi(12) / ((1.0 + r).powi(12) - 1.0);
        assert_abs_diff_eq!(payment, expected, epsilon = 1e-6);
        assert_abs_diff_eq!(payment, 8884.88, epsilon = 0.01);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        assert_eq!(periodic_payment(120_000.0, 0.0, 12, Frequency::Monthly), 10_000.0);

        let schedule = generate_schedule(120_000.0, 0.0, 12, start(), Frequency::Monthly);
        assert_eq!(schedule.len(), 12);
        assert!(schedule.iter().all(|e| e.interest == 0.0));
        assert_eq!(schedule.last().unwrap().balance, 0.0);
    }

    #[test]
    fn test_zero_term_yields_empty_schedule() {
        assert_eq!(periodic_payment(10_000.0, 5.0, 0, Frequency::Monthly), 0.0);
        assert!(generate_schedule(10_000.0, 5.0, 0, start(), Frequency::Monthly).is_empty());
    }

    #[test]
    fn test_schedule_terminates_at_zero() {
        let schedule = generate_schedule(250_000.0, 7.25, 60, start(), Frequency::Monthly);
        assert_eq!(schedule.len(), 60);
        assert_eq!(schedule.last().unwrap().balance, 0.0);

        for pair in schedule.windows(2) {
            assert!(pair[1].balance <= pair[0].balance);
        }
        for entry in &schedule {
            assert_abs_diff_eq!(entry.principal + entry.interest, entry.payment, epsilon = 1e-6);
            assert!(entry.balance >= 0.0);
        }
    }

    #[test]
    fn test_quarterly_schedule_dates_and_count() {
        let schedule = generate_schedule(40_000.0, 8.0, 24, start(), Frequency::Quarterly);
        assert_eq!(schedule.len(), 8);
        assert_eq!(schedule[0].date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(schedule[7].date, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_abs_diff_eq!(schedule[0].interest, 40_000.0 * 0.02, epsilon = 1e-9);
    }

    #[test]
    fn test_residual_schedule_ends_on_residual() {
        let residual = 20_000.0;
        let schedule = generate_schedule_with_residual(100_000.0, 6.0, 36, start(), residual, Frequency::Monthly);

        assert_eq!(schedule.len(), 36);
        assert_eq!(schedule.last().unwrap().balance, residual);
        for pair in schedule.windows(2) {
            assert!(pair[1].balance <= pair[0].balance);
        }
        for entry in &schedule {
            assert_abs_diff_eq!(entry.principal + entry.interest, entry.payment, epsilon = 1e-6);
        }

        // Level payment discounts the residual out of the principal
        let r = 0.005_f64;
        let net = 100_000.0 - residual / (1.0 + r).powi(36);
        let expected = net * r * (1.0 + r).powi(36) / ((1.0 + r).powi(36) - 1.0);
        assert_abs_diff_eq!(schedule[0].payment, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_residual_with_zero_rate() {
        let schedule = generate_schedule_with_residual(120_000.0, 0.0, 12, start(), 24_000.0, Frequency::Monthly);
        assert_abs_diff_eq!(schedule[0].payment, 8_000.0, epsilon = 1e-9);
        assert_eq!(schedule.last().unwrap().balance, 24_000.0);
    }

    #[test]
    fn test_engine_summary() {
        let loan = LoanParameters::monthly(100_000.0, 12.0, 12, start());
        let (entries, summary) = AmortizationEngine::new(loan).schedule_with_summary();
        assert_eq!(summary.total_periods, 12);
        assert_abs_diff_eq!(summary.total_principal, 100_000.0, epsilon = 1e-6);
        let interest: f64 = entries.iter().map(|e| e.interest).sum();
        assert_abs_diff_eq!(summary.total_interest, interest, epsilon = 1e-9);
    }

    #[test]
    fn test_engine_reports_its_terms() {
        let loan = LoanParameters::new(60_000.0, 8.0, 24, Frequency::Quarterly, start());
        let engine = AmortizationEngine::with_residual(loan.clone(), 12_000.0);

        assert_eq!(engine.loan(), &loan);
        assert_eq!(engine.target_balance(), 12_000.0);
        assert_eq!(engine.total_periods(), 8);
        assert_abs_diff_eq!(engine.periodic_rate(), 0.02, epsilon = 1e-12);

        let schedule = engine.schedule();
        assert_eq!(schedule.last().unwrap().balance, engine.target_balance());
        assert_abs_diff_eq!(schedule[0].payment, engine.payment(), epsilon = 1e-9);
        assert_eq!(AmortizationEngine::new(loan).target_balance(), 0.0);
    }
}
