//! Loan amortization: payment periods, annuity payments, and schedules

mod amortization;
mod entry;
mod loan;
mod period;

pub use amortization::{
    generate_schedule, generate_schedule_with_residual, periodic_payment,
    periodic_payment_with_residual, AmortizationEngine,
};
pub use entry::{total_interest, PaymentScheduleEntry, ScheduleSummary};
pub use loan::LoanParameters;
pub use period::{next_payment_date, periods_per_year, total_periods, Frequency};
