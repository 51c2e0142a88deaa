//! Leasing Engine - Amortization, lease economics and investor returns
//!
//! This library provides:
//! - Payment-period date arithmetic for monthly to annual frequencies
//! - Annuity payments and amortization schedules, with or without a residual balance
//! - Newton-Raphson rate (RATE) and IRR solvers with bisection fallback
//! - Monthly leasing cash-flow ledger with NPV, IRR, payback and profit KPIs
//! - Pro-rata investor return allocation
//!
//! All calculations are pure and synchronous. They report undefined results as
//! `NaN`/`Infinity` rather than errors; the `validate`/`compute_checked` entry
//! points turn those cases into [`EngineError`]s.

pub mod config;
pub mod error;
pub mod investors;
pub mod leasing;
pub mod report;
pub mod scenario;
pub mod schedule;
pub mod solver;

// Re-export commonly used types
pub use config::EngineConfig;
pub use error::EngineError;
pub use investors::{allocate, allocate_pool, AllocationBasis, Contribution, InvestorReturn};
pub use leasing::{compute_leasing_results, payback_period, CashFlowEntry, LeasingEngine, LeasingParameters, LeasingResults};
pub use scenario::ScenarioRunner;
pub use schedule::{
    generate_schedule, generate_schedule_with_residual, next_payment_date, periodic_payment,
    periods_per_year, Frequency, LoanParameters, PaymentScheduleEntry,
};
pub use solver::{solve_irr, solve_rate, PaymentTiming};
