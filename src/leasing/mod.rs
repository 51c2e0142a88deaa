//! Lease economics: monthly cash-flow ledger and KPIs (NPV, IRR, payback, profit)

mod cashflows;
mod engine;
pub mod loader;
mod params;
mod state;

pub(crate) use cashflows::payback_months;
pub use cashflows::{CashFlowEntry, LeasingResults, RentBreakdown};
pub use engine::{compute_leasing_results, payback_period, LeasingConfig, LeasingEngine};
pub use loader::{load_leases, load_leases_from_reader, LeaseInput};
pub use params::LeasingParameters;
pub use state::LedgerState;
