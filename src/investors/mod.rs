//! Investor returns: pro-rata allocation of a loan schedule

mod allocation;
pub mod loader;

pub use allocation::{
    allocate, allocate_pool, allocate_with_basis, validate_pool, AllocationBasis, Contribution,
    InvestorReturn, PeriodReturn, PoolSummary,
};
pub use loader::{load_contributions, load_contributions_from_reader};
