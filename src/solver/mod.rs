//! Root finding: annuity rate (RATE) and internal rate of return (IRR)
//!
//! Neither solver raises on failure. When the iteration cap is reached the last
//! estimate is returned; the `_with` variants expose a convergence flag.

mod irr;
mod newton;
mod rate;

pub use irr::{annualize, npv, solve_irr, solve_irr_with, IrrAnnualization, IrrMethod};
pub use newton::{newton_raphson, Solution, SolverConfig};
pub use rate::{solve_rate, solve_rate_with, PaymentTiming};
