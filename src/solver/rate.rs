//! Periodic rate implied by an annuity (spreadsheet RATE)
//!
//! Solves `pv·(1+r)^n + pmt·(1+r·t)·((1+r)^n − 1)/r + fv = 0` for `r`, where
//! `t` is 1 for payments at the start of each period and 0 otherwise. Sign
//! convention: money received is positive, money paid out negative.

use log::warn;
use serde::{Deserialize, Serialize};

use super::newton::{newton_raphson, Solution, SolverConfig};

/// Below this the annuity terms switch to their r → 0 limits
const SMALL_RATE: f64 = 1e-10;

/// When in each period the payment is made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTiming {
    /// Ordinary annuity
    #[default]
    End,
    /// Annuity due
    Begin,
}

impl PaymentTiming {
    fn factor(&self) -> f64 {
        match self {
            PaymentTiming::End => 0.0,
            PaymentTiming::Begin => 1.0,
        }
    }
}

/// Annuity balance equation and its derivative with respect to `rate`
fn annuity_equation(
    rate: f64,
    periods: u32,
    payment: f64,
    present_value: f64,
    future_value: f64,
    timing: PaymentTiming,
) -> (f64, f64) {
    let n = periods as f64;
    let t = timing.factor();

    if rate.abs() < SMALL_RATE {
        let value = present_value + payment * n + future_value;
        let derivative = n * present_value + payment * (n * (n - 1.0) / 2.0 + t * n);
        return (value, derivative);
    }

    let growth = (1.0 + rate).powi(periods as i32);
    let growth_prime = n * (1.0 + rate).powi(periods as i32 - 1);

    let annuity = (growth - 1.0) / rate;
    let annuity_prime = (growth_prime * rate - (growth - 1.0)) / (rate * rate);
    let timing_adj = 1.0 + rate * t;

    let value = present_value * growth + payment * timing_adj * annuity + future_value;
    let derivative = present_value * growth_prime + payment * (t * annuity + timing_adj * annuity_prime);
    (value, derivative)
}

/// Full solve result, for callers that want to know whether RATE converged
pub fn solve_rate_with(
    periods: u32,
    payment: f64,
    present_value: f64,
    future_value: f64,
    timing: PaymentTiming,
    initial_guess: f64,
    config: &SolverConfig,
) -> Solution {
    let solution = newton_raphson(
        |r| annuity_equation(r, periods, payment, present_value, future_value, timing),
        initial_guess,
        config,
    );

    if !solution.converged {
        warn!(
            "rate solve did not converge after {} iterations (n={}, pmt={}, pv={}, fv={}); returning {}",
            solution.iterations, periods, payment, present_value, future_value, solution.estimate
        );
    }

    solution
}

/// Periodic rate at which the annuity balances.
///
/// Returns the last Newton estimate even if the iteration cap was reached; check
/// the result against expectations, or use [`solve_rate_with`] to see the flag.
pub fn solve_rate(
    periods: u32,
    payment: f64,
    present_value: f64,
    future_value: f64,
    timing: PaymentTiming,
    initial_guess: f64,
) -> f64 {
    solve_rate_with(
        periods,
        payment,
        present_value,
        future_value,
        timing,
        initial_guess,
        &SolverConfig::default(),
    )
    .estimate
}
