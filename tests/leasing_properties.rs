//! End-to-end checks on schedules, solvers, the leasing ledger and investor allocation

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use leasing_engine::schedule::total_interest;
use leasing_engine::{
    allocate, compute_leasing_results, generate_schedule, generate_schedule_with_residual,
    payback_period, periodic_payment, solve_irr, solve_rate, Frequency, LeasingParameters,
    PaymentScheduleEntry, PaymentTiming,
};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// (principal, annual rate %, term months, frequency)
fn loan_cases() -> Vec<(f64, f64, u32, Frequency)> {
    vec![
        (1_000.0, 0.0, 1, Frequency::Monthly),
        (100_000.0, 12.0, 12, Frequency::Monthly),
        (250_000.0, 4.5, 360, Frequency::Monthly),
        (75_000.0, 9.0, 60, Frequency::Quarterly),
        (40_000.0, 7.25, 25, Frequency::SemiAnnual),
        (1_000_000.0, 18.0, 120, Frequency::Annual),
        (333.33, 0.0, 7, Frequency::Monthly),
    ]
}

fn assert_conserves(schedule: &[PaymentScheduleEntry]) {
    for entry in schedule {
        assert_abs_diff_eq!(entry.principal + entry.interest, entry.payment, epsilon = 1e-6);
    }
}

fn assert_non_increasing(opening: f64, schedule: &[PaymentScheduleEntry]) {
    let mut previous = opening;
    for entry in schedule {
        assert!(
            entry.balance <= previous,
            "balance rose from {} to {} in period {}",
            previous,
            entry.balance,
            entry.period
        );
        previous = entry.balance;
    }
}

#[test]
fn fully_amortizing_schedules_end_at_exactly_zero() {
    for (principal, rate, term, freq) in loan_cases() {
        let schedule = generate_schedule(principal, rate, term, start(), freq);
        assert!(!schedule.is_empty());
        assert_eq!(schedule.last().unwrap().balance, 0.0, "{principal} {rate} {term} {freq}");
    }
}

#[test]
fn residual_schedules_end_at_exactly_the_residual() {
    for (principal, rate, term, freq) in loan_cases() {
        let residual = principal * 0.2;
        let schedule = generate_schedule_with_residual(principal, rate, term, start(), residual, freq);
        assert_eq!(schedule.last().unwrap().balance, residual, "{principal} {rate} {term} {freq}");
    }
}

#[test]
fn every_payment_splits_into_principal_and_interest() {
    for (principal, rate, term, freq) in loan_cases() {
        assert_conserves(&generate_schedule(principal, rate, term, start(), freq));
        assert_conserves(&generate_schedule_with_residual(principal, rate, term, start(), principal * 0.3, freq));
    }
}

#[test]
fn balances_never_increase() {
    for (principal, rate, term, freq) in loan_cases() {
        assert_non_increasing(principal, &generate_schedule(principal, rate, term, start(), freq));
        assert_non_increasing(
            principal,
            &generate_schedule_with_residual(principal, rate, term, start(), principal * 0.1, freq),
        );
    }
}

#[test]
fn payment_matches_annuity_formula_and_rate_recovers_it() {
    let payment = periodic_payment(100_000.0, 12.0, 12, Frequency::Monthly);

    let r: f64 = 0.01;
    let closed_form = 100_000.0 * r * (1.0 + r).powi(12) / ((1.0 + r).powi(12) - 1.0);
    assert_abs_diff_eq!(payment, closed_form, epsilon = 1e-6);

    let recovered = solve_rate(12, -payment, 100_000.0, 0.0, PaymentTiming::End, 0.1);
    assert_abs_diff_eq!(recovered, 0.01, epsilon = 1e-4);
}

#[test]
fn investor_shares_and_returns_are_conserved() {
    let schedule = generate_schedule(100_000.0, 12.0, 12, start(), Frequency::Monthly);
    let contributions = [("a", 40_000.0), ("b", 30_000.0), ("c", 30_000.0)];
    let total: f64 = contributions.iter().map(|(_, amount)| amount).sum();

    let returns: Vec<_> = contributions
        .iter()
        .map(|(id, amount)| allocate(*amount, total, &schedule, id, id))
        .collect();

    let share_sum: f64 = returns.iter().map(|r| r.share).sum();
    let return_sum: f64 = returns.iter().map(|r| r.total_return).sum();

    assert_abs_diff_eq!(share_sum, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(return_sum, 100_000.0 + total_interest(&schedule), epsilon = 1e-6);
}

#[test]
fn zero_rate_is_straight_line() {
    assert_eq!(periodic_payment(120_000.0, 0.0, 12, Frequency::Monthly), 10_000.0);

    let schedule = generate_schedule(120_000.0, 0.0, 12, start(), Frequency::Monthly);
    assert_eq!(schedule.len(), 12);
    assert!(schedule.iter().all(|e| e.interest == 0.0));
}

#[test]
fn reference_lease_ledger_is_consistent() {
    let params = LeasingParameters {
        asset_cost: 500_000.0,
        annual_margin_pct: 15.0,
        fixed_monthly_fee: 1_000.0,
        admin_commission_pct: 2.0,
        monthly_operating_expenses: 2_000.0,
        residual_value_pct: 20.0,
        discount_rate_pct: 6.0,
        term_months: 36,
        loan_amount: 400_000.0,
        loan_rate_pct: 10.0,
        ..Default::default()
    };
    let results = compute_leasing_results(&params, start());
    let flows = &results.cash_flows;

    // Funding in against the asset purchase out
    let commission = 500_000.0 * 0.02;
    assert_abs_diff_eq!(
        flows[0].net_cash_flow,
        (400_000.0 + commission) - (500_000.0 + params.delivery_costs),
        epsilon = 1e-6
    );

    // Final month carries the residual value on top of the rent
    let last = flows.last().unwrap();
    assert_abs_diff_eq!(last.inflow, params.total_monthly_rent() + 100_000.0, epsilon = 1e-6);

    let net_sum: f64 = flows.iter().map(|e| e.net_cash_flow).sum();
    assert_abs_diff_eq!(last.cumulative_cash_flow, net_sum, epsilon = 1e-6);
    assert_abs_diff_eq!(results.total_profit, net_sum, epsilon = 1e-6);

    assert_eq!(results.net_present_value, last.cumulative_npv);
    assert!(results.irr.is_finite());
}

#[test]
fn irr_without_a_root_still_returns_a_finite_estimate() {
    let no_sign_change = [100.0, 50.0, 25.0, 10.0];
    assert!(solve_irr(&no_sign_change, 0.1).is_finite());

    let all_outflows = [-1_000.0, -200.0, -200.0];
    assert!(solve_irr(&all_outflows, 0.1).is_finite());
}

#[test]
fn payback_interpolates_inside_the_recovering_period() {
    // Cumulative: -1000, -800, -650, -500, then +200
    let flows = [-1_000.0, 200.0, 150.0, 150.0, 700.0];
    let payback = payback_period(&flows);

    assert!(payback > 3.0 && payback < 4.0);
    assert_abs_diff_eq!(payback, 3.0 + 500.0 / 700.0, epsilon = 1e-12);
}
