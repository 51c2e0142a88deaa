//! Running totals carried through the cash-flow ledger

use chrono::NaiveDate;

use super::cashflows::CashFlowEntry;

/// Ledger state between periods
#[derive(Debug, Clone)]
pub struct LedgerState {
    /// Next period to record
    pub period: u32,

    /// Monthly discount rate (decimal)
    pub discount_rate: f64,

    pub cumulative_cash_flow: f64,
    pub cumulative_npv: f64,
}

impl LedgerState {
    pub fn new(discount_rate: f64) -> Self {
        Self {
            period: 0,
            discount_rate,
            cumulative_cash_flow: 0.0,
            cumulative_npv: 0.0,
        }
    }

    /// Discount factor for `period`; exactly 1 at period 0
    pub fn discount_factor(&self, period: u32) -> f64 {
        if period == 0 {
            1.0
        } else {
            (1.0 + self.discount_rate).powi(period as i32)
        }
    }

    /// Record the next period and advance
    pub fn record(&mut self, date: NaiveDate, inflow: f64, outflow: f64) -> CashFlowEntry {
        let period = self.period;
        let net_cash_flow = inflow - outflow;
        let present_value = net_cash_flow / self.discount_factor(period);

        self.cumulative_cash_flow += net_cash_flow;
        self.cumulative_npv += present_value;
        self.period += 1;

        CashFlowEntry {
            period,
            date,
            inflow,
            outflow,
            net_cash_flow,
            cumulative_cash_flow: self.cumulative_cash_flow,
            present_value,
            cumulative_npv: self.cumulative_npv,
        }
    }

    /// Add extra flows to an entry already recorded as the latest period,
    /// updating its present value and both running totals.
    pub fn adjust_last(&mut self, entry: &mut CashFlowEntry, extra_inflow: f64, extra_outflow: f64) {
        let extra_net = extra_inflow - extra_outflow;
        let extra_pv = extra_net / self.discount_factor(entry.period);

        entry.inflow += extra_inflow;
        entry.outflow += extra_outflow;
        entry.net_cash_flow = entry.inflow - entry.outflow;
        entry.present_value += extra_pv;

        self.cumulative_cash_flow += extra_net;
        self.cumulative_npv += extra_pv;
        entry.cumulative_cash_flow = self.cumulative_cash_flow;
        entry.cumulative_npv = self.cumulative_npv;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_period_zero_undiscounted() {
        let mut state = LedgerState::new(0.01);
        let entry = state.record(date(), 100.0, 300.0);
        assert_eq!(entry.period, 0);
        assert_eq!(entry.present_value, -200.0);
        assert_eq!(entry.cumulative_npv, -200.0);
    }

    #[test]
    fn test_running_totals() {
        let mut state = LedgerState::new(0.01);
        state.record(date(), 0.0, 1_000.0);
        let e1 = state.record(date(), 505.0, 0.0);
        let e2 = state.record(date(), 510.05, 0.0);

        assert_abs_diff_eq!(e1.present_value, 500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(e2.present_value, 500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(e2.cumulative_cash_flow, 15.05, epsilon = 1e-9);
        assert_abs_diff_eq!(e2.cumulative_npv, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_adjust_last() {
        let mut state = LedgerState::new(0.0);
        state.record(date(), 0.0, 100.0);
        let mut last = state.record(date(), 50.0, 0.0);
        state.adjust_last(&mut last, 80.0, 30.0);

        assert_eq!(last.inflow, 130.0);
        assert_eq!(last.outflow, 30.0);
        assert_eq!(last.net_cash_flow, 100.0);
        assert_eq!(last.cumulative_cash_flow, 0.0);
        assert_eq!(last.cumulative_npv, 0.0);
    }
}
