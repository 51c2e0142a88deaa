//! Payment frequency and period/date arithmetic

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// How often a scheduled payment falls due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Frequency {
    #[default]
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl Frequency {
    /// Parse a frequency label. Anything unrecognized falls back to monthly.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" | "m" => Frequency::Monthly,
            "quarterly" | "quarter" | "q" => Frequency::Quarterly,
            "semi-annual" | "semi_annual" | "semiannual" | "semi-annually" | "s" => {
                Frequency::SemiAnnual
            }
            "annual" | "annually" | "yearly" | "a" | "y" => Frequency::Annual,
            _ => Frequency::Monthly,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::SemiAnnual => "semi-annual",
            Frequency::Annual => "annual",
        }
    }

    /// Payments per calendar year (12/4/2/1)
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::SemiAnnual => 2,
            Frequency::Annual => 1,
        }
    }

    /// Calendar months covered by one period
    pub fn months_per_period(&self) -> u32 {
        12 / self.periods_per_year()
    }

    /// Per-period rate (decimal) for an annual nominal rate given in percent
    pub fn periodic_rate(&self, annual_rate_pct: f64) -> f64 {
        annual_rate_pct / 100.0 / self.periods_per_year() as f64
    }
}

impl From<String> for Frequency {
    fn from(label: String) -> Self {
        Frequency::parse(&label)
    }
}

impl From<&str> for Frequency {
    fn from(label: &str) -> Self {
        Frequency::parse(label)
    }
}

impl From<Frequency> for &'static str {
    fn from(frequency: Frequency) -> Self {
        frequency.as_str()
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payments per year for a frequency
pub fn periods_per_year(frequency: Frequency) -> u32 {
    frequency.periods_per_year()
}

/// Number of scheduled periods needed to cover `term_months` calendar months.
///
/// A partial trailing period counts as a full one: 10 months quarterly is 4 periods.
pub fn total_periods(term_months: u32, frequency: Frequency) -> u32 {
    let months = frequency.months_per_period();
    term_months.div_ceil(months)
}

/// Date of payment `period_index`, i.e. `start` advanced by that many periods.
///
/// Month-end dates clamp to the last day of the target month (Jan 31 + 1 month
/// is Feb 28/29). Dates past chrono's range saturate at `NaiveDate::MAX`.
pub fn next_payment_date(start: NaiveDate, period_index: u32, frequency: Frequency) -> NaiveDate {
    let months = period_index.saturating_mul(frequency.months_per_period());
    start
        .checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}
