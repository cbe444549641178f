//! Naive compound growth of monthly savings
//!
//! Each month's savings is treated as a lump sum invested at the start of that
//! month and compounded monthly up to the current month. This is an
//! illustration of what the savings could be worth, not a portfolio model.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::history::MonthlySavings;
use super::round2;

/// Default nominal annual return
pub const DEFAULT_ANNUAL_RATE: f64 = 0.10;

/// Monthly rate equivalent to `annual_rate` compounded monthly
pub fn monthly_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}

/// Growth of one month's savings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyProjection {
    pub month: String,
    pub month_label: String,
    pub principal: f64,
    pub months_elapsed: u32,
    pub future_value: f64,
    pub earnings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentProjection {
    pub annual_rate: f64,
    pub monthly_rate: f64,
    pub total_principal: f64,
    pub total_future_value: f64,
    pub total_earnings: f64,
    pub return_percent: f64,
    /// Months with savings, in the order given
    pub months: Vec<MonthlyProjection>,
}

/// Whole calendar months from a `YYYY-MM` key to `today`, floored at zero
///
/// Keys that do not parse count as zero months.
pub fn months_elapsed(month: &str, today: NaiveDate) -> u32 {
    let Ok(start) = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d") else {
        return 0;
    };
    let from = start.year() as i64 * 12 + start.month0() as i64;
    let to = today.year() as i64 * 12 + today.month0() as i64;
    (to - from).max(0) as u32
}

/// Project every month's savings forward to the month containing `today`
pub fn project_growth(
    months: &[MonthlySavings],
    annual_rate: f64,
    today: NaiveDate,
) -> InvestmentProjection {
    let rate = monthly_rate(annual_rate);

    let mut total_principal = 0.0;
    let mut total_future_value = 0.0;
    let mut breakdown = Vec::new();

    for month in months {
        if month.savings <= 0.0 {
            continue;
        }
        let elapsed = months_elapsed(&month.month, today);
        let future_value = month.savings * (1.0 + rate).powi(elapsed as i32);

        total_principal += month.savings;
        total_future_value += future_value;
        breakdown.push(MonthlyProjection {
            month: month.month.clone(),
            month_label: month.month_label.clone(),
            principal: month.savings,
            months_elapsed: elapsed,
            future_value: round2(future_value),
            earnings: round2(future_value - month.savings),
        });
    }

    let total_earnings = total_future_value - total_principal;
    let return_percent = if total_principal > 0.0 {
        round2(total_earnings / total_principal * 100.0)
    } else {
        0.0
    };

    InvestmentProjection {
        annual_rate,
        monthly_rate: rate,
        total_principal: round2(total_principal),
        total_future_value: round2(total_future_value),
        total_earnings: round2(total_earnings),
        return_percent,
        months: breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(key: &str, savings: f64) -> MonthlySavings {
        MonthlySavings {
            month: key.to_string(),
            month_label: key.to_string(),
            savings,
            transaction_count: 1,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_monthly_rate_compounds_to_annual() {
        let rate = monthly_rate(0.10);
        assert!(((1.0 + rate).powi(12) - 1.10).abs() < 1e-12);
        assert_eq!(monthly_rate(0.0), 0.0);
    }

    #[test]
    fn test_months_elapsed() {
        assert_eq!(months_elapsed("2024-01", date("2024-01-31")), 0);
        assert_eq!(months_elapsed("2023-11", date("2024-02-01")), 3);
        assert_eq!(months_elapsed("2025-06", date("2024-02-01")), 0);
        assert_eq!(months_elapsed("garbage", date("2024-02-01")), 0);
    }

    #[test]
    fn test_twelve_months_grow_by_annual_rate() {
        let projection = project_growth(&[month("2023-03", 100.0)], 0.10, date("2024-03-15"));

        assert_eq!(projection.months[0].months_elapsed, 12);
        assert!((projection.total_future_value - 110.0).abs() < 1e-9);
        assert!((projection.total_earnings - 10.0).abs() < 1e-9);
        assert!((projection.return_percent - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_current_month_has_no_earnings() {
        let projection = project_growth(&[month("2024-03", 12.34)], 0.10, date("2024-03-02"));
        assert!((projection.total_future_value - 12.34).abs() < 1e-9);
        assert_eq!(projection.total_earnings, 0.0);
    }

    #[test]
    fn test_future_value_never_below_principal() {
        let months: Vec<_> = (1..=12)
            .map(|m| month(&format!("2023-{:02}", m), m as f64 * 1.5))
            .collect();
        let projection = project_growth(&months, 0.10, date("2024-06-01"));

        for m in &projection.months {
            assert!(m.future_value >= m.principal);
        }
        assert!(projection.total_future_value >= projection.total_principal);
    }

    #[test]
    fn test_no_savings_means_zero_totals() {
        let projection = project_growth(&[month("2024-01", 0.0)], 0.10, date("2024-06-01"));
        assert!(projection.months.is_empty());
        assert_eq!(projection.total_principal, 0.0);
        assert_eq!(projection.return_percent, 0.0);

        let empty = project_growth(&[], 0.10, date("2024-06-01"));
        assert_eq!(empty.total_future_value, 0.0);
    }
}
