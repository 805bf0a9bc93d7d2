use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::UrssafError;

const MONTH_NAMES: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodMode {
    #[default]
    Monthly,
    Quarterly,
}

/// A declaration period. Construct through [`Period::month`] or
/// [`Period::quarter`] so the bounds are checked once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Period {
    Month { year: i32, month: u32 },
    Quarter { year: i32, quarter: u32 },
}

impl Period {
    pub fn month(year: i32, month: u32) -> Result<Self, UrssafError> {
        check_year(year)?;
        if !(1..=12).contains(&month) {
            return Err(UrssafError::InvalidMonth(month));
        }
        Ok(Self::Month { year, month })
    }

    pub fn quarter(year: i32, quarter: u32) -> Result<Self, UrssafError> {
        check_year(year)?;
        if !(1..=4).contains(&quarter) {
            return Err(UrssafError::InvalidQuarter(quarter));
        }
        Ok(Self::Quarter { year, quarter })
    }

    /// Builds a period from query-string style parts.
    pub fn from_parts(
        mode: PeriodMode,
        year: i32,
        month: Option<u32>,
        quarter: Option<u32>,
    ) -> Result<Self, UrssafError> {
        match mode {
            PeriodMode::Monthly => {
                let month = month.ok_or_else(|| {
                    UrssafError::Validation("month is required for monthly mode".to_string())
                })?;
                Self::month(year, month)
            }
            PeriodMode::Quarterly => {
                let quarter = quarter.ok_or_else(|| {
                    UrssafError::Validation("quarter is required for quarterly mode".to_string())
                })?;
                Self::quarter(year, quarter)
            }
        }
    }

    pub fn year(&self) -> i32 {
        match *self {
            Self::Month { year, .. } | Self::Quarter { year, .. } => year,
        }
    }

    /// Calendar months covered, in order.
    pub fn months(&self) -> Vec<u32> {
        match *self {
            Self::Month { month, .. } => vec![month],
            Self::Quarter { quarter, .. } => {
                let first = (quarter - 1) * 3 + 1;
                (first..first + 3).collect()
            }
        }
    }

    /// Half-open `[start, end)` date range.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        let months = self.months();
        let year = self.year();
        let first = months.first().copied().unwrap_or(1);
        let last = months.last().copied().unwrap_or(12);
        (month_start(year, first), next_month_start(year, last))
    }

    pub fn label(&self) -> String {
        match *self {
            Self::Month { year, month } => month_label(year, month),
            Self::Quarter { year, quarter } => format!("T{quarter} {year}"),
        }
    }
}

/// The whole year, and the first day of the next one, must be representable.
pub fn check_year(year: i32) -> Result<(), UrssafError> {
    let representable = NaiveDate::from_ymd_opt(year, 1, 1).is_some()
        && year
            .checked_add(1)
            .and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1))
            .is_some();
    if !representable {
        return Err(UrssafError::Validation(format!("year out of range: {year}")));
    }
    Ok(())
}

// Periods are built through `check_year`, so both dates exist.
fn month_start(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}

fn next_month_start(year: i32, month: u32) -> NaiveDate {
    if month == 12 {
        year.checked_add(1)
            .map(|next| month_start(next, 1))
            .unwrap_or(NaiveDate::MAX)
    } else {
        month_start(year, month + 1)
    }
}

pub fn month_label(year: i32, month: u32) -> String {
    let name = MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("?");
    format!("{name} {year}")
}

/// Anything that contributes dated revenue.
pub trait RevenueItem {
    fn revenue_date(&self) -> NaiveDate;
    fn revenue_amount(&self) -> f64;
}

impl RevenueItem for (NaiveDate, f64) {
    fn revenue_date(&self) -> NaiveDate {
        self.0
    }

    fn revenue_amount(&self) -> f64 {
        self.1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRevenue {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterBreakdown {
    pub year: i32,
    pub quarter: u32,
    pub months: [MonthRevenue; 3],
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodRevenue {
    pub period: Period,
    pub label: String,
    pub months: Vec<MonthRevenue>,
    pub total: f64,
}

pub fn monthly_revenue<T: RevenueItem>(items: &[T], year: i32, month: u32) -> f64 {
    items
        .iter()
        .filter(|item| {
            let date = item.revenue_date();
            date.year() == year && date.month() == month
        })
        .map(RevenueItem::revenue_amount)
        .sum()
}

fn month_revenue<T: RevenueItem>(items: &[T], year: i32, month: u32) -> MonthRevenue {
    MonthRevenue {
        year,
        month,
        label: month_label(year, month),
        revenue: monthly_revenue(items, year, month),
    }
}

/// Sums each month of the quarter independently, then totals the three.
/// `quarter` must already be validated (see [`Period::quarter`]).
pub fn quarterly_breakdown<T: RevenueItem>(
    items: &[T],
    year: i32,
    quarter: u32,
) -> QuarterBreakdown {
    let first = (quarter - 1) * 3 + 1;
    let months = [
        month_revenue(items, year, first),
        month_revenue(items, year, first + 1),
        month_revenue(items, year, first + 2),
    ];
    let total = months.iter().map(|m| m.revenue).sum();
    QuarterBreakdown {
        year,
        quarter,
        months,
        total,
    }
}

pub fn period_revenue<T: RevenueItem>(items: &[T], period: Period) -> PeriodRevenue {
    let (months, total) = match period {
        Period::Month { year, month } => {
            let m = month_revenue(items, year, month);
            let total = m.revenue;
            (vec![m], total)
        }
        Period::Quarter { year, quarter } => {
            let breakdown = quarterly_breakdown(items, year, quarter);
            (breakdown.months.to_vec(), breakdown.total)
        }
    };
    PeriodRevenue {
        period,
        label: period.label(),
        months,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_first_quarter_breakdown() {
        let items = vec![(d(2025, 1, 10), 600.0), (d(2025, 1, 28), 400.0), (d(2025, 3, 3), 500.0)];
        let breakdown = quarterly_breakdown(&items, 2025, 1);

        let revenues: Vec<f64> = breakdown.months.iter().map(|m| m.revenue).collect();
        assert_eq!(revenues, vec![1000.0, 0.0, 500.0]);
        assert_eq!(breakdown.total, 1500.0);
        assert_eq!(breakdown.months[1].label, "février 2025");
    }

    #[test]
    fn test_quarter_total_is_sum_of_months() {
        let items: Vec<(NaiveDate, f64)> = (1..=12)
            .flat_map(|m| [(d(2024, m, 1), m as f64 * 10.5), (d(2024, m, 15), 3.25)])
            .collect();
        for quarter in 1..=4 {
            let breakdown = quarterly_breakdown(&items, 2024, quarter);
            let sum: f64 = breakdown.months.iter().map(|m| m.revenue).sum();
            assert!((breakdown.total - sum).abs() < 1e-9);
        }
    }

    #[test]
    fn test_monthly_ignores_other_years() {
        let items = vec![(d(2024, 5, 1), 100.0), (d(2025, 5, 1), 250.0)];
        assert_eq!(monthly_revenue(&items, 2025, 5), 250.0);
        assert_eq!(monthly_revenue(&items, 2025, 6), 0.0);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        assert!(matches!(Period::month(2025, 0), Err(UrssafError::InvalidMonth(0))));
        assert!(matches!(Period::month(2025, 13), Err(UrssafError::InvalidMonth(13))));
        assert!(matches!(Period::quarter(2025, 5), Err(UrssafError::InvalidQuarter(5))));
        assert!(Period::quarter(2025, 4).is_ok());
    }

    #[test]
    fn test_unrepresentable_years_rejected() {
        for year in [i32::MAX, i32::MIN, 300_000, -300_000] {
            assert!(matches!(Period::month(year, 12), Err(UrssafError::Validation(_))), "{year}");
            assert!(matches!(Period::quarter(year, 4), Err(UrssafError::Validation(_))), "{year}");
        }
        let last = NaiveDate::MAX.year() - 1;
        let (_, end) = Period::quarter(last, 4).unwrap().date_range();
        assert_eq!(end, d(last + 1, 1, 1));
    }

    #[test]
    fn test_from_parts_requires_matching_field() {
        assert!(Period::from_parts(PeriodMode::Monthly, 2025, None, Some(1)).is_err());
        assert_eq!(
            Period::from_parts(PeriodMode::Quarterly, 2025, None, Some(2)).unwrap(),
            Period::Quarter { year: 2025, quarter: 2 }
        );
    }

    #[test]
    fn test_date_range_and_labels() {
        let q4 = Period::quarter(2025, 4).unwrap();
        assert_eq!(q4.date_range(), (d(2025, 10, 1), d(2026, 1, 1)));
        assert_eq!(q4.label(), "T4 2025");

        let march = Period::month(2025, 3).unwrap();
        assert_eq!(march.date_range(), (d(2025, 3, 1), d(2025, 4, 1)));
        assert_eq!(march.label(), "mars 2025");
    }

    #[test]
    fn test_period_revenue_month() {
        let items = vec![(d(2025, 3, 2), 120.0), (d(2025, 3, 30), 80.0)];
        let revenue = period_revenue(&items, Period::month(2025, 3).unwrap());
        assert_eq!(revenue.months.len(), 1);
        assert_eq!(revenue.total, 200.0);
    }
}
