//! Micro-entreprise social contribution estimates.
//!
//! Contributions are a flat percentage of declared revenue, the percentage
//! depending on the activity type. Amounts are plain `f64` euros; rounding
//! only happens when rendering.

pub mod error;
pub mod handlers;
pub mod period;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use error::UrssafError;
pub use handlers::configure_urssaf_routes;
pub use period::{
    monthly_revenue, period_revenue, quarterly_breakdown, MonthRevenue, Period, PeriodMode,
    PeriodRevenue, QuarterBreakdown, RevenueItem,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    /// Prestations de services commerciales ou artisanales.
    #[default]
    Services,
    /// Achat/revente de marchandises.
    Ventes,
    /// Professions libérales.
    Liberale,
}

impl ActivityType {
    pub const ALL: [ActivityType; 3] = [Self::Services, Self::Ventes, Self::Liberale];

    pub fn rate(self) -> f64 {
        match self {
            Self::Services => 0.212,
            Self::Ventes => 0.123,
            Self::Liberale => 0.246,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Services => "Prestations de services (BIC/BNC)",
            Self::Ventes => "Vente de marchandises (BIC)",
            Self::Liberale => "Professions libérales (BNC)",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Ventes => "ventes",
            Self::Liberale => "liberale",
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = UrssafError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "services" => Ok(Self::Services),
            "ventes" => Ok(Self::Ventes),
            "liberale" => Ok(Self::Liberale),
            other => Err(UrssafError::UnknownActivity(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateInfo {
    pub activity_type: ActivityType,
    pub label: String,
    pub rate: f64,
}

pub fn rate_table() -> Vec<RateInfo> {
    ActivityType::ALL
        .iter()
        .map(|&activity_type| RateInfo {
            activity_type,
            label: activity_type.label().to_string(),
            rate: activity_type.rate(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContributionResult {
    pub revenue: f64,
    pub rate: f64,
    pub contributions: f64,
    pub net_revenue: f64,
}

impl ContributionResult {
    pub fn rate_percent(&self) -> f64 {
        self.rate * 100.0
    }
}

/// `contributions = revenue × rate`, `net = revenue − contributions`.
pub fn compute_contributions(revenue: f64, activity: ActivityType) -> ContributionResult {
    let rate = activity.rate();
    let contributions = revenue * rate;
    ContributionResult {
        revenue,
        rate,
        contributions,
        net_revenue: revenue - contributions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_services_example() {
        let result = compute_contributions(1000.0, ActivityType::Services);
        assert_eq!(format!("{:.2}", result.contributions), "212.00");
        assert_eq!(format!("{:.2}", result.net_revenue), "788.00");
        assert!((result.rate_percent() - 21.2).abs() < EPSILON);
    }

    #[test]
    fn test_zero_revenue() {
        for activity in ActivityType::ALL {
            let result = compute_contributions(0.0, activity);
            assert_eq!(result.contributions, 0.0);
            assert_eq!(result.net_revenue, 0.0);
        }
    }

    #[test]
    fn test_contributions_plus_net_equals_revenue() {
        let revenues = [0.0, 0.01, 1.0, 99.99, 1234.56, 36_500.0, 77_700.0, 1e7];
        for activity in ActivityType::ALL {
            for &revenue in &revenues {
                let result = compute_contributions(revenue, activity);
                let sum = result.contributions + result.net_revenue;
                assert!(
                    (sum - revenue).abs() <= EPSILON * revenue.max(1.0),
                    "{activity}: {sum} != {revenue}"
                );
            }
        }
    }

    #[test]
    fn test_rates() {
        assert_eq!(ActivityType::Services.rate(), 0.212);
        assert_eq!(ActivityType::Ventes.rate(), 0.123);
        assert_eq!(ActivityType::Liberale.rate(), 0.246);
    }

    #[test]
    fn test_activity_parse_and_display() {
        assert_eq!("Ventes".parse::<ActivityType>().unwrap(), ActivityType::Ventes);
        assert_eq!(ActivityType::Liberale.to_string(), "liberale");
        assert!(matches!(
            "bnc".parse::<ActivityType>(),
            Err(UrssafError::UnknownActivity(_))
        ));
    }

    #[test]
    fn test_activity_serde_is_lowercase() {
        let json = serde_json::to_string(&ActivityType::Liberale).unwrap();
        assert_eq!(json, "\"liberale\"");
        let parsed: ActivityType = serde_json::from_str("\"services\"").unwrap();
        assert_eq!(parsed, ActivityType::Services);
    }

    #[test]
    fn test_rate_table_lists_every_activity() {
        let table = rate_table();
        assert_eq!(table.len(), 3);
        assert_eq!(table[2].activity_type, ActivityType::Liberale);
        assert_eq!(table[1].label, "Vente de marchandises (BIC)");
    }
}
