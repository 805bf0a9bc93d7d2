use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ServicesError;
use crate::core::shared::schema::services;
use crate::urssaf::RevenueItem;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    #[default]
    Pending,
    Completed,
    Invoiced,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Invoiced => write!(f, "invoiced"),
        }
    }
}

impl std::str::FromStr for ServiceStatus {
    type Err = ServicesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "invoiced" => Ok(Self::Invoiced),
            other => Err(ServicesError::Validation(format!(
                "unknown service status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingType {
    #[default]
    Hourly,
    Daily,
    Project,
}

impl PricingType {
    /// Unit shown after the quantity.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Hourly => "h",
            Self::Daily => "j",
            Self::Project => "forfait",
        }
    }
}

impl std::fmt::Display for PricingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hourly => write!(f, "hourly"),
            Self::Daily => write!(f, "daily"),
            Self::Project => write!(f, "project"),
        }
    }
}

impl std::str::FromStr for PricingType {
    type Err = ServicesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "project" => Ok(Self::Project),
            other => Err(ServicesError::Validation(format!(
                "unknown pricing type: {other}"
            ))),
        }
    }
}

/// Inclusive day count, never below one.
pub fn daily_quantity(start: NaiveDate, end: NaiveDate) -> i64 {
    ((end - start).num_days() + 1).max(1)
}

pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ServicesError> {
    if end < start {
        return Err(ServicesError::Validation(
            "end date must not precede start date".to_string(),
        ));
    }
    Ok(())
}

/// Quantity stored in `hours` for the given pricing. Daily pricing derives it
/// from the date range and ignores any provided value.
pub fn resolve_quantity(
    pricing: Option<PricingType>,
    hours: Option<f64>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<f64, ServicesError> {
    match pricing {
        Some(PricingType::Daily) => {
            let (start, end) = start_date.zip(end_date).ok_or_else(|| {
                ServicesError::Validation(
                    "start_date and end_date are required for daily pricing".to_string(),
                )
            })?;
            validate_date_range(start, end)?;
            Ok(daily_quantity(start, end) as f64)
        }
        Some(PricingType::Project) => Ok(hours.unwrap_or(1.0)),
        Some(PricingType::Hourly) | None => {
            hours.ok_or_else(|| ServicesError::Validation("hours is required".to_string()))
        }
    }
}

pub fn validate_amounts(hours: f64, hourly_rate: f64) -> Result<(), ServicesError> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(ServicesError::Validation(
            "quantity must be a non-negative number".to_string(),
        ));
    }
    if !hourly_rate.is_finite() || hourly_rate < 0.0 {
        return Err(ServicesError::Validation(
            "rate must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = services)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ServiceRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub date: NaiveDate,
    pub hours: f64,
    pub hourly_rate: f64,
    pub description: String,
    pub status: String,
    pub pricing_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub client_id: Uuid,
    pub date: NaiveDate,
    pub hours: f64,
    pub hourly_rate: f64,
    pub amount: f64,
    pub description: String,
    pub status: ServiceStatus,
    pub pricing_type: Option<PricingType>,
    pub unit_suffix: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    pub fn amount(&self) -> f64 {
        self.hours * self.hourly_rate
    }

    /// Quantity with its unit, e.g. `5 j`.
    pub fn quantity_label(&self) -> String {
        format!("{} {}", self.hours, self.unit_suffix)
    }
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        let pricing_type: Option<PricingType> =
            row.pricing_type.as_deref().and_then(|p| p.parse().ok());
        let unit_suffix = pricing_type.unwrap_or_default().suffix().to_string();
        Self {
            id: row.id,
            client_id: row.client_id,
            date: row.date,
            hours: row.hours,
            hourly_rate: row.hourly_rate,
            amount: row.hours * row.hourly_rate,
            description: row.description,
            status: row.status.parse().unwrap_or_default(),
            pricing_type,
            unit_suffix,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl RevenueItem for Service {
    fn revenue_date(&self) -> NaiveDate {
        self.date
    }

    fn revenue_amount(&self) -> f64 {
        self.amount()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateServiceRequest {
    pub client_id: Uuid,
    pub date: Option<NaiveDate>,
    pub hours: Option<f64>,
    pub hourly_rate: Option<f64>,
    pub description: Option<String>,
    pub status: Option<ServiceStatus>,
    pub pricing_type: Option<PricingType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Prefills description, rate and pricing type when they are absent.
    pub article_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateServiceRequest {
    pub client_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub hours: Option<f64>,
    pub hourly_rate: Option<f64>,
    pub description: Option<String>,
    pub status: Option<ServiceStatus>,
    pub pricing_type: Option<PricingType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl UpdateServiceRequest {
    /// Whether the request touches anything that feeds `amount`.
    pub fn changes_amount(&self) -> bool {
        self.hours.is_some()
            || self.hourly_rate.is_some()
            || self.pricing_type.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceListQuery {
    pub client_id: Option<Uuid>,
    pub status: Option<ServiceStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkStatusRequest {
    pub ids: Vec<Uuid>,
    pub status: ServiceStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkStatusResponse {
    pub updated: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyQuantityQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyQuantityResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i64,
}
