use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ClientsError;
use crate::core::shared::schema::clients;
use crate::prestations::{Service, ServiceStatus};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = clients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address_line1: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub siret: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn display_name(&self) -> &str {
        self.company.as_deref().filter(|c| !c.is_empty()).unwrap_or(&self.name)
    }

    /// Address block, one line per non-empty part.
    pub fn address_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(line) = self.address_line1.as_deref().filter(|l| !l.is_empty()) {
            lines.push(line.to_string());
        }
        let city_line = [self.postal_code.as_deref(), self.city.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !city_line.is_empty() {
            lines.push(city_line);
        }
        if let Some(country) = self.country.as_deref().filter(|c| !c.is_empty()) {
            lines.push(country.to_string());
        }
        lines
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address_line1: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub siret: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address_line1: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub siret: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientListQuery {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientListResponse {
    pub clients: Vec<Client>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueTotals {
    pub services_count: usize,
    pub total_amount: f64,
    pub invoiced_amount: f64,
    pub uninvoiced_amount: f64,
}

pub fn revenue_totals(services: &[Service]) -> RevenueTotals {
    services.iter().fold(RevenueTotals::default(), |mut acc, s| {
        let amount = s.amount();
        acc.services_count += 1;
        acc.total_amount += amount;
        if s.status == ServiceStatus::Invoiced {
            acc.invoiced_amount += amount;
        } else {
            acc.uninvoiced_amount += amount;
        }
        acc
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSummary {
    pub client: Client,
    #[serde(flatten)]
    pub totals: RevenueTotals,
    pub invoices_count: i64,
}

pub fn validate_email(email: Option<&str>) -> Result<(), ClientsError> {
    match email.map(str::trim).filter(|e| !e.is_empty()) {
        Some(e) if !e.contains('@') || e.starts_with('@') || e.ends_with('@') => Err(
            ClientsError::Validation(format!("invalid email address: {e}")),
        ),
        _ => Ok(()),
    }
}

/// SIRET numbers are 14 digits; spaces are tolerated.
pub fn validate_siret(siret: Option<&str>) -> Result<(), ClientsError> {
    let Some(raw) = siret.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(());
    };
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() != 14 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ClientsError::Validation(format!(
            "SIRET must contain 14 digits: {raw}"
        )));
    }
    Ok(())
}

pub fn normalize_siret(siret: Option<String>) -> Option<String> {
    siret
        .map(|s| s.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|s| !s.is_empty())
}
