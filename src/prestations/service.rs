use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use log::{error, info, warn};
use uuid::Uuid;

use super::error::ServicesError;
use super::types::*;
use crate::articles::ArticlesService;
use crate::core::shared::schema::{clients, services};
use crate::core::shared::utils::{DbConn, DbPool};

const DEFAULT_LIMIT: i64 = 500;

pub struct ServicesService {
    pool: DbPool,
}

impl ServicesService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConn, ServicesError> {
        self.pool.get().map_err(|e| {
            error!("Failed to get database connection: {e}");
            ServicesError::Connection
        })
    }

    pub async fn list_services(&self, query: ServiceListQuery) -> Result<Vec<Service>, ServicesError> {
        let mut conn = self.conn()?;

        let mut q = services::table.into_boxed();

        if let Some(client_id) = query.client_id {
            q = q.filter(services::client_id.eq(client_id));
        }
        if let Some(status) = query.status {
            q = q.filter(services::status.eq(status.to_string()));
        }
        if let Some(from) = query.from {
            q = q.filter(services::date.ge(from));
        }
        if let Some(to) = query.to {
            q = q.filter(services::date.le(to));
        }

        let rows: Vec<ServiceRow> = q
            .order((services::date.desc(), services::created_at.desc()))
            .limit(query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 5000))
            .offset(query.offset.unwrap_or(0).max(0))
            .select(ServiceRow::as_select())
            .load(&mut conn)
            .map_err(|e| {
                error!("Failed to list services: {e}");
                ServicesError::from(e)
            })?;

        Ok(rows.into_iter().map(Service::from).collect())
    }

    /// Services dated in `[start, end)`, used by the period aggregations.
    pub async fn services_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Service>, ServicesError> {
        let mut conn = self.conn()?;
        let rows: Vec<ServiceRow> = services::table
            .filter(services::date.ge(start))
            .filter(services::date.lt(end))
            .order(services::date.asc())
            .select(ServiceRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Service::from).collect())
    }

    pub async fn get_service(&self, id: Uuid) -> Result<Service, ServicesError> {
        let mut conn = self.conn()?;
        load_row(&mut conn, id).map(Service::from)
    }

    pub async fn create_service(&self, request: CreateServiceRequest) -> Result<Service, ServicesError> {
        let mut request = request;

        if let Some(article_id) = request.article_id {
            let article = ArticlesService::new(self.pool.clone())
                .get_article(article_id)
                .await
                .map_err(|e| ServicesError::Validation(format!("article {article_id}: {e}")))?;
            if request.description.is_none() {
                request.description = Some(article.service_description());
            }
            if request.hourly_rate.is_none() {
                request.hourly_rate = Some(article.default_rate);
            }
            if request.pricing_type.is_none() {
                request.pricing_type = Some(article.pricing_type);
            }
        }

        let hours = resolve_quantity(
            request.pricing_type,
            request.hours,
            request.start_date,
            request.end_date,
        )?;
        let hourly_rate = request
            .hourly_rate
            .ok_or_else(|| ServicesError::Validation("hourly_rate is required".to_string()))?;
        validate_amounts(hours, hourly_rate)?;

        let description = request.description.unwrap_or_default();
        if description.trim().is_empty() {
            return Err(ServicesError::Validation("description is required".to_string()));
        }

        let status = request.status.unwrap_or_default();
        if status == ServiceStatus::Invoiced {
            return Err(ServicesError::Validation(
                "services become invoiced only through an invoice".to_string(),
            ));
        }

        let mut conn = self.conn()?;
        ensure_client_exists(&mut conn, request.client_id)?;

        let (start_date, end_date) = dates_for(request.pricing_type, request.start_date, request.end_date);
        let date = request
            .date
            .or(start_date)
            .unwrap_or_else(|| Utc::now().date_naive());

        let now = Utc::now();
        let row = ServiceRow {
            id: Uuid::new_v4(),
            client_id: request.client_id,
            date,
            hours,
            hourly_rate,
            description: description.trim().to_string(),
            status: status.to_string(),
            pricing_type: request.pricing_type.map(|p| p.to_string()),
            start_date,
            end_date,
            created_at: now,
            updated_at: now,
        };

        diesel::insert_into(services::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| {
                error!("Failed to create service: {e}");
                ServicesError::from(e)
            })?;

        info!("Created service {} for client {}", row.id, row.client_id);
        Ok(row.into())
    }

    pub async fn update_service(
        &self,
        id: Uuid,
        request: UpdateServiceRequest,
    ) -> Result<Service, ServicesError> {
        let mut conn = self.conn()?;
        let current = Service::from(load_row(&mut conn, id)?);

        if current.status == ServiceStatus::Invoiced {
            if request.changes_amount() || request.client_id.is_some() {
                return Err(ServicesError::Conflict(
                    "an invoiced service cannot change its amount or client".to_string(),
                ));
            }
            if request.status.is_some_and(|s| s != ServiceStatus::Invoiced) {
                return Err(ServicesError::Conflict(
                    "an invoiced service keeps its status until the invoice is deleted".to_string(),
                ));
            }
        } else if request.status == Some(ServiceStatus::Invoiced) {
            return Err(ServicesError::Validation(
                "services become invoiced only through an invoice".to_string(),
            ));
        }

        let pricing_type = request.pricing_type.or(current.pricing_type);
        let start_date = request.start_date.or(current.start_date);
        let end_date = request.end_date.or(current.end_date);
        let hours = if pricing_type == Some(PricingType::Daily) {
            resolve_quantity(pricing_type, None, start_date, end_date)?
        } else {
            request.hours.unwrap_or(current.hours)
        };
        let hourly_rate = request.hourly_rate.unwrap_or(current.hourly_rate);
        validate_amounts(hours, hourly_rate)?;

        let description = request.description.unwrap_or(current.description);
        if description.trim().is_empty() {
            return Err(ServicesError::Validation("description is required".to_string()));
        }

        let client_id = request.client_id.unwrap_or(current.client_id);
        if client_id != current.client_id {
            ensure_client_exists(&mut conn, client_id)?;
        }

        let (start_date, end_date) = dates_for(pricing_type, start_date, end_date);

        let row: ServiceRow = diesel::update(services::table.filter(services::id.eq(id)))
            .set((
                services::client_id.eq(client_id),
                services::date.eq(service_date(
                    pricing_type,
                    request.date,
                    request.start_date,
                    current.date,
                )),
                services::hours.eq(hours),
                services::hourly_rate.eq(hourly_rate),
                services::description.eq(description.trim()),
                services::status.eq(request.status.unwrap_or(current.status).to_string()),
                services::pricing_type.eq(pricing_type.map(|p| p.to_string())),
                services::start_date.eq(start_date),
                services::end_date.eq(end_date),
                services::updated_at.eq(Utc::now()),
            ))
            .returning(ServiceRow::as_returning())
            .get_result(&mut conn)
            .map_err(|e| {
                error!("Failed to update service {id}: {e}");
                ServicesError::from(e)
            })?;

        Ok(row.into())
    }

    pub async fn delete_service(&self, id: Uuid) -> Result<(), ServicesError> {
        let mut conn = self.conn()?;
        let current = load_row(&mut conn, id)?;

        if current.status == ServiceStatus::Invoiced.to_string() {
            return Err(ServicesError::Conflict(
                "an invoiced service cannot be deleted".to_string(),
            ));
        }

        diesel::delete(services::table.filter(services::id.eq(id)))
            .execute(&mut conn)
            .map_err(|e| {
                error!("Failed to delete service {id}: {e}");
                ServicesError::from(e)
            })?;
        Ok(())
    }

    /// One update per id. Invoiced services, unknown ids and requests to
    /// mark as invoiced are skipped.
    pub async fn bulk_update_status(
        &self,
        request: BulkStatusRequest,
    ) -> Result<BulkStatusResponse, ServicesError> {
        let mut response = BulkStatusResponse::default();

        if request.status == ServiceStatus::Invoiced {
            response.skipped = request.ids.len();
            return Ok(response);
        }

        let mut conn = self.conn()?;
        for id in request.ids {
            let updated = diesel::update(
                services::table
                    .filter(services::id.eq(id))
                    .filter(services::status.ne(ServiceStatus::Invoiced.to_string())),
            )
            .set((
                services::status.eq(request.status.to_string()),
                services::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn);

            match updated {
                Ok(1) => response.updated += 1,
                Ok(_) => response.skipped += 1,
                Err(e) => {
                    warn!("Failed to update status of service {id}: {e}");
                    response.skipped += 1;
                }
            }
        }

        Ok(response)
    }
}

pub(crate) fn load_row(conn: &mut PgConnection, id: Uuid) -> Result<ServiceRow, ServicesError> {
    services::table
        .filter(services::id.eq(id))
        .select(ServiceRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ServicesError::NotFound(id.to_string()))
}

fn ensure_client_exists(conn: &mut PgConnection, client_id: Uuid) -> Result<(), ServicesError> {
    let exists: bool = diesel::select(diesel::dsl::exists(
        clients::table.filter(clients::id.eq(client_id)),
    ))
    .get_result(conn)?;

    if !exists {
        return Err(ServicesError::Validation(format!(
            "client {client_id} does not exist"
        )));
    }
    Ok(())
}

/// Only daily pricing keeps a date range.
fn dates_for(
    pricing: Option<PricingType>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match pricing {
        Some(PricingType::Daily) => (start, end),
        _ => (None, None),
    }
}

/// A daily service is dated by its first day unless a date is given.
pub fn service_date(
    pricing_type: Option<PricingType>,
    date: Option<NaiveDate>,
    start_date: Option<NaiveDate>,
    current: NaiveDate,
) -> NaiveDate {
    match (date, pricing_type, start_date) {
        (Some(date), _, _) => date,
        (None, Some(PricingType::Daily), Some(start)) => start,
        _ => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dates_kept_for_daily_only() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1);
        let end = NaiveDate::from_ymd_opt(2025, 3, 5);
        assert_eq!(dates_for(Some(PricingType::Daily), start, end), (start, end));
        assert_eq!(dates_for(Some(PricingType::Hourly), start, end), (None, None));
        assert_eq!(dates_for(None, start, end), (None, None));
    }

    #[test]
    fn test_moved_daily_range_moves_date() {
        let march = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let april = NaiveDate::from_ymd_opt(2025, 4, 7).unwrap();
        let given = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();

        assert_eq!(service_date(Some(PricingType::Daily), None, Some(april), march), april);
        assert_eq!(service_date(Some(PricingType::Daily), Some(given), Some(april), march), given);
        assert_eq!(service_date(Some(PricingType::Daily), None, None, march), march);
        assert_eq!(service_date(Some(PricingType::Hourly), None, Some(april), march), march);
        assert_eq!(service_date(None, None, Some(april), march), march);
    }
}
