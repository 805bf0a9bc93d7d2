use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use log::{error, info};
use std::collections::HashSet;
use uuid::Uuid;

use super::error::InvoicesError;
use super::totals::{compute_totals, default_due_date, format_invoice_number};
use super::types::*;
use crate::clients::Client;
use crate::core::config::CompanyConfig;
use crate::core::shared::schema::{clients, invoices, services};
use crate::core::shared::utils::{DbConn, DbPool};
use crate::prestations::{Service, ServiceRow, ServiceStatus};

const DEFAULT_LIMIT: i64 = 100;

pub struct InvoicesService {
    pool: DbPool,
    company: CompanyConfig,
}

/// Everything needed to render an invoice document.
#[derive(Debug, Clone)]
pub struct InvoiceDocument {
    pub invoice: Invoice,
    pub client: Client,
    pub services: Vec<Service>,
}

impl InvoicesService {
    pub fn new(pool: DbPool, company: CompanyConfig) -> Self {
        Self { pool, company }
    }

    fn conn(&self) -> Result<DbConn, InvoicesError> {
        self.pool.get().map_err(|e| {
            error!("Failed to get database connection: {e}");
            InvoicesError::Connection
        })
    }

    pub async fn list_invoices(&self, query: InvoiceListQuery) -> Result<Vec<Invoice>, InvoicesError> {
        let mut conn = self.conn()?;
        let mut q = invoices::table.into_boxed();

        if let Some(client_id) = query.client_id {
            q = q.filter(invoices::client_id.eq(client_id));
        }
        if let Some(status) = query.status {
            q = q.filter(invoices::status.eq(status.to_string()));
        }

        let rows: Vec<InvoiceRow> = q
            .order((invoices::issue_date.desc(), invoices::number.desc()))
            .limit(query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 1000))
            .offset(query.offset.unwrap_or(0).max(0))
            .select(InvoiceRow::as_select())
            .load(&mut conn)
            .map_err(|e| {
                error!("Failed to list invoices: {e}");
                InvoicesError::from(e)
            })?;

        Ok(rows.into_iter().map(Invoice::from).collect())
    }

    /// Invoices issued in `[start, end)`.
    pub async fn issued_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Invoice>, InvoicesError> {
        let mut conn = self.conn()?;
        let rows: Vec<InvoiceRow> = invoices::table
            .filter(invoices::issue_date.ge(start))
            .filter(invoices::issue_date.lt(end))
            .order(invoices::issue_date.asc())
            .select(InvoiceRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Invoice::from).collect())
    }

    pub async fn get_invoice(&self, id: Uuid) -> Result<Invoice, InvoicesError> {
        let mut conn = self.conn()?;
        load_invoice(&mut conn, id)
    }

    pub async fn create_invoice(&self, request: CreateInvoiceRequest) -> Result<Invoice, InvoicesError> {
        let mut seen = HashSet::new();
        let service_ids: Vec<Uuid> = request
            .service_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();
        if service_ids.is_empty() {
            return Err(InvoicesError::Validation(
                "at least one service is required".to_string(),
            ));
        }

        let activity = request
            .activity_type
            .unwrap_or(self.company.default_activity_type);
        let issue_date = request.issue_date.unwrap_or_else(|| Utc::now().date_naive());
        let due_date = match request.due_date {
            Some(due_date) => due_date,
            None => default_due_date(issue_date, self.company.due_days)?,
        };
        if due_date < issue_date {
            return Err(InvoicesError::Validation(
                "due date must not precede issue date".to_string(),
            ));
        }

        let client_id = request.client_id;
        let notes = request.notes;
        let prefix = self.company.invoice_prefix.clone();
        let mut conn = self.conn()?;

        let row = conn.transaction::<_, InvoicesError, _>(|conn| {
            load_client(conn, client_id)?;

            let services = lock_services(conn, &service_ids)?;
            check_invoiceable(&services, &service_ids, client_id)?;

            let totals = compute_totals(&services, activity);
            let sequence: i64 =
                diesel::select(diesel::dsl::sql::<BigInt>("nextval('invoice_number_seq')"))
                    .get_result(conn)?;

            let now = Utc::now();
            let row = InvoiceRow {
                id: Uuid::new_v4(),
                number: format_invoice_number(&prefix, issue_date, sequence),
                client_id,
                activity_type: activity.to_string(),
                service_ids: service_ids.clone(),
                subtotal: totals.subtotal,
                urssaf_rate: totals.urssaf_rate,
                urssaf_deduction: totals.urssaf_deduction,
                net_amount: totals.net_amount,
                status: InvoiceStatus::Draft.to_string(),
                issue_date,
                due_date,
                notes,
                sent_at: None,
                paid_at: None,
                created_at: now,
                updated_at: now,
            };

            diesel::insert_into(invoices::table)
                .values(&row)
                .execute(conn)?;

            let marked = diesel::update(
                services::table
                    .filter(services::id.eq_any(&service_ids))
                    .filter(services::status.ne(ServiceStatus::Invoiced.to_string())),
            )
            .set((
                services::status.eq(ServiceStatus::Invoiced.to_string()),
                services::updated_at.eq(now),
            ))
            .execute(conn)?;
            ensure_all_marked(marked, service_ids.len())?;

            Ok(row)
        })
        .map_err(|e| {
            error!("Failed to create invoice for client {client_id}: {e}");
            e
        })?;

        info!("Created invoice {} ({} services)", row.number, row.service_ids.len());
        Ok(row.into())
    }

    pub async fn update_invoice(
        &self,
        id: Uuid,
        request: UpdateInvoiceRequest,
    ) -> Result<Invoice, InvoicesError> {
        let mut conn = self.conn()?;
        conn.transaction::<_, InvoicesError, _>(|conn| {
            let current = load_invoice(conn, id)?;
            require_draft(&current)?;

            let issue_date = request.issue_date.unwrap_or(current.issue_date);
            let due_date = request.due_date.unwrap_or(current.due_date);
            if due_date < issue_date {
                return Err(InvoicesError::Validation(
                    "due date must not precede issue date".to_string(),
                ));
            }

            let activity = request.activity_type.unwrap_or(current.activity_type);
            let services = load_services(conn, &current.service_ids)?;
            let totals = compute_totals(&services, activity);

            let row: InvoiceRow = diesel::update(invoices::table.filter(invoices::id.eq(id)))
                .set((
                    invoices::activity_type.eq(activity.to_string()),
                    invoices::issue_date.eq(issue_date),
                    invoices::due_date.eq(due_date),
                    invoices::notes.eq(request.notes.or(current.notes)),
                    invoices::subtotal.eq(totals.subtotal),
                    invoices::urssaf_rate.eq(totals.urssaf_rate),
                    invoices::urssaf_deduction.eq(totals.urssaf_deduction),
                    invoices::net_amount.eq(totals.net_amount),
                    invoices::updated_at.eq(Utc::now()),
                ))
                .returning(InvoiceRow::as_returning())
                .get_result(conn)?;
            Ok(row.into())
        })
    }

    pub async fn send_invoice(&self, id: Uuid) -> Result<Invoice, InvoicesError> {
        self.change_status(id, InvoiceStatus::Sent).await
    }

    pub async fn mark_as_paid(&self, id: Uuid) -> Result<Invoice, InvoicesError> {
        self.change_status(id, InvoiceStatus::Paid).await
    }

    async fn change_status(&self, id: Uuid, target: InvoiceStatus) -> Result<Invoice, InvoicesError> {
        let mut conn = self.conn()?;
        let current = load_invoice(&mut conn, id)?;
        let status = current.status.transition(target)?;
        let now = Utc::now();

        let row: InvoiceRow = diesel::update(invoices::table.filter(invoices::id.eq(id)))
            .set((
                invoices::status.eq(status.to_string()),
                invoices::sent_at.eq(if status == InvoiceStatus::Sent { Some(now) } else { current.sent_at }),
                invoices::paid_at.eq(if status == InvoiceStatus::Paid { Some(now) } else { current.paid_at }),
                invoices::updated_at.eq(now),
            ))
            .returning(InvoiceRow::as_returning())
            .get_result(&mut conn)
            .map_err(|e| {
                error!("Failed to move invoice {id} to {status}: {e}");
                InvoicesError::from(e)
            })?;

        info!("Invoice {} is now {}", row.number, status);
        Ok(row.into())
    }

    /// Refreshes a draft's totals from its services' current amounts.
    pub async fn recalculate(&self, id: Uuid) -> Result<Invoice, InvoicesError> {
        self.update_invoice(id, UpdateInvoiceRequest::default()).await
    }

    /// Drafts only. Their services go back to `completed`.
    pub async fn delete_invoice(&self, id: Uuid) -> Result<(), InvoicesError> {
        let mut conn = self.conn()?;
        conn.transaction::<_, InvoicesError, _>(|conn| {
            let current = load_invoice(conn, id)?;
            if current.status != InvoiceStatus::Draft {
                return Err(InvoicesError::InvalidStatus(format!(
                    "only draft invoices can be deleted, {} is {}",
                    current.number, current.status
                )));
            }

            diesel::update(services::table.filter(services::id.eq_any(&current.service_ids)))
                .set((
                    services::status.eq(ServiceStatus::Completed.to_string()),
                    services::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

            diesel::delete(invoices::table.filter(invoices::id.eq(id))).execute(conn)?;
            info!("Deleted draft invoice {}", current.number);
            Ok(())
        })
    }

    pub async fn stats(&self) -> Result<InvoiceStats, InvoicesError> {
        let mut conn = self.conn()?;
        let rows: Vec<InvoiceRow> = invoices::table
            .select(InvoiceRow::as_select())
            .load(&mut conn)
            .map_err(|e| {
                error!("Failed to load invoices for stats: {e}");
                InvoicesError::from(e)
            })?;
        let invoices: Vec<Invoice> = rows.into_iter().map(Invoice::from).collect();
        Ok(invoice_stats(&invoices, Utc::now().date_naive()))
    }

    pub async fn document(&self, id: Uuid) -> Result<InvoiceDocument, InvoicesError> {
        let mut conn = self.conn()?;
        let invoice = load_invoice(&mut conn, id)?;
        let client = load_client(&mut conn, invoice.client_id)?;
        let mut services = load_services(&mut conn, &invoice.service_ids)?;
        services.sort_by_key(|s| s.date);
        Ok(InvoiceDocument {
            invoice,
            client,
            services,
        })
    }
}

/// All requested services exist, belong to the client and are not invoiced yet.
pub fn check_invoiceable(
    services: &[Service],
    requested: &[Uuid],
    client_id: Uuid,
) -> Result<(), InvoicesError> {
    let found: HashSet<Uuid> = services.iter().map(|s| s.id).collect();
    let missing: Vec<String> = requested
        .iter()
        .filter(|id| !found.contains(id))
        .map(Uuid::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(InvoicesError::Validation(format!(
            "unknown services: {}",
            missing.join(", ")
        )));
    }

    if let Some(other) = services.iter().find(|s| s.client_id != client_id) {
        return Err(InvoicesError::Validation(format!(
            "service {} belongs to another client",
            other.id
        )));
    }

    if let Some(invoiced) = services.iter().find(|s| s.status == ServiceStatus::Invoiced) {
        return Err(InvoicesError::Conflict(format!(
            "service {} is already invoiced",
            invoiced.id
        )));
    }

    Ok(())
}

fn require_draft(invoice: &Invoice) -> Result<(), InvoicesError> {
    if invoice.status != InvoiceStatus::Draft {
        return Err(InvoicesError::InvalidStatus(format!(
            "invoice {} is {}, only drafts can be modified",
            invoice.number, invoice.status
        )));
    }
    Ok(())
}

fn load_invoice(conn: &mut PgConnection, id: Uuid) -> Result<Invoice, InvoicesError> {
    invoices::table
        .filter(invoices::id.eq(id))
        .select(InvoiceRow::as_select())
        .first(conn)
        .optional()?
        .map(Invoice::from)
        .ok_or_else(|| InvoicesError::NotFound(id.to_string()))
}

fn load_client(conn: &mut PgConnection, id: Uuid) -> Result<Client, InvoicesError> {
    clients::table
        .filter(clients::id.eq(id))
        .select(Client::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| InvoicesError::Validation(format!("client {id} does not exist")))
}

/// Rolls the invoice back when another one claimed some of its services first.
pub fn ensure_all_marked(marked: usize, expected: usize) -> Result<(), InvoicesError> {
    if marked != expected {
        return Err(InvoicesError::Conflict(format!(
            "{} of {expected} services were invoiced concurrently",
            expected.saturating_sub(marked)
        )));
    }
    Ok(())
}

/// Row locks held until the transaction ends.
fn lock_services(conn: &mut PgConnection, ids: &[Uuid]) -> Result<Vec<Service>, InvoicesError> {
    let rows: Vec<ServiceRow> = services::table
        .filter(services::id.eq_any(ids))
        .select(ServiceRow::as_select())
        .for_update()
        .load(conn)?;
    Ok(rows.into_iter().map(Service::from).collect())
}

fn load_services(conn: &mut PgConnection, ids: &[Uuid]) -> Result<Vec<Service>, InvoicesError> {
    let rows: Vec<ServiceRow> = services::table
        .filter(services::id.eq_any(ids))
        .select(ServiceRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(Service::from).collect())
}
