use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use log::{error, info};
use std::collections::HashMap;
use uuid::Uuid;

use super::error::ClientsError;
use super::types::*;
use crate::core::shared::schema::{clients, invoices, services};
use crate::core::shared::utils::{DbConn, DbPool};
use crate::prestations::{Service, ServiceRow};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

pub struct ClientsService {
    pool: DbPool,
}

fn filtered(search: Option<&str>) -> clients::BoxedQuery<'static, Pg> {
    let mut q = clients::table.into_boxed();
    if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        q = q.filter(
            clients::name
                .ilike(pattern.clone())
                .or(clients::email.ilike(pattern.clone()))
                .or(clients::company.ilike(pattern)),
        );
    }
    q
}

impl ClientsService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConn, ClientsError> {
        self.pool.get().map_err(|e| {
            error!("Failed to get database connection: {e}");
            ClientsError::Connection
        })
    }

    pub async fn list_clients(&self, query: ClientListQuery) -> Result<ClientListResponse, ClientsError> {
        let mut conn = self.conn()?;
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = query.offset.unwrap_or(0).max(0);
        let search = query.search.as_deref();

        let total: i64 = filtered(search).count().get_result(&mut conn).map_err(|e| {
            error!("Failed to count clients: {e}");
            ClientsError::from(e)
        })?;

        let clients: Vec<Client> = filtered(search)
            .order(clients::name.asc())
            .limit(limit)
            .offset(offset)
            .select(Client::as_select())
            .load(&mut conn)
            .map_err(|e| {
                error!("Failed to list clients: {e}");
                ClientsError::from(e)
            })?;

        Ok(ClientListResponse {
            clients,
            total,
            limit,
            offset,
        })
    }

    pub async fn count_clients(&self) -> Result<i64, ClientsError> {
        let mut conn = self.conn()?;
        Ok(clients::table.count().get_result(&mut conn)?)
    }

    /// Display name per client id, for exports.
    pub async fn client_names(&self) -> Result<HashMap<Uuid, String>, ClientsError> {
        let mut conn = self.conn()?;
        let all: Vec<Client> = clients::table.select(Client::as_select()).load(&mut conn)?;
        Ok(all
            .iter()
            .map(|c| (c.id, c.display_name().to_string()))
            .collect())
    }

    pub async fn get_client(&self, id: Uuid) -> Result<Client, ClientsError> {
        let mut conn = self.conn()?;
        load_client(&mut conn, id)
    }

    pub async fn create_client(&self, request: CreateClientRequest) -> Result<Client, ClientsError> {
        if request.name.trim().is_empty() {
            return Err(ClientsError::Validation("name is required".to_string()));
        }
        validate_email(request.email.as_deref())?;
        validate_siret(request.siret.as_deref())?;

        let mut conn = self.conn()?;
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email: request.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
            phone: request.phone,
            company: request.company,
            address_line1: request.address_line1,
            postal_code: request.postal_code,
            city: request.city,
            country: request.country,
            siret: normalize_siret(request.siret),
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        diesel::insert_into(clients::table)
            .values(&client)
            .execute(&mut conn)
            .map_err(|e| {
                error!("Failed to create client: {e}");
                ClientsError::from(e)
            })?;

        info!("Created client {} ({})", client.name, client.id);
        Ok(client)
    }

    pub async fn update_client(
        &self,
        id: Uuid,
        request: UpdateClientRequest,
    ) -> Result<Client, ClientsError> {
        let mut conn = self.conn()?;
        let current = load_client(&mut conn, id)?;

        let name = request.name.unwrap_or(current.name);
        if name.trim().is_empty() {
            return Err(ClientsError::Validation("name is required".to_string()));
        }
        let email = request.email.or(current.email);
        validate_email(email.as_deref())?;
        let siret = request.siret.or(current.siret);
        validate_siret(siret.as_deref())?;

        diesel::update(clients::table.filter(clients::id.eq(id)))
            .set((
                clients::name.eq(name.trim()),
                clients::email.eq(email),
                clients::phone.eq(request.phone.or(current.phone)),
                clients::company.eq(request.company.or(current.company)),
                clients::address_line1.eq(request.address_line1.or(current.address_line1)),
                clients::postal_code.eq(request.postal_code.or(current.postal_code)),
                clients::city.eq(request.city.or(current.city)),
                clients::country.eq(request.country.or(current.country)),
                clients::siret.eq(normalize_siret(siret)),
                clients::notes.eq(request.notes.or(current.notes)),
                clients::updated_at.eq(Utc::now()),
            ))
            .returning(Client::as_returning())
            .get_result(&mut conn)
            .map_err(|e| {
                error!("Failed to update client {id}: {e}");
                ClientsError::from(e)
            })
    }

    /// Refuses while services or invoices still reference the client.
    pub async fn delete_client(&self, id: Uuid) -> Result<(), ClientsError> {
        let mut conn = self.conn()?;
        load_client(&mut conn, id)?;

        let service_count: i64 = services::table
            .filter(services::client_id.eq(id))
            .count()
            .get_result(&mut conn)?;
        let invoice_count: i64 = invoices::table
            .filter(invoices::client_id.eq(id))
            .count()
            .get_result(&mut conn)?;

        if service_count > 0 || invoice_count > 0 {
            return Err(ClientsError::Conflict(format!(
                "client still has {service_count} service(s) and {invoice_count} invoice(s)"
            )));
        }

        diesel::delete(clients::table.filter(clients::id.eq(id)))
            .execute(&mut conn)
            .map_err(|e| {
                error!("Failed to delete client {id}: {e}");
                ClientsError::from(e)
            })?;
        info!("Deleted client {id}");
        Ok(())
    }

    pub async fn client_summary(&self, id: Uuid) -> Result<ClientSummary, ClientsError> {
        let mut conn = self.conn()?;
        let client = load_client(&mut conn, id)?;

        let rows: Vec<ServiceRow> = services::table
            .filter(services::client_id.eq(id))
            .select(ServiceRow::as_select())
            .load(&mut conn)?;
        let services: Vec<Service> = rows.into_iter().map(Service::from).collect();

        let invoices_count: i64 = invoices::table
            .filter(invoices::client_id.eq(id))
            .count()
            .get_result(&mut conn)?;

        Ok(ClientSummary {
            client,
            totals: revenue_totals(&services),
            invoices_count,
        })
    }
}

fn load_client(conn: &mut PgConnection, id: Uuid) -> Result<Client, ClientsError> {
    clients::table
        .filter(clients::id.eq(id))
        .select(Client::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ClientsError::NotFound(id.to_string()))
}
