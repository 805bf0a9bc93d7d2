#[derive(Debug)]
pub struct ApiUrls;

impl ApiUrls {
    // Health
    pub const HEALTH: &'static str = "/health";
    pub const HEALTHZ: &'static str = "/healthz";

    // Clients - JSON APIs
    pub const CLIENTS: &'static str = "/api/clients";
    pub const CLIENT_BY_ID: &'static str = "/api/clients/:id";
    pub const CLIENT_SUMMARY: &'static str = "/api/clients/:id/summary";

    // Services (prestations) - JSON APIs
    pub const SERVICES: &'static str = "/api/services";
    pub const SERVICE_BY_ID: &'static str = "/api/services/:id";
    pub const SERVICES_BULK_STATUS: &'static str = "/api/services/bulk-status";
    pub const SERVICES_DAILY_QUANTITY: &'static str = "/api/services/daily-quantity";

    // Articles - JSON APIs
    pub const ARTICLES: &'static str = "/api/articles";
    pub const ARTICLE_BY_ID: &'static str = "/api/articles/:id";

    // Invoices - JSON APIs
    pub const INVOICES: &'static str = "/api/invoices";
    pub const INVOICE_STATS: &'static str = "/api/invoices/stats";
    pub const INVOICE_BY_ID: &'static str = "/api/invoices/:id";
    pub const INVOICE_SEND: &'static str = "/api/invoices/:id/send";
    pub const INVOICE_PAY: &'static str = "/api/invoices/:id/pay";
    pub const INVOICE_RECALCULATE: &'static str = "/api/invoices/:id/recalculate";
    pub const INVOICE_HTML: &'static str = "/api/invoices/:id/html";

    // URSSAF - JSON APIs
    pub const URSSAF_RATES: &'static str = "/api/urssaf/rates";
    pub const URSSAF_CALCULATE: &'static str = "/api/urssaf/calculate";
    pub const URSSAF_SUMMARY: &'static str = "/api/urssaf/summary";

    // Messages - JSON APIs
    pub const MESSAGES: &'static str = "/api/messages";
    pub const MESSAGES_COUNTS: &'static str = "/api/messages/counts";
    pub const MESSAGES_USERS_EMAILS: &'static str = "/api/messages/get-users-emails";
    pub const MESSAGES_BULK: &'static str = "/api/messages/bulk";
    pub const MESSAGE_BY_ID: &'static str = "/api/messages/:id";

    // Reports
    pub const REPORTS_STATS: &'static str = "/api/reports/stats";
    pub const REPORTS_STATS_XLSX: &'static str = "/api/reports/stats.xlsx";
    pub const REPORTS_ATTESTATION: &'static str = "/api/reports/attestation";
}
