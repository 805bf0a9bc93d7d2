pub mod articles;
pub mod clients;
pub mod core;
pub mod invoices;
pub mod main_module;
pub mod messages;
pub mod prestations;
pub mod reports;
pub mod urssaf;
