//! HTTP server wiring and health endpoints

mod health;
mod server;

pub use health::*;
pub use server::*;
