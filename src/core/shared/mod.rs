pub mod auth;
pub mod schema;
pub mod state;
pub mod utils;

pub use schema::*;
