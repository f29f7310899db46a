// Credits module - credit ledger and entitlement service

pub mod handlers;
pub mod ledger;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

pub use routes::credits_routes;
