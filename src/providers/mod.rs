// Providers module - bring-your-own-key management

pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

pub use routes::providers_routes;
