// Analytics module - LLM-derived analytics tools and their records

pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

pub use routes::analytics_routes;
