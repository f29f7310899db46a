// SEO module - analysis tools and their write-once result records

pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

pub use routes::seo_routes;
