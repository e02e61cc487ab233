pub mod auth;
pub mod categories;
pub mod common;
pub mod customers;
pub mod health;
pub mod products;
pub mod stats;
pub mod suppliers;
pub mod variant_suppliers;
pub mod variants;
