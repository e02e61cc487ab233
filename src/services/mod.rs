pub mod categories;
pub mod customers;
pub mod products;
pub mod stats;
pub mod stock;
pub mod suppliers;
pub mod users;
pub mod variant_suppliers;
pub mod variants;
