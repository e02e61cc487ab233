//! sea-orm entities. Every domain table carries a `user_id` column; services
//! must filter on it for both reads and writes.

pub mod category;
pub mod customer;
pub mod product;
pub mod product_variant;
pub mod supplier;
pub mod user;
pub mod variant_supplier;
