//! Domain models for the warehouse management platform

mod analytics;
mod product;
pub mod stock;
mod transaction;
mod user;

pub use analytics::*;
pub use product::*;
pub use stock::{classify, ProductStatus, StockError};
pub use transaction::*;
pub use user::*;
