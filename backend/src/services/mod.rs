//! Business logic services for the warehouse management backend

pub mod analytics;
pub mod auth;
pub mod category;
pub mod company;
pub mod order;
pub mod product;
pub mod transaction;
pub mod transfer;
pub mod user;
pub mod warehouse;

pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use category::CategoryService;
pub use company::CompanyService;
pub use order::OrderService;
pub use product::ProductService;
pub use transaction::TransactionService;
pub use transfer::TransferService;
pub use user::UserService;
pub use warehouse::WarehouseService;
