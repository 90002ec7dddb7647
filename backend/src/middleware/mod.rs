//! Request middleware and extractors

pub mod auth;
pub mod warehouse;

pub use auth::{auth_middleware, AuthUser, CurrentUser};
pub use warehouse::CurrentWarehouse;
