//! HTTP handlers

pub mod analytics;
pub mod auth;
pub mod category;
pub mod company;
pub mod health;
pub mod order;
pub mod product;
pub mod transaction;
pub mod transfer;
pub mod user;
pub mod warehouse;

pub use analytics::*;
pub use auth::*;
pub use category::*;
pub use company::*;
pub use health::*;
pub use order::*;
pub use product::*;
pub use transaction::*;
pub use transfer::*;
pub use user::*;
pub use warehouse::*;
