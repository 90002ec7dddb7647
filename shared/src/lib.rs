//! Shared types and rules for the warehouse management platform
//!
//! This crate contains the stock ledger, pricing and analytics rules shared
//! between the backend, the web client (via WASM), and tests.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
