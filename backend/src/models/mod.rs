//! Domain models for the warehouse management backend
//!
//! Re-exports models from the shared crate; database row types live next to
//! the services that query them.

pub use shared::models::*;
