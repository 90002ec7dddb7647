//! Per-user "current warehouse" selection
//!
//! Lookups hit an in-process map first and fall back to the
//! `users.current_warehouse_id` column, which every write goes through to.

use dashmap::DashMap;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Clone, Default)]
pub struct WarehouseSelection {
    entries: Arc<DashMap<Uuid, Uuid>>,
}

impl WarehouseSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached selection only, without touching the database
    pub fn cached(&self, user_id: Uuid) -> Option<Uuid> {
        self.entries.get(&user_id).map(|entry| *entry.value())
    }

    /// Resolve the selected warehouse for a user, if any
    pub async fn get(&self, db: &PgPool, user_id: Uuid) -> AppResult<Option<Uuid>> {
        if let Some(warehouse_id) = self.cached(user_id) {
            return Ok(Some(warehouse_id));
        }

        let stored = sqlx::query_scalar::<_, Option<Uuid>>(
            "SELECT current_warehouse_id FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .flatten();

        if let Some(warehouse_id) = stored {
            self.entries.insert(user_id, warehouse_id);
        }

        Ok(stored)
    }

    /// Resolve the selected warehouse or fail with `NoWarehouseSelected`
    pub async fn require(&self, db: &PgPool, user_id: Uuid) -> AppResult<Uuid> {
        self.get(db, user_id)
            .await?
            .ok_or(AppError::NoWarehouseSelected)
    }

    /// Store a selection for a user
    pub async fn set(&self, db: &PgPool, user_id: Uuid, warehouse_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET current_warehouse_id = $1 WHERE id = $2")
            .bind(warehouse_id)
            .bind(user_id)
            .execute(db)
            .await?;

        self.entries.insert(user_id, warehouse_id);
        tracing::debug!(%user_id, %warehouse_id, "Warehouse selected");
        Ok(())
    }

    /// Drop a user's selection if it points at `warehouse_id`
    pub fn forget_user(&self, user_id: Uuid, warehouse_id: Uuid) {
        self.entries
            .remove_if(&user_id, |_, selected| *selected == warehouse_id);
    }

    /// Drop every cached selection pointing at `warehouse_id`.
    ///
    /// The database column is cleared by `ON DELETE SET NULL` or by the caller.
    pub fn forget_warehouse(&self, warehouse_id: Uuid) {
        self.entries.retain(|_, selected| *selected != warehouse_id);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    fn insert_cached(&self, user_id: Uuid, warehouse_id: Uuid) {
        self.entries.insert(user_id, warehouse_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forget_warehouse_drops_only_matching_entries() {
        let selection = WarehouseSelection::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let (north, south) = (Uuid::new_v4(), Uuid::new_v4());

        selection.insert_cached(alice, north);
        selection.insert_cached(bob, south);
        selection.forget_warehouse(north);

        assert_eq!(selection.cached(alice), None);
        assert_eq!(selection.cached(bob), Some(south));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_forget_user_requires_matching_warehouse() {
        let selection = WarehouseSelection::new();
        let user = Uuid::new_v4();
        let (north, south) = (Uuid::new_v4(), Uuid::new_v4());

        selection.insert_cached(user, north);
        selection.forget_user(user, south);
        assert_eq!(selection.cached(user), Some(north));

        selection.forget_user(user, north);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let selection = WarehouseSelection::new();
        let clone = selection.clone();
        let (user, warehouse) = (Uuid::new_v4(), Uuid::new_v4());

        clone.insert_cached(user, warehouse);
        assert_eq!(selection.cached(user), Some(warehouse));
    }
}
