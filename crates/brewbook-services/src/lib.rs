//! High-level orchestration over the lower crates: reconciling imported
//! data into a dataset, linking recipe ingredients against the library,
//! and whole-dataset backup/restore. Intentionally thin; exposes stable
//! entrypoints for CLI and other frontends.

mod backup;
mod link;
mod reconcile;

pub use backup::{backup_from_json, backup_to_json, make_backup, restore_backup};
pub use link::{link_recipe, resolve_or_create, IngredientDefaults};
pub use reconcile::{
    begin, pending_from_import, step, Conflict, PendingItem, ReconcileAction, ReconcileState,
    Resolution, Status,
};

pub use brewbook_core::Result;
