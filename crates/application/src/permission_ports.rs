//! Ports between the permission services and their collaborators.

mod cache;
mod events;
mod repository;

pub use cache::{PermissionCache, PermissionCacheKey, PermissionCachePayload, PermissionDataset};
pub use events::{PermissionChangeEvent, PermissionChangeSource, run_invalidation_listener};
pub use repository::{MenuConfigRepository, PermissionSourceRepository};
