//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_permission_cache;
mod in_memory_permission_repository;
mod pg_change_listener;
mod postgres_menu_repository;
mod postgres_permission_repository;

pub use in_memory_permission_cache::InMemoryPermissionCache;
pub use in_memory_permission_repository::InMemoryPermissionRepository;
pub use pg_change_listener::PgChangeListener;
pub use postgres_menu_repository::PostgresMenuRepository;
pub use postgres_permission_repository::PostgresPermissionRepository;
