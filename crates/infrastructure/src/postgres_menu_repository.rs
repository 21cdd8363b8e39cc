use async_trait::async_trait;
use freightdesk_application::MenuConfigRepository;
use freightdesk_core::{AppError, AppResult};
use freightdesk_domain::MenuConfigEntry;
use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed menu configuration table.
#[derive(Clone)]
pub struct PostgresMenuRepository {
    pool: PgPool,
}

impl PostgresMenuRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MenuRow {
    key: String,
    parent_key: Option<String>,
    title: String,
    url: Option<String>,
    icon: Option<String>,
    order_index: Option<i32>,
    is_active: Option<bool>,
    is_group: bool,
    required_permissions: Option<Vec<String>>,
}

impl MenuRow {
    fn into_entry(self) -> MenuConfigEntry {
        MenuConfigEntry {
            key: self.key,
            parent_key: self.parent_key,
            title: self.title,
            url: self.url,
            icon: self.icon,
            order_index: self.order_index.unwrap_or(0),
            is_active: self.is_active.unwrap_or(true),
            is_group: self.is_group,
            required_permissions: self.required_permissions.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl MenuConfigRepository for PostgresMenuRepository {
    async fn fetch_menu_config(&self) -> AppResult<Vec<MenuConfigEntry>> {
        let rows = sqlx::query_as::<_, MenuRow>(
            r#"
            SELECT
                key,
                parent_key,
                title,
                url,
                icon,
                order_index,
                is_active,
                is_group,
                required_permissions
            FROM menu_config
            ORDER BY order_index, key
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load menu config: {error}")))?;

        Ok(rows.into_iter().map(MenuRow::into_entry).collect())
    }
}
