use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use freightdesk_application::PermissionSourceRepository;
use freightdesk_core::{AppError, AppResult, ProjectId, UserId};
use freightdesk_domain::{
    PermissionSets, ProjectRef, Role, RoleTemplate, UserPermissionOverride, UserProfile,
};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::warn;

/// PostgreSQL-backed permission store.
///
/// Reads are lenient: rows with missing set columns default to empty sets,
/// a missing `inherit_role` defaults to additive, and rows carrying an
/// unknown role value are skipped with a warning instead of failing the
/// whole fetch.
#[derive(Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleTemplateRow {
    role: String,
    display_name: String,
    description: Option<String>,
    color: Option<String>,
    menu_permissions: Option<Vec<String>>,
    function_permissions: Option<Vec<String>>,
    project_permissions: Option<Vec<String>>,
    data_permissions: Option<Vec<String>>,
    is_system: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct UserOverrideRow {
    user_id: uuid::Uuid,
    project_id: Option<uuid::Uuid>,
    menu_permissions: Option<Vec<String>>,
    function_permissions: Option<Vec<String>>,
    project_permissions: Option<Vec<String>>,
    data_permissions: Option<Vec<String>>,
    inherit_role: Option<bool>,
    custom_settings: Option<Json<serde_json::Value>>,
    created_by: Option<uuid::Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    user_id: uuid::Uuid,
    role: String,
    is_active: bool,
    display_name: Option<String>,
}

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: uuid::Uuid,
    name: String,
}

fn sets_from_columns(
    menu: Option<Vec<String>>,
    function: Option<Vec<String>>,
    project: Option<Vec<String>>,
    data: Option<Vec<String>>,
) -> PermissionSets {
    PermissionSets::from_keys(
        menu.unwrap_or_default(),
        function.unwrap_or_default(),
        project.unwrap_or_default(),
        data.unwrap_or_default(),
    )
}

impl RoleTemplateRow {
    fn into_template(self) -> Option<RoleTemplate> {
        let Ok(role) = Role::from_str(self.role.as_str()) else {
            warn!(role = %self.role, "skipping template row with unknown role");
            return None;
        };

        Some(RoleTemplate {
            role,
            display_name: self.display_name,
            description: self.description,
            color: self.color,
            permissions: sets_from_columns(
                self.menu_permissions,
                self.function_permissions,
                self.project_permissions,
                self.data_permissions,
            ),
            is_system: self.is_system,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserOverrideRow {
    fn into_override(self) -> UserPermissionOverride {
        UserPermissionOverride {
            user_id: UserId::from_uuid(self.user_id),
            project_id: self.project_id.map(ProjectId::from_uuid),
            permissions: sets_from_columns(
                self.menu_permissions,
                self.function_permissions,
                self.project_permissions,
                self.data_permissions,
            ),
            inherit_role: self.inherit_role.unwrap_or(true),
            custom_settings: self
                .custom_settings
                .map_or(serde_json::Value::Null, |json| json.0),
            created_by: self.created_by.map(UserId::from_uuid),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl ProfileRow {
    fn into_profile(self) -> UserProfile {
        let user_id = UserId::from_uuid(self.user_id);
        let role = Role::from_str(self.role.as_str()).unwrap_or_else(|_| {
            warn!(%user_id, role = %self.role, "profile carries an unknown role; treating as viewer");
            Role::Viewer
        });

        UserProfile {
            user_id,
            role,
            is_active: self.is_active,
            display_name: self.display_name.unwrap_or_default(),
        }
    }
}

fn set_column(keys: &std::collections::BTreeSet<String>) -> Vec<String> {
    keys.iter().cloned().collect()
}

#[async_trait]
impl PermissionSourceRepository for PostgresPermissionRepository {
    async fn fetch_role_templates(&self) -> AppResult<Vec<RoleTemplate>> {
        let rows = sqlx::query_as::<_, RoleTemplateRow>(
            r#"
            SELECT
                role,
                display_name,
                description,
                color,
                menu_permissions,
                function_permissions,
                project_permissions,
                data_permissions,
                is_system,
                created_at,
                updated_at
            FROM role_permission_templates
            ORDER BY role
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role templates: {error}")))?;

        Ok(rows.into_iter().filter_map(RoleTemplateRow::into_template).collect())
    }

    async fn fetch_user_overrides(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        let rows = sqlx::query_as::<_, UserOverrideRow>(
            r#"
            SELECT
                user_id,
                project_id,
                menu_permissions,
                function_permissions,
                project_permissions,
                data_permissions,
                inherit_role,
                custom_settings,
                created_by,
                created_at,
                updated_at
            FROM user_permissions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load overrides for '{user_id}': {error}"))
        })?;

        Ok(rows.into_iter().map(UserOverrideRow::into_override).collect())
    }

    async fn fetch_profile(&self, user_id: UserId) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, role, is_active, display_name
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load profile for '{user_id}': {error}"))
        })?;

        Ok(row.map(ProfileRow::into_profile))
    }

    async fn fetch_projects(&self) -> AppResult<Vec<ProjectRef>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name
            FROM projects
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load projects: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| ProjectRef {
                id: ProjectId::from_uuid(row.id),
                name: row.name,
            })
            .collect())
    }

    async fn upsert_role_template(&self, template: RoleTemplate) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO role_permission_templates (
                role, display_name, description, color,
                menu_permissions, function_permissions,
                project_permissions, data_permissions,
                is_system, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (role) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                description = EXCLUDED.description,
                color = EXCLUDED.color,
                menu_permissions = EXCLUDED.menu_permissions,
                function_permissions = EXCLUDED.function_permissions,
                project_permissions = EXCLUDED.project_permissions,
                data_permissions = EXCLUDED.data_permissions,
                is_system = EXCLUDED.is_system,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(template.role.as_str())
        .bind(&template.display_name)
        .bind(&template.description)
        .bind(&template.color)
        .bind(set_column(&template.permissions.menu))
        .bind(set_column(&template.permissions.function))
        .bind(set_column(&template.permissions.project))
        .bind(set_column(&template.permissions.data))
        .bind(template.is_system)
        .bind(template.created_at)
        .bind(template.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save role template: {error}")))?;

        Ok(())
    }

    async fn delete_role_template(&self, role: Role) -> AppResult<()> {
        sqlx::query("DELETE FROM role_permission_templates WHERE role = $1")
            .bind(role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete role template: {error}"))
            })?;

        Ok(())
    }

    async fn upsert_user_overrides(
        &self,
        overrides: Vec<UserPermissionOverride>,
    ) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        for row in overrides {
            sqlx::query(
                r#"
                INSERT INTO user_permissions (
                    user_id, project_id,
                    menu_permissions, function_permissions,
                    project_permissions, data_permissions,
                    inherit_role, custom_settings, created_by,
                    created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                ON CONFLICT (user_id, project_id) DO UPDATE SET
                    menu_permissions = EXCLUDED.menu_permissions,
                    function_permissions = EXCLUDED.function_permissions,
                    project_permissions = EXCLUDED.project_permissions,
                    data_permissions = EXCLUDED.data_permissions,
                    inherit_role = EXCLUDED.inherit_role,
                    custom_settings = EXCLUDED.custom_settings,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(row.user_id.as_uuid())
            .bind(row.project_id.map(|id| id.as_uuid()))
            .bind(set_column(&row.permissions.menu))
            .bind(set_column(&row.permissions.function))
            .bind(set_column(&row.permissions.project))
            .bind(set_column(&row.permissions.data))
            .bind(row.inherit_role)
            .bind(Json(row.custom_settings))
            .bind(row.created_by.map(|id| id.as_uuid()))
            .bind(row.created_at)
            .bind(row.updated_at)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to save user override: {error}"))
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }

    async fn delete_user_overrides(
        &self,
        user_ids: &[UserId],
        project_id: Option<ProjectId>,
    ) -> AppResult<()> {
        let ids: Vec<uuid::Uuid> = user_ids.iter().map(|id| id.as_uuid()).collect();
        sqlx::query(
            r#"
            DELETE FROM user_permissions
            WHERE user_id = ANY($1)
                AND project_id IS NOT DISTINCT FROM $2
            "#,
        )
        .bind(&ids)
        .bind(project_id.map(|id| id.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete user overrides: {error}"))
        })?;

        Ok(())
    }

    async fn update_profile_roles(&self, user_ids: &[UserId], role: Role) -> AppResult<()> {
        let ids: Vec<uuid::Uuid> = user_ids.iter().map(|id| id.as_uuid()).collect();
        sqlx::query("UPDATE profiles SET role = $2 WHERE user_id = ANY($1)")
            .bind(&ids)
            .bind(role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to update profile roles: {error}"))
            })?;

        Ok(())
    }

    async fn update_profile_status(&self, user_ids: &[UserId], is_active: bool) -> AppResult<()> {
        let ids: Vec<uuid::Uuid> = user_ids.iter().map(|id| id.as_uuid()).collect();
        sqlx::query("UPDATE profiles SET is_active = $2 WHERE user_id = ANY($1)")
            .bind(&ids)
            .bind(is_active)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to update profile status: {error}"))
            })?;

        Ok(())
    }
}
