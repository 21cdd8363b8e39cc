use axum::Json;
use axum::extract::{Extension, Query, State};
use freightdesk_core::{AppError, ProjectId, UserIdentity};
use freightdesk_domain::PermissionCategory;
use serde::Deserialize;

use crate::dto::{PermissionCheckResponse, PermissionContextResponse, ProjectResponse};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScopeQuery {
    project_id: Option<uuid::Uuid>,
}

impl ScopeQuery {
    fn project(&self) -> Option<ProjectId> {
        self.project_id.map(ProjectId::from_uuid)
    }
}

pub async fn context_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Query(scope): Query<ScopeQuery>,
) -> Json<PermissionContextResponse> {
    let context = state
        .permission_service
        .context(identity.user_id(), scope.project())
        .await;
    Json(PermissionContextResponse::from(&context))
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    category: String,
    key: String,
    project_id: Option<uuid::Uuid>,
}

pub async fn check_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Query(query): Query<CheckQuery>,
) -> ApiResult<Json<PermissionCheckResponse>> {
    let category = parse_category(query.category.as_str())?;
    let allowed = state
        .permission_service
        .check(
            identity.user_id(),
            query.project_id.map(ProjectId::from_uuid),
            category,
            query.key.as_str(),
        )
        .await;
    Ok(Json(PermissionCheckResponse { allowed }))
}

pub async fn list_projects_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> Json<Vec<ProjectResponse>> {
    let projects = state
        .permission_service
        .accessible_projects(identity.user_id())
        .await;
    Json(projects.into_iter().map(ProjectResponse::from).collect())
}

fn parse_category(value: &str) -> Result<PermissionCategory, AppError> {
    PermissionCategory::all()
        .iter()
        .copied()
        .find(|category| category.as_str() == value)
        .ok_or_else(|| AppError::Validation(format!("unknown permission category '{value}'")))
}
