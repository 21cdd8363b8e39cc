use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use freightdesk_core::{AppError, ProjectId, UserId, UserIdentity};
use freightdesk_domain::Role;

use crate::dto::{
    ApplyTemplateRequest, BulkRoleUpdateRequest, BulkStatusUpdateRequest, CopyPermissionsRequest,
    GenericMessageResponse, ResetOverridesRequest, RoleTemplateResponse, SaveRoleTemplateRequest,
    SaveUserOverridesRequest, UserOverrideResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_role_templates_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<RoleTemplateResponse>>> {
    let templates = state
        .admin_service
        .list_role_templates(identity.user_id())
        .await?;
    Ok(Json(
        templates.into_iter().map(RoleTemplateResponse::from).collect(),
    ))
}

pub async fn save_role_template_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(request): Json<SaveRoleTemplateRequest>,
) -> ApiResult<Json<GenericMessageResponse>> {
    let template = request.into_template()?;
    state
        .admin_service
        .save_role_template(identity.user_id(), template)
        .await?;
    Ok(acknowledged("role template saved"))
}

pub async fn delete_role_template_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(role): Path<String>,
) -> ApiResult<Json<GenericMessageResponse>> {
    let role = Role::from_str(role.as_str())?;
    state
        .admin_service
        .delete_role_template(identity.user_id(), role)
        .await?;
    Ok(acknowledged("role template deleted"))
}

pub async fn list_user_overrides_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(user_id): Path<uuid::Uuid>,
) -> ApiResult<Json<Vec<UserOverrideResponse>>> {
    let rows = state
        .admin_service
        .list_user_overrides(identity.user_id(), UserId::from_uuid(user_id))
        .await?;
    Ok(Json(rows.into_iter().map(UserOverrideResponse::from).collect()))
}

pub async fn save_user_overrides_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(request): Json<SaveUserOverridesRequest>,
) -> ApiResult<Json<GenericMessageResponse>> {
    let overrides = request
        .overrides
        .into_iter()
        .map(crate::dto::SaveUserOverrideRequest::into_override)
        .collect();
    state
        .admin_service
        .save_user_overrides(identity.user_id(), overrides)
        .await?;
    Ok(acknowledged("user overrides saved"))
}

pub async fn reset_overrides_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(request): Json<ResetOverridesRequest>,
) -> ApiResult<Json<GenericMessageResponse>> {
    let user_ids: Vec<UserId> = request.user_ids.into_iter().map(UserId::from_uuid).collect();
    state
        .admin_service
        .reset_to_role_default(
            identity.user_id(),
            &user_ids,
            request.project_id.map(ProjectId::from_uuid),
        )
        .await?;
    Ok(acknowledged("user overrides reset"))
}

pub async fn apply_template_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(request): Json<ApplyTemplateRequest>,
) -> ApiResult<Json<GenericMessageResponse>> {
    let role = Role::from_str(request.role.as_str())?;
    let user_ids: Vec<UserId> = request.user_ids.into_iter().map(UserId::from_uuid).collect();
    state
        .admin_service
        .apply_template_to_users(identity.user_id(), role, &user_ids)
        .await?;
    Ok(acknowledged("template applied"))
}

pub async fn copy_permissions_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(request): Json<CopyPermissionsRequest>,
) -> ApiResult<Json<GenericMessageResponse>> {
    let targets: Vec<UserId> = request
        .target_user_ids
        .into_iter()
        .map(UserId::from_uuid)
        .collect();
    state
        .admin_service
        .copy_user_permissions(
            identity.user_id(),
            UserId::from_uuid(request.source_user_id),
            &targets,
        )
        .await?;
    Ok(acknowledged("permissions copied"))
}

pub async fn bulk_update_roles_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(request): Json<BulkRoleUpdateRequest>,
) -> ApiResult<Json<GenericMessageResponse>> {
    let role = Role::from_str(request.role.as_str())?;
    let user_ids: Vec<UserId> = request.user_ids.into_iter().map(UserId::from_uuid).collect();
    state
        .admin_service
        .bulk_update_user_roles(identity.user_id(), &user_ids, role)
        .await?;
    Ok(acknowledged("user roles updated"))
}

pub async fn bulk_update_status_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(request): Json<BulkStatusUpdateRequest>,
) -> ApiResult<Json<GenericMessageResponse>> {
    let user_ids: Vec<UserId> = request.user_ids.into_iter().map(UserId::from_uuid).collect();
    state
        .admin_service
        .bulk_update_user_status(identity.user_id(), &user_ids, request.is_active)
        .await?;
    Ok(acknowledged("user status updated"))
}

pub async fn refresh_cache_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<GenericMessageResponse>> {
    if !state.permission_service.is_admin(identity.user_id()).await
        && !state
            .permission_service
            .has_function_access(identity.user_id(), "manage_permissions")
            .await
    {
        return Err(AppError::Forbidden(
            "permission management requires an administrator".to_owned(),
        )
        .into());
    }

    state.permission_service.refresh().await;
    state.menu_service.refresh().await;
    Ok(acknowledged("caches refreshed"))
}

fn acknowledged(message: &str) -> Json<GenericMessageResponse> {
    Json(GenericMessageResponse {
        message: message.to_owned(),
    })
}
