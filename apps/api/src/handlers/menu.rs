use axum::Json;
use axum::extract::{Extension, Query, State};
use freightdesk_core::{ProjectId, UserIdentity};
use serde::Deserialize;

use crate::dto::{MenuGroupResponse, UrlAccessResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    project_id: Option<uuid::Uuid>,
}

pub async fn menu_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Query(query): Query<MenuQuery>,
) -> Json<Vec<MenuGroupResponse>> {
    let context = state
        .permission_service
        .context(identity.user_id(), query.project_id.map(ProjectId::from_uuid))
        .await;
    let groups = state.menu_service.menu_for(&context).await;
    Json(groups.into_iter().map(MenuGroupResponse::from).collect())
}

#[derive(Debug, Deserialize)]
pub struct UrlAccessQuery {
    url: String,
}

pub async fn url_access_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Query(query): Query<UrlAccessQuery>,
) -> Json<UrlAccessResponse> {
    let context = state
        .permission_service
        .context(identity.user_id(), None)
        .await;
    let allowed = state
        .menu_service
        .check_url_access(&context, query.url.as_str())
        .await;
    Json(UrlAccessResponse { allowed })
}
