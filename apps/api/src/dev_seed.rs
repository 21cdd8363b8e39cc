use std::env;

use freightdesk_application::PermissionSourceRepository;
use freightdesk_core::{AppResult, ProjectId, UserId};
use freightdesk_domain::{ProjectRef, Role, RoleTemplate, UserProfile, default_menu_config};
use freightdesk_infrastructure::InMemoryPermissionRepository;
use tracing::info;

/// Seeds the in-memory store used when no database is configured.
///
/// Creates the system role templates, the built-in menu, one project and
/// two users; the admin user id is taken from `DEV_ADMIN_USER_ID` when set
/// so a frontend can send a stable identity header.
pub async fn seed(store: &InMemoryPermissionRepository) -> AppResult<()> {
    for role in Role::all() {
        store.upsert_role_template(RoleTemplate::default_for(*role)).await?;
    }
    store.set_menu_config(default_menu_config()).await;

    store
        .insert_project(ProjectRef {
            id: ProjectId::new(),
            name: "North Corridor".to_owned(),
        })
        .await;

    let admin_id = env::var("DEV_ADMIN_USER_ID")
        .ok()
        .and_then(|value| uuid::Uuid::parse_str(value.as_str()).ok())
        .map_or_else(UserId::new, UserId::from_uuid);
    store
        .insert_profile(UserProfile {
            user_id: admin_id,
            role: Role::Admin,
            is_active: true,
            display_name: "Dev Admin".to_owned(),
        })
        .await;

    let viewer_id = UserId::new();
    store
        .insert_profile(UserProfile {
            user_id: viewer_id,
            role: Role::Viewer,
            is_active: true,
            display_name: "Dev Viewer".to_owned(),
        })
        .await;

    info!(%admin_id, %viewer_id, "seeded in-memory permission store");
    Ok(())
}
