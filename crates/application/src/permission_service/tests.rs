use std::sync::Arc;
use std::sync::atomic::Ordering;

use freightdesk_core::{ProjectId, UserId};
use freightdesk_domain::{
    PermissionCategory, PermissionSets, ProjectRef, Role, RoleTemplate, UserPermissionOverride,
    UserProfile,
};

use crate::permission_ports::{PermissionCache, PermissionCacheKey, PermissionCachePayload};
use crate::test_support::{FakeRepository, MapCache};

use super::PermissionService;

fn profile(user_id: UserId, role: Role) -> UserProfile {
    UserProfile {
        user_id,
        role,
        is_active: true,
        display_name: "Test User".to_owned(),
    }
}

fn viewer_template_with_extra_menu() -> RoleTemplate {
    let mut template = RoleTemplate::default_for(Role::Viewer);
    template.permissions.menu.insert("finance".to_owned());
    template
}

async fn service_with(
    repository: &Arc<FakeRepository>,
    cache: &Arc<MapCache>,
) -> PermissionService {
    PermissionService::from_ports(repository.clone(), cache.clone())
}

#[tokio::test]
async fn viewer_without_override_gets_stored_template() {
    let user_id = UserId::new();
    let repository = Arc::new(FakeRepository::default());
    repository
        .templates
        .lock()
        .await
        .push(viewer_template_with_extra_menu());
    repository.profiles.lock().await.push(profile(user_id, Role::Viewer));
    let cache = Arc::new(MapCache::default());

    let service = service_with(&repository, &cache).await;
    let context = service.context(user_id, None).await;

    assert!(context.has_menu_access("dashboard"));
    assert!(context.has_menu_access("finance"));
    assert!(!context.has_function_access("approve_payment"));
    assert!(!context.is_admin());
}

#[tokio::test]
async fn missing_template_row_falls_back_to_role_default() {
    let user_id = UserId::new();
    let repository = Arc::new(FakeRepository::default());
    repository.profiles.lock().await.push(profile(user_id, Role::Operator));
    let cache = Arc::new(MapCache::default());

    let service = service_with(&repository, &cache).await;
    let context = service.context(user_id, None).await;

    let default = RoleTemplate::default_for(Role::Operator);
    assert_eq!(context.permissions, default.permissions);
}

#[tokio::test]
async fn additive_override_unions_with_template() {
    let user_id = UserId::new();
    let repository = Arc::new(FakeRepository::default());
    repository.profiles.lock().await.push(profile(user_id, Role::Viewer));

    let mut additive = UserPermissionOverride::new(user_id, None);
    additive.permissions =
        PermissionSets::from_keys(vec!["finance"], vec!["view_finance_data"], vec![], vec![]);
    repository.overrides.lock().await.push(additive);
    let cache = Arc::new(MapCache::default());

    let service = service_with(&repository, &cache).await;
    let context = service.context(user_id, None).await;

    // Granted by the override on top of everything the viewer default has.
    assert!(context.has_menu_access("finance"));
    assert!(context.has_function_access("view_finance_data"));
    assert!(context.has_menu_access("dashboard"));
    assert!(context.has_function_access("view_project"));
}

#[tokio::test]
async fn exclusive_override_replaces_template() {
    let user_id = UserId::new();
    let repository = Arc::new(FakeRepository::default());
    repository.profiles.lock().await.push(profile(user_id, Role::Business));

    let mut exclusive = UserPermissionOverride::new(user_id, None);
    exclusive.inherit_role = false;
    exclusive.permissions =
        PermissionSets::from_keys(vec!["dashboard"], vec![], vec![], vec!["own"]);
    repository.overrides.lock().await.push(exclusive);
    let cache = Arc::new(MapCache::default());

    let service = service_with(&repository, &cache).await;
    let context = service.context(user_id, None).await;

    assert!(context.has_menu_access("dashboard"));
    assert!(context.has_data_access("own"));
    assert!(!context.has_menu_access("business"));
    assert!(!context.has_function_access("view_project"));
}

#[tokio::test]
async fn admin_passes_every_check_regardless_of_sets() {
    let user_id = UserId::new();
    let repository = Arc::new(FakeRepository::default());
    repository.profiles.lock().await.push(profile(user_id, Role::Admin));

    let mut exclusive = UserPermissionOverride::new(user_id, None);
    exclusive.inherit_role = false;
    repository.overrides.lock().await.push(exclusive);
    let cache = Arc::new(MapCache::default());

    let service = service_with(&repository, &cache).await;

    assert!(service.is_admin(user_id).await);
    assert!(
        service
            .check(user_id, None, PermissionCategory::Menu, "anything.at.all")
            .await
    );
    assert!(service.has_function_access(user_id, "delete_project").await);
    assert!(!service.has_menu_access(user_id, "").await);
}

#[tokio::test]
async fn unknown_or_inactive_user_gets_no_access() {
    let repository = Arc::new(FakeRepository::default());
    let inactive_id = UserId::new();
    repository.profiles.lock().await.push(UserProfile {
        is_active: false,
        ..profile(inactive_id, Role::Admin)
    });
    let cache = Arc::new(MapCache::default());

    let service = service_with(&repository, &cache).await;

    let unknown = service.context(UserId::new(), None).await;
    assert!(unknown.permissions.is_empty());
    assert!(!unknown.is_admin());

    let inactive = service.context(inactive_id, None).await;
    assert!(inactive.permissions.is_empty());
    assert!(!inactive.is_admin());
    assert!(!service.has_menu_access(inactive_id, "dashboard").await);
}

#[tokio::test]
async fn second_resolution_is_served_from_cache() {
    let user_id = UserId::new();
    let repository = Arc::new(FakeRepository::default());
    repository.profiles.lock().await.push(profile(user_id, Role::Viewer));
    let cache = Arc::new(MapCache::default());

    let service = service_with(&repository, &cache).await;
    service.context(user_id, None).await;
    assert_eq!(repository.template_fetches.load(Ordering::SeqCst), 1);

    service.context(user_id, None).await;
    assert_eq!(repository.template_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn warm_cache_survives_store_outage_until_invalidated() {
    let user_id = UserId::new();
    let repository = Arc::new(FakeRepository::default());
    repository.profiles.lock().await.push(profile(user_id, Role::Viewer));
    let cache = Arc::new(MapCache::default());

    let service = service_with(&repository, &cache).await;
    service.context(user_id, None).await;

    repository.fail_fetches(true);
    let warm = service.context(user_id, None).await;
    assert!(warm.has_menu_access("dashboard"));

    cache.invalidate_all().await;
    let cold = service.context(user_id, None).await;
    assert!(cold.permissions.is_empty());
    assert!(!cold.has_menu_access("dashboard"));
}

#[tokio::test]
async fn store_outage_with_known_role_denies_instead_of_defaulting() {
    let user_id = UserId::new();
    let repository = Arc::new(FakeRepository::default());
    repository.fail_fetches(true);
    let cache = Arc::new(MapCache::default());

    let service = service_with(&repository, &cache).await;
    let context = service.context_for_role(user_id, Role::Admin, None).await;

    // The role says admin but nothing backs it up, so the bypass applies
    // to nothing beyond the role flag and the sets stay empty.
    assert!(context.permissions.is_empty());
}

#[tokio::test]
async fn refresh_rewarms_shared_datasets() {
    let repository = Arc::new(FakeRepository::default());
    let admin_id = UserId::new();
    repository.profiles.lock().await.push(profile(admin_id, Role::Admin));
    repository.projects.lock().await.push(ProjectRef {
        id: ProjectId::new(),
        name: "North Corridor".to_owned(),
    });
    let cache = Arc::new(MapCache::default());

    let service = service_with(&repository, &cache).await;
    service.refresh().await;
    assert_eq!(repository.template_fetches.load(Ordering::SeqCst), 1);

    // Rewarmed entries serve without another fetch.
    assert_eq!(service.accessible_projects(admin_id).await.len(), 1);
    service.context_for_role(UserId::new(), Role::Viewer, None).await;
    assert_eq!(repository.template_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn project_list_is_filtered_by_project_permissions() {
    let repository = Arc::new(FakeRepository::default());
    let north = ProjectRef {
        id: ProjectId::new(),
        name: "North Corridor".to_owned(),
    };
    let south = ProjectRef {
        id: ProjectId::new(),
        name: "South Corridor".to_owned(),
    };
    repository
        .projects
        .lock()
        .await
        .extend([north.clone(), south.clone()]);

    // Finance holds project.view_all by default; the viewer only has an
    // override scoped to one project.
    let finance_id = UserId::new();
    let viewer_id = UserId::new();
    let outsider_id = UserId::new();
    repository.profiles.lock().await.extend([
        profile(finance_id, Role::Finance),
        profile(viewer_id, Role::Viewer),
        profile(outsider_id, Role::Viewer),
    ]);
    repository
        .overrides
        .lock()
        .await
        .push(UserPermissionOverride::new(viewer_id, Some(north.id)));
    let cache = Arc::new(MapCache::default());

    let service = service_with(&repository, &cache).await;

    assert_eq!(service.accessible_projects(finance_id).await.len(), 2);

    let assigned = service.accessible_projects(viewer_id).await;
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].id, north.id);

    assert!(service.accessible_projects(outsider_id).await.is_empty());
}

#[tokio::test]
async fn project_scope_selects_the_matching_override_only() {
    let user_id = UserId::new();
    let project_id = ProjectId::new();
    let repository = Arc::new(FakeRepository::default());
    repository.profiles.lock().await.push(profile(user_id, Role::Viewer));

    let mut global = UserPermissionOverride::new(user_id, None);
    global.permissions = PermissionSets::from_keys(vec!["contract"], vec![], vec![], vec![]);
    let mut scoped = UserPermissionOverride::new(user_id, Some(project_id));
    scoped.permissions = PermissionSets::from_keys(vec!["finance"], vec![], vec![], vec![]);
    repository.overrides.lock().await.extend([global, scoped]);
    let cache = Arc::new(MapCache::default());

    let service = service_with(&repository, &cache).await;

    let global_context = service.context(user_id, None).await;
    assert!(global_context.has_menu_access("contract"));
    assert!(!global_context.has_menu_access("finance"));

    let scoped_context = service.context(user_id, Some(project_id)).await;
    assert!(scoped_context.has_menu_access("finance"));
    assert!(!scoped_context.has_menu_access("contract"));
}

#[tokio::test]
async fn wrong_shaped_cache_entry_is_dropped_and_refetched() {
    let user_id = UserId::new();
    let repository = Arc::new(FakeRepository::default());
    repository.profiles.lock().await.push(profile(user_id, Role::Viewer));
    let cache = Arc::new(MapCache::default());
    cache
        .seed(
            PermissionCacheKey::RoleTemplates,
            PermissionCachePayload::Projects(vec![]),
        )
        .await;

    let service = service_with(&repository, &cache).await;
    let context = service.context(user_id, None).await;

    assert!(context.has_menu_access("dashboard"));
    assert_eq!(repository.template_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn composite_checks_span_all_categories() {
    let user_id = UserId::new();
    let repository = Arc::new(FakeRepository::default());
    repository.profiles.lock().await.push(profile(user_id, Role::Viewer));
    let cache = Arc::new(MapCache::default());

    let service = service_with(&repository, &cache).await;
    let context = service.context(user_id, None).await;

    assert!(context.has_any_permission(["no_such_key", "view_project"]));
    assert!(context.has_all_permissions(["dashboard", "view_project", "own"]));
    assert!(!context.has_all_permissions(["dashboard", "approve_payment"]));
    assert!(!context.has_any_permission(std::iter::empty()));
}
