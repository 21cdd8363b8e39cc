use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PermissionSets, Role};

/// Default permission sets associated with a role.
///
/// Templates are seeded at deployment and edited by administrators; every
/// user of a role inherits the template sets unless an override replaces
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTemplate {
    /// Role this template applies to (unique key).
    pub role: Role,
    /// Human-readable template name.
    pub display_name: String,
    /// Optional description shown in the admin UI.
    pub description: Option<String>,
    /// Cosmetic color tag for the admin UI.
    pub color: Option<String>,
    /// Default permission sets for the role.
    pub permissions: PermissionSets,
    /// Seeded templates are protected from deletion.
    pub is_system: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl RoleTemplate {
    /// Returns the hard-coded fallback template for a role.
    ///
    /// Used when the backing store holds no template row for the role. The
    /// viewer fallback is the minimal set and doubles as the cold-start
    /// default when nothing at all has been fetched yet.
    #[must_use]
    pub fn default_for(role: Role) -> Self {
        let now = Utc::now();
        Self {
            role,
            display_name: default_display_name(role).to_owned(),
            description: None,
            color: None,
            permissions: default_permission_sets(role),
            is_system: true,
            created_at: now,
            updated_at: now,
        }
    }
}

fn default_display_name(role: Role) -> &'static str {
    match role {
        Role::Admin => "Administrator",
        Role::Finance => "Finance",
        Role::Business => "Business",
        Role::Operator => "Operator",
        Role::Partner => "Partner",
        Role::Viewer => "Viewer",
    }
}

fn default_permission_sets(role: Role) -> PermissionSets {
    match role {
        Role::Admin => PermissionSets::from_keys(
            vec![
                "dashboard",
                "dashboard.transport",
                "dashboard.financial",
                "dashboard.project",
                "maintenance",
                "maintenance.projects",
                "maintenance.drivers",
                "maintenance.partners",
                "maintenance.locations",
                "business",
                "business.entry",
                "business.import",
                "business.maintenance",
                "business.scale",
                "finance",
                "finance.reconciliation",
                "finance.payment_request",
                "finance.payment_list",
                "finance.invoice",
                "finance.financial_overview",
                "finance.payment_approval",
                "contract",
                "contract.management",
                "system",
                "system.user_management",
                "system.permission_management",
                "audit",
                "audit.logs",
            ],
            vec![
                "create_project",
                "edit_project",
                "delete_project",
                "view_project",
                "create_driver",
                "edit_driver",
                "delete_driver",
                "view_driver",
                "create_partner",
                "edit_partner",
                "delete_partner",
                "view_partner",
                "create_logistics",
                "edit_logistics",
                "delete_logistics",
                "view_logistics",
                "import_logistics",
                "export_logistics",
                "approve_logistics",
                "view_finance_data",
                "create_payment_request",
                "approve_payment",
                "view_payment_request",
                "manage_invoice",
                "create_contract",
                "edit_contract",
                "delete_contract",
                "view_contract",
                "approve_contract",
                "manage_users",
                "manage_permissions",
                "view_audit_logs",
            ],
            vec![
                "project.view_all",
                "project.create",
                "project.edit",
                "project.delete",
                "project.assign",
            ],
            vec!["company", "department", "team", "own"],
        ),
        Role::Finance => PermissionSets::from_keys(
            vec![
                "dashboard",
                "dashboard.financial",
                "dashboard.project",
                "finance",
                "finance.reconciliation",
                "finance.payment_request",
                "finance.payment_list",
                "finance.invoice",
                "finance.financial_overview",
                "finance.payment_approval",
            ],
            vec![
                "view_project",
                "view_driver",
                "view_partner",
                "view_logistics",
                "view_finance_data",
                "create_payment_request",
                "approve_payment",
                "view_payment_request",
                "manage_invoice",
            ],
            vec!["project.view_all"],
            vec!["company"],
        ),
        Role::Business => PermissionSets::from_keys(
            vec![
                "dashboard",
                "dashboard.transport",
                "dashboard.project",
                "maintenance",
                "maintenance.projects",
                "maintenance.drivers",
                "maintenance.partners",
                "maintenance.locations",
                "business",
                "business.entry",
                "business.import",
                "business.maintenance",
                "business.scale",
            ],
            vec![
                "view_project",
                "create_driver",
                "edit_driver",
                "view_driver",
                "view_partner",
                "create_logistics",
                "edit_logistics",
                "view_logistics",
                "import_logistics",
                "export_logistics",
            ],
            vec!["project.access_assigned"],
            vec!["team"],
        ),
        Role::Operator => PermissionSets::from_keys(
            vec!["dashboard", "dashboard.transport", "business", "business.entry", "business.scale"],
            vec![
                "view_project",
                "view_driver",
                "create_logistics",
                "edit_logistics",
                "view_logistics",
            ],
            vec!["project.access_assigned"],
            vec!["own"],
        ),
        Role::Partner => PermissionSets::from_keys(
            vec!["dashboard", "dashboard.transport", "finance", "finance.payment_list"],
            vec!["view_project", "view_logistics", "view_payment_request"],
            vec!["project.access_assigned"],
            vec!["own"],
        ),
        Role::Viewer => PermissionSets::from_keys(
            vec![
                "dashboard",
                "dashboard.transport",
                "dashboard.financial",
                "dashboard.project",
            ],
            vec!["view_project", "view_driver", "view_partner", "view_logistics"],
            vec![],
            vec!["own"],
        ),
    }
}

#[cfg(test)]
mod tests {
    use crate::{PermissionCategory, Role};

    use super::RoleTemplate;

    #[test]
    fn every_role_has_a_fallback_template() {
        for role in Role::all() {
            let template = RoleTemplate::default_for(*role);
            assert_eq!(template.role, *role);
            assert!(template.is_system);
        }
    }

    #[test]
    fn viewer_fallback_is_minimal() {
        let viewer = RoleTemplate::default_for(Role::Viewer);
        let admin = RoleTemplate::default_for(Role::Admin);
        for category in PermissionCategory::all() {
            assert!(
                viewer.permissions.get(*category).len() <= admin.permissions.get(*category).len()
            );
        }
        assert!(viewer.permissions.project.is_empty());
    }
}
