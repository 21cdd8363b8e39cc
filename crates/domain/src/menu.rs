use serde::{Deserialize, Serialize};

use crate::EffectivePermissionContext;

/// One flat menu configuration row, as persisted in the menu table.
///
/// Groups and items share one table; `parent_key` links an item to its
/// group and `is_group` marks group rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuConfigEntry {
    /// Stable menu key, also used as the permission key for plain items.
    pub key: String,
    /// Group key this item belongs to; `None` for group rows.
    pub parent_key: Option<String>,
    /// Display title.
    pub title: String,
    /// Route the item navigates to; `None` for group rows.
    pub url: Option<String>,
    /// Icon name rendered by the client.
    pub icon: Option<String>,
    /// Ordering inside the group (or among groups).
    pub order_index: i32,
    /// Inactive rows are dropped before projection.
    pub is_active: bool,
    /// Marks group rows.
    pub is_group: bool,
    /// Menu permission keys; any single match makes the item visible.
    pub required_permissions: Vec<String>,
}

/// A navigable menu item after projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Stable menu key.
    pub key: String,
    /// Display title.
    pub title: String,
    /// Route the item navigates to.
    pub url: Option<String>,
    /// Icon name rendered by the client.
    pub icon: Option<String>,
    /// Ordering inside the group.
    pub order_index: i32,
    /// Menu permission keys required for visibility.
    pub required_permissions: Vec<String>,
}

/// A menu group holding ordered items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuGroup {
    /// Stable group key.
    pub key: String,
    /// Display title.
    pub title: String,
    /// Icon name rendered by the client.
    pub icon: Option<String>,
    /// Ordering among groups.
    pub order_index: i32,
    /// Items in display order.
    pub items: Vec<MenuItem>,
}

impl MenuGroup {
    /// Assembles flat configuration rows into an ordered group tree.
    ///
    /// Inactive rows are dropped; items referencing an unknown group are
    /// ignored.
    #[must_use]
    pub fn assemble(entries: &[MenuConfigEntry]) -> Vec<Self> {
        let mut groups: Vec<Self> = entries
            .iter()
            .filter(|entry| entry.is_group && entry.is_active)
            .map(|entry| Self {
                key: entry.key.clone(),
                title: entry.title.clone(),
                icon: entry.icon.clone(),
                order_index: entry.order_index,
                items: Vec::new(),
            })
            .collect();
        groups.sort_by_key(|group| group.order_index);

        for group in &mut groups {
            let mut items: Vec<MenuItem> = entries
                .iter()
                .filter(|entry| {
                    !entry.is_group
                        && entry.is_active
                        && entry.parent_key.as_deref() == Some(group.key.as_str())
                })
                .map(|entry| MenuItem {
                    key: entry.key.clone(),
                    title: entry.title.clone(),
                    url: entry.url.clone(),
                    icon: entry.icon.clone(),
                    order_index: entry.order_index,
                    required_permissions: entry.required_permissions.clone(),
                })
                .collect();
            items.sort_by_key(|item| item.order_index);
            group.items = items;
        }

        groups
    }

    /// Filters groups down to what a context may see.
    ///
    /// Admins see everything; items without required permissions are always
    /// visible; otherwise any matching menu key suffices. Groups left with
    /// no visible item are hidden entirely.
    #[must_use]
    pub fn visible_for(groups: &[Self], context: &EffectivePermissionContext) -> Vec<Self> {
        groups
            .iter()
            .map(|group| Self {
                key: group.key.clone(),
                title: group.title.clone(),
                icon: group.icon.clone(),
                order_index: group.order_index,
                items: group
                    .items
                    .iter()
                    .filter(|item| {
                        context.is_admin()
                            || item.required_permissions.is_empty()
                            || item
                                .required_permissions
                                .iter()
                                .any(|key| context.has_menu_access(key))
                    })
                    .cloned()
                    .collect(),
            })
            .filter(|group| !group.items.is_empty())
            .collect()
    }
}

/// Returns the built-in menu table used when the store has no menu rows.
#[must_use]
pub fn default_menu_config() -> Vec<MenuConfigEntry> {
    let mut entries = Vec::new();
    let mut group_order = 0;

    let mut push_group = |entries: &mut Vec<MenuConfigEntry>, key: &str, title: &str, icon: &str| {
        group_order += 10;
        entries.push(MenuConfigEntry {
            key: key.to_owned(),
            parent_key: None,
            title: title.to_owned(),
            url: None,
            icon: Some(icon.to_owned()),
            order_index: group_order,
            is_active: true,
            is_group: true,
            required_permissions: Vec::new(),
        });
    };

    fn item(
        group: &str,
        key: &str,
        title: &str,
        url: &str,
        icon: &str,
        order_index: i32,
    ) -> MenuConfigEntry {
        MenuConfigEntry {
            key: key.to_owned(),
            parent_key: Some(group.to_owned()),
            title: title.to_owned(),
            url: Some(url.to_owned()),
            icon: Some(icon.to_owned()),
            order_index,
            is_active: true,
            is_group: false,
            required_permissions: vec![key.to_owned()],
        }
    }

    push_group(&mut entries, "dashboard", "Dashboards", "BarChart3");
    entries.push(item("dashboard", "dashboard.transport", "Transport dashboard", "/dashboard/transport", "Truck", 10));
    entries.push(item("dashboard", "dashboard.financial", "Financial dashboard", "/dashboard/financial", "DollarSign", 20));
    entries.push(item("dashboard", "dashboard.project", "Project dashboard", "/dashboard/project", "PieChart", 30));

    push_group(&mut entries, "maintenance", "Master data", "Database");
    entries.push(item("maintenance", "maintenance.projects", "Projects", "/projects", "Package", 10));
    entries.push(item("maintenance", "maintenance.drivers", "Drivers", "/drivers", "Truck", 20));
    entries.push(item("maintenance", "maintenance.partners", "Partners", "/partners", "Users", 30));
    entries.push(item("maintenance", "maintenance.locations", "Locations", "/locations", "MapPin", 40));

    push_group(&mut entries, "business", "Waybills", "FileText");
    entries.push(item("business", "business.entry", "Waybill entry", "/business-entry", "Plus", 10));
    entries.push(item("business", "business.import", "Data import", "/data-import", "Upload", 20));
    entries.push(item("business", "business.maintenance", "Waybill maintenance", "/waybill-maintenance", "Edit", 30));
    entries.push(item("business", "business.scale", "Scale records", "/scale-records", "Scale", 40));

    push_group(&mut entries, "finance", "Finance", "DollarSign");
    entries.push(item("finance", "finance.reconciliation", "Reconciliation", "/finance-reconciliation", "Calculator", 10));
    entries.push(item("finance", "finance.payment_request", "Payment requests", "/payment-request", "CreditCard", 20));
    entries.push(item("finance", "finance.payment_list", "Payment request list", "/payment-requests-list", "List", 30));
    entries.push(item("finance", "finance.invoice", "Invoices", "/payment-invoice", "Receipt", 40));
    entries.push(item("finance", "finance.financial_overview", "Financial overview", "/financial-overview", "TrendingUp", 50));
    entries.push(item("finance", "finance.payment_approval", "Payment approval", "/payment-approval", "CheckSquare", 60));

    push_group(&mut entries, "contract", "Contracts", "FileSignature");
    entries.push(item("contract", "contract.management", "Contract management", "/contract-management", "FileText", 10));

    push_group(&mut entries, "system", "Administration", "Settings");
    entries.push(item("system", "system.user_management", "User management", "/user-management", "Users", 10));
    entries.push(item("system", "system.permission_management", "Permission management", "/permission-management", "Shield", 20));

    push_group(&mut entries, "audit", "Audit", "History");
    entries.push(item("audit", "audit.logs", "Audit logs", "/audit-logs", "FileSearch", 10));

    entries
}
