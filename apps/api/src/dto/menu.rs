use freightdesk_domain::{MenuGroup, MenuItem};
use serde::Serialize;
use ts_rs::TS;

/// One visible menu item.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/menu-item-response.ts"
)]
pub struct MenuItemResponse {
    pub key: String,
    pub title: String,
    pub url: Option<String>,
    pub icon: Option<String>,
}

/// One visible menu group with its items.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/menu-group-response.ts"
)]
pub struct MenuGroupResponse {
    pub key: String,
    pub title: String,
    pub icon: Option<String>,
    pub items: Vec<MenuItemResponse>,
}

impl From<MenuGroup> for MenuGroupResponse {
    fn from(group: MenuGroup) -> Self {
        Self {
            key: group.key,
            title: group.title,
            icon: group.icon,
            items: group.items.into_iter().map(MenuItemResponse::from).collect(),
        }
    }
}

impl From<MenuItem> for MenuItemResponse {
    fn from(item: MenuItem) -> Self {
        Self {
            key: item.key,
            title: item.title,
            url: item.url,
            icon: item.icon,
        }
    }
}

/// Outcome of a route access check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/url-access-response.ts"
)]
pub struct UrlAccessResponse {
    pub allowed: bool,
}
