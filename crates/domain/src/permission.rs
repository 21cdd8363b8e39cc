use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The four permission groupings resolved per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    /// Visibility of navigation entries and routes.
    Menu,
    /// Access to concrete operations (create, approve, export, ...).
    Function,
    /// Project-scoped capabilities.
    Project,
    /// Data-visibility scopes (own, team, department, company).
    Data,
}

impl PermissionCategory {
    /// Returns a stable storage value for this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Function => "function",
            Self::Project => "project",
            Self::Data => "data",
        }
    }

    /// Returns all categories in resolution order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[PermissionCategory] = &[
            PermissionCategory::Menu,
            PermissionCategory::Function,
            PermissionCategory::Project,
            PermissionCategory::Data,
        ];

        ALL
    }
}

/// One deduplicated set of opaque permission keys per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSets {
    /// Menu permission keys.
    pub menu: BTreeSet<String>,
    /// Function permission keys.
    pub function: BTreeSet<String>,
    /// Project permission keys.
    pub project: BTreeSet<String>,
    /// Data permission keys.
    pub data: BTreeSet<String>,
}

impl PermissionSets {
    /// Creates empty permission sets.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates permission sets from per-category key lists.
    #[must_use]
    pub fn from_keys<I, K>(menu: I, function: I, project: I, data: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        fn collect<I, K>(keys: I) -> BTreeSet<String>
        where
            I: IntoIterator<Item = K>,
            K: Into<String>,
        {
            keys.into_iter().map(Into::into).collect()
        }

        Self {
            menu: collect(menu),
            function: collect(function),
            project: collect(project),
            data: collect(data),
        }
    }

    /// Returns the key set for one category.
    #[must_use]
    pub fn get(&self, category: PermissionCategory) -> &BTreeSet<String> {
        match category {
            PermissionCategory::Menu => &self.menu,
            PermissionCategory::Function => &self.function,
            PermissionCategory::Project => &self.project,
            PermissionCategory::Data => &self.data,
        }
    }

    /// Returns whether a key is a member of one category set.
    #[must_use]
    pub fn contains(&self, category: PermissionCategory, key: &str) -> bool {
        self.get(category).contains(key)
    }

    /// Returns the per-category union of two permission sets.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            menu: self.menu.union(&other.menu).cloned().collect(),
            function: self.function.union(&other.function).cloned().collect(),
            project: self.project.union(&other.project).cloned().collect(),
            data: self.data.union(&other.data).cloned().collect(),
        }
    }

    /// Returns whether every category set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.menu.is_empty() && self.function.is_empty() && self.project.is_empty() && self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{PermissionCategory, PermissionSets};

    #[test]
    fn union_covers_both_operands_per_category() {
        let left = PermissionSets::from_keys(
            vec!["dashboard"],
            vec!["data.create"],
            vec![],
            vec!["own"],
        );
        let right = PermissionSets::from_keys(
            vec!["dashboard", "finance"],
            vec!["data.export"],
            vec!["project.view_all"],
            vec![],
        );

        let merged = left.union(&right);
        for category in PermissionCategory::all() {
            assert!(merged.get(*category).len() >= left.get(*category).len());
            assert!(merged.get(*category).len() >= right.get(*category).len());
        }
        assert!(merged.contains(PermissionCategory::Menu, "finance"));
        assert!(merged.contains(PermissionCategory::Function, "data.create"));
        assert!(merged.contains(PermissionCategory::Function, "data.export"));
        assert_eq!(merged.menu.len(), 2);
    }

    #[test]
    fn from_keys_deduplicates() {
        let sets = PermissionSets::from_keys(
            vec!["dashboard", "dashboard"],
            vec![],
            vec![],
            vec![],
        );
        assert_eq!(sets.menu.len(), 1);
    }
}
