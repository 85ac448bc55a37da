//! Client-side filtering of already-fetched lists

use crate::resources::Resource;
use crate::session::Role;

/// Filter state of a list screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Free-text query, matched case-insensitively
    pub query: String,
    /// Only used by resources that carry a role
    pub role: Option<Role>,
}

impl ListFilter {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: Option<Role>) -> Self {
        self.role = role;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.role.is_none()
    }

    /// Cycle the role filter: all → admin → empleado → all
    pub fn cycle_role(&mut self) {
        self.role = match self.role {
            None => Some(Role::Admin),
            Some(Role::Admin) => Some(Role::Empleado),
            Some(Role::Empleado) => None,
        };
    }
}

/// Case-insensitive substring match; an empty needle matches everything
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Items matching `filter`, in their original order
pub fn apply<'a, R: Resource>(items: &'a [R], filter: &ListFilter) -> Vec<&'a R> {
    if filter.is_empty() {
        return items.iter().collect();
    }
    items.iter().filter(|item| item.matches(filter)).collect()
}
