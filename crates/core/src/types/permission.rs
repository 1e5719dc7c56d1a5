//! Resource/action permissions.
//!
//! Authorization is permission-driven: a user's role is display-only, and
//! every allowed action must be backed by a [`Permission`] entry. A
//! [`PermissionSet`] holds at most one entry per resource; granting a
//! resource again replaces the previous entry, and a resource with no entry
//! denies every action on it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A protected resource category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Candidates,
    Companies,
    Jobs,
    Matches,
    Analytics,
    Settings,
}

impl Resource {
    /// All resources, in a stable order.
    pub const ALL: [Self; 6] = [
        Self::Candidates,
        Self::Companies,
        Self::Jobs,
        Self::Matches,
        Self::Analytics,
        Self::Settings,
    ];
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Candidates => write!(f, "candidates"),
            Self::Companies => write!(f, "companies"),
            Self::Jobs => write!(f, "jobs"),
            Self::Matches => write!(f, "matches"),
            Self::Analytics => write!(f, "analytics"),
            Self::Settings => write!(f, "settings"),
        }
    }
}

impl std::str::FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candidates" => Ok(Self::Candidates),
            "companies" => Ok(Self::Companies),
            "jobs" => Ok(Self::Jobs),
            "matches" => Ok(Self::Matches),
            "analytics" => Ok(Self::Analytics),
            "settings" => Ok(Self::Settings),
            _ => Err(format!("invalid resource: {s}")),
        }
    }
}

/// An action on a resource.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Read => write!(f, "read"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

impl std::str::FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(format!("invalid action: {s}")),
        }
    }
}

/// The allowed actions on one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub resource: Resource,
    pub actions: BTreeSet<Action>,
}

impl Permission {
    /// A permission granting the given actions on a resource.
    #[must_use]
    pub fn new(resource: Resource, actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            resource,
            actions: actions.into_iter().collect(),
        }
    }
}

/// A user's full set of permissions, at most one entry per resource.
///
/// The persisted representation is a list of [`Permission`] entries; on
/// deserialization, a later entry for a resource replaces an earlier one,
/// so the one-entry-per-resource invariant holds for any input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    by_resource: BTreeMap<Resource, BTreeSet<Action>>,
}

impl PermissionSet {
    /// An empty set: every action on every resource is denied.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            by_resource: BTreeMap::new(),
        }
    }

    /// Grant a permission, replacing any existing entry for its resource.
    pub fn grant(&mut self, permission: Permission) {
        self.by_resource
            .insert(permission.resource, permission.actions);
    }

    /// Remove the entry for a resource, denying all actions on it.
    pub fn revoke(&mut self, resource: Resource) {
        self.by_resource.remove(&resource);
    }

    /// Whether `action` is allowed on `resource`. No entry means denied.
    #[must_use]
    pub fn allows(&self, resource: Resource, action: Action) -> bool {
        self.by_resource
            .get(&resource)
            .is_some_and(|actions| actions.contains(&action))
    }

    /// The entry for a resource, if any.
    #[must_use]
    pub fn get(&self, resource: Resource) -> Option<&BTreeSet<Action>> {
        self.by_resource.get(&resource)
    }

    /// Iterate entries as [`Permission`] values in resource order.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.by_resource.iter().map(|(resource, actions)| Permission {
            resource: *resource,
            actions: actions.clone(),
        })
    }

    /// Number of resources with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_resource.len()
    }

    /// Whether no resource has an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_resource.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut set = Self::new();
        for permission in iter {
            set.grant(permission);
        }
        set
    }
}

impl Serialize for PermissionSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for PermissionSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<Permission>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_denies_everything() {
        let set = PermissionSet::new();
        for resource in Resource::ALL {
            assert!(!set.allows(resource, Action::Read));
            assert!(!set.allows(resource, Action::Delete));
        }
    }

    #[test]
    fn test_read_only_jobs_denies_update() {
        let mut set = PermissionSet::new();
        set.grant(Permission::new(Resource::Jobs, [Action::Read]));

        assert!(set.allows(Resource::Jobs, Action::Read));
        assert!(!set.allows(Resource::Jobs, Action::Update));
        assert!(!set.allows(Resource::Jobs, Action::Create));
        // No entry for other resources at all
        assert!(!set.allows(Resource::Candidates, Action::Read));
    }

    #[test]
    fn test_grant_replaces_existing_entry() {
        let mut set = PermissionSet::new();
        set.grant(Permission::new(
            Resource::Companies,
            [Action::Create, Action::Read, Action::Update],
        ));
        set.grant(Permission::new(Resource::Companies, [Action::Read]));

        assert_eq!(set.len(), 1);
        assert!(set.allows(Resource::Companies, Action::Read));
        // The earlier, wider grant was replaced, not merged
        assert!(!set.allows(Resource::Companies, Action::Update));
        assert!(!set.allows(Resource::Companies, Action::Create));
    }

    #[test]
    fn test_revoke_denies_resource() {
        let mut set = PermissionSet::new();
        set.grant(Permission::new(Resource::Analytics, [Action::Read]));
        set.revoke(Resource::Analytics);
        assert!(!set.allows(Resource::Analytics, Action::Read));
        assert!(set.is_empty());
    }

    #[test]
    fn test_deserialize_deduplicates_per_resource() {
        let json = r#"[
            {"resource": "jobs", "actions": ["create", "read"]},
            {"resource": "jobs", "actions": ["read"]}
        ]"#;
        let set: PermissionSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.len(), 1);
        assert!(!set.allows(Resource::Jobs, Action::Create));
        assert!(set.allows(Resource::Jobs, Action::Read));
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut set = PermissionSet::new();
        set.grant(Permission::new(Resource::Jobs, [Action::Read, Action::Update]));
        set.grant(Permission::new(Resource::Settings, [Action::Read]));

        let json = serde_json::to_string(&set).unwrap();
        let back: PermissionSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_unknown_resource_fails_deserialization() {
        let json = r#"[{"resource": "payroll", "actions": ["read"]}]"#;
        assert!(serde_json::from_str::<PermissionSet>(json).is_err());
    }
}
