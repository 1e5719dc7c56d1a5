//! Closed-set enums for domain entities.
//!
//! Every enum here is a closed set: parsing an unrecognized value is an
//! error, never a silent coercion. `FromStr` is the single parse boundary
//! used by forms, repositories, and the CLI.

use serde::{Deserialize, Serialize};

/// Kind of restaurant a store operates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    /// Conveyor-belt sushi.
    Kaiten,
    /// Counter service, a la carte menu.
    CounterAlacarte,
    /// Counter service, omakase course.
    CounterOmakase,
    Other,
}

impl std::fmt::Display for BusinessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kaiten => write!(f, "kaiten"),
            Self::CounterAlacarte => write!(f, "counter_alacarte"),
            Self::CounterOmakase => write!(f, "counter_omakase"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for BusinessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kaiten" => Ok(Self::Kaiten),
            "counter_alacarte" => Ok(Self::CounterAlacarte),
            "counter_omakase" => Ok(Self::CounterOmakase),
            "other" => Ok(Self::Other),
            _ => Err(format!("invalid business type: {s}")),
        }
    }
}

/// Whether a store is operating.
///
/// Stores are never hard-deleted; closing a store transitions it here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    #[default]
    Open,
    Closed,
}

impl std::fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for StoreStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("invalid store status: {s}")),
        }
    }
}

/// Staff role, for display and defaults.
///
/// The role is advisory: authorization always derives from a user's
/// [`PermissionSet`](crate::PermissionSet), never from the role alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Recruiter,
    Manager,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Recruiter => write!(f, "recruiter"),
            Self::Manager => write!(f, "manager"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "recruiter" => Ok(Self::Recruiter),
            "manager" => Ok(Self::Manager),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Whether a user may sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("invalid user status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_business_type_roundtrip() {
        for value in [
            BusinessType::Kaiten,
            BusinessType::CounterAlacarte,
            BusinessType::CounterOmakase,
            BusinessType::Other,
        ] {
            let parsed: BusinessType = value.to_string().parse().unwrap();
            assert_eq!(parsed, value);
        }
    }

    #[test]
    fn test_business_type_rejects_unknown() {
        assert!("izakaya".parse::<BusinessType>().is_err());
        assert!("KAITEN".parse::<BusinessType>().is_err());
        assert!("".parse::<BusinessType>().is_err());
    }

    #[test]
    fn test_store_status_parse() {
        assert_eq!("open".parse::<StoreStatus>().unwrap(), StoreStatus::Open);
        assert_eq!(
            "closed".parse::<StoreStatus>().unwrap(),
            StoreStatus::Closed
        );
        assert!("deleted".parse::<StoreStatus>().is_err());
    }

    #[test]
    fn test_user_role_parse() {
        assert_eq!("recruiter".parse::<UserRole>().unwrap(), UserRole::Recruiter);
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_user_status_serde_names() {
        let json = serde_json::to_string(&UserStatus::Inactive).unwrap();
        assert_eq!(json, "\"inactive\"");
    }
}
