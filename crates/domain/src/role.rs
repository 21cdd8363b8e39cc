use std::str::FromStr;

use freightdesk_core::AppError;
use serde::{Deserialize, Serialize};

/// Roles assignable to back-office users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative access; bypasses explicit permission sets.
    Admin,
    /// Finance staff: reconciliation, payment and invoice workflows.
    Finance,
    /// Business staff: waybill entry and master-data maintenance.
    Business,
    /// Operational staff: day-to-day waybill entry only.
    Operator,
    /// External partner with a read-mostly view of their own shipments.
    Partner,
    /// Default role with minimal read access; the ultimate fallback.
    Viewer,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Finance => "finance",
            Self::Business => "business",
            Self::Operator => "operator",
            Self::Partner => "partner",
            Self::Viewer => "viewer",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::Admin,
            Role::Finance,
            Role::Business,
            Role::Operator,
            Role::Partner,
            Role::Viewer,
        ];

        ALL
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "finance" => Ok(Self::Finance),
            "business" => Ok(Self::Business),
            "operator" => Ok(Self::Operator),
            "partner" => Ok(Self::Partner),
            "viewer" => Ok(Self::Viewer),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::Role;

    #[test]
    fn role_roundtrip_storage_value() {
        for role in Role::all() {
            let restored = Role::from_str(role.as_str());
            assert_eq!(restored.ok(), Some(*role));
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(Role::from_str("superuser").is_err());
    }
}
