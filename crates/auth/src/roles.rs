use serde::{Deserialize, Serialize};

/// Role granted to an authenticated principal.
///
/// Modeled as a closed enum so the authorization gate can match exhaustively;
/// an unknown role string fails at deserialization, not deep inside policy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Employee,
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Employee => "employee",
            Role::Manager => "manager",
        }
    }

    /// Staff roles may act on any account; customers only on their own.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Employee | Role::Manager)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
