use ledgerbank_auth::{Principal, PrincipalId, Role};
use ledgerbank_core::AccountNumber;

/// Principal context for a request (authenticated identity + role + owned
/// account), derived from verified token claims by the auth middleware.
///
/// This is immutable and must be present for all ledger routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal.id
    }

    pub fn account_number(&self) -> &AccountNumber {
        &self.principal.account_number
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }
}
