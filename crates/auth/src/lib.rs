//! `ledgerbank-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. Token issuance
//! lives upstream; this crate validates claims and answers policy questions.

pub mod authorize;
pub mod claims;
pub mod principal;
pub mod roles;

pub use authorize::{authorize, AuthzError, LedgerOperation};
pub use claims::{Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use principal::{Principal, PrincipalId};
pub use roles::Role;
