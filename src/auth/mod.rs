//! Authorization gate: bearer-token authentication and role/permission
//! policies for protected operations.
//!
//! Both checks are terminal for a request. `Unauthenticated` answers
//! "who are you", `Forbidden` answers "you may not" — the HTTP layer maps
//! them to 401 and 403 respectively.

pub mod password;
pub mod token;

use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::repository::staff::get_staff;
use crate::db::DatabaseError;
use crate::models::{Principal, Role};
use token::TokenCodec;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("not authenticated: {0}")]
    Unauthenticated(&'static str),

    #[error("insufficient role or permission level")]
    Forbidden,

    #[error("authorization policy misconfigured: {0}")]
    PolicyMisconfigured(&'static str),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Role/permission requirement a protected operation is evaluated against.
///
/// Routes that need authentication only carry no policy at all, so the
/// "no policy" form never reaches [`authorize`].
#[derive(Debug, Clone)]
pub enum Policy {
    /// Exact role match.
    Role(Role),
    /// Any-of match against a role set.
    AnyOf(Vec<Role>),
    /// Minimum permission level (see [`Role::permission_level`]).
    MinLevel(u8),
}

/// Resolve an `Authorization` header value to the staff principal it names.
///
/// Every failure mode — missing header, bad scheme, bad signature, expiry,
/// unparseable subject, or a token outliving its staff row — collapses to
/// `Unauthenticated`. Only the non-secret principal projection is returned.
pub fn authenticate(
    conn: &Connection,
    codec: &TokenCodec,
    header: Option<&str>,
) -> Result<Principal, AuthError> {
    let token = header
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AuthError::Unauthenticated("missing bearer token"))?;

    let claims = codec
        .verify(token)
        .map_err(|_| AuthError::Unauthenticated("invalid or expired token"))?;

    let staff_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AuthError::Unauthenticated("invalid token subject"))?;

    // The token can outlive the staff row it refers to (e.g. deletion).
    let staff = get_staff(conn, &staff_id)?
        .ok_or(AuthError::Unauthenticated("invalid token user"))?;

    Ok(staff.principal())
}

/// Evaluate a principal against a policy. Fails closed: a degenerate
/// policy (empty role set) is a configuration error, never a grant.
pub fn authorize(principal: &Principal, policy: &Policy) -> Result<(), AuthError> {
    let allowed = match policy {
        Policy::Role(required) => principal.role == *required,
        Policy::AnyOf(roles) => {
            if roles.is_empty() {
                return Err(AuthError::PolicyMisconfigured("empty role set"));
            }
            roles.contains(&principal.role)
        }
        Policy::MinLevel(min) => principal.role.permission_level() >= *min,
    };

    if allowed {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}
