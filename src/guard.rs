//! The single role dispatch point for per-record access decisions.

use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::{
    company::is_user_in_company,
    error::{AppError, AppResult},
    middleware::auth::Principal,
    permissions::Role,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotInCompany,
    NotOwner,
}

impl DenyReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::NotInCompany => "not in your company",
            DenyReason::NotOwner => "not your record",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> AppResult<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AppError::Forbidden(reason.message().into())),
        }
    }
}

/// Pure decision once company membership of the owner is known.
///
/// Ownerless records are shared with every tenant. `owner_in_company` is only
/// consulted for admins.
pub fn decide(
    principal_id: Uuid,
    role: Role,
    owner: Option<Uuid>,
    owner_in_company: bool,
) -> Decision {
    match (role, owner) {
        (Role::Superadmin, _) => Decision::Allow,
        (_, None) => Decision::Allow,
        (Role::Admin, Some(_)) if owner_in_company => Decision::Allow,
        (Role::Admin, Some(_)) => Decision::Deny(DenyReason::NotInCompany),
        (Role::Staff, Some(owner)) if owner == principal_id => Decision::Allow,
        (Role::Staff, Some(_)) => Decision::Deny(DenyReason::NotOwner),
    }
}

/// Resolve membership as needed and decide.
pub async fn check<C: ConnectionTrait>(
    conn: &C,
    principal: &Principal,
    op: Operation,
    owner: Option<Uuid>,
) -> AppResult<Decision> {
    let owner_in_company = match (principal.role, owner) {
        (Role::Admin, Some(owner)) => is_user_in_company(conn, principal.user_id, owner).await?,
        _ => false,
    };
    let decision = decide(principal.user_id, principal.role, owner, owner_in_company);
    if let Decision::Deny(reason) = decision {
        tracing::debug!(
            user_id = %principal.user_id,
            role = %principal.role,
            ?op,
            reason = reason.message(),
            "access denied"
        );
    }
    Ok(decision)
}

/// Like [`check`], but a denial becomes `AppError::Forbidden`.
pub async fn authorize<C: ConnectionTrait>(
    conn: &C,
    principal: &Principal,
    op: Operation,
    owner: Option<Uuid>,
) -> AppResult<()> {
    check(conn, principal, op, owner).await?.into_result()
}
