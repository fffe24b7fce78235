//! Tenant boundary: a company is an admin plus the staff accounts they created.
//!
//! Membership is read from the users table on every call. Nothing here caches,
//! so staff added or removed mid-session take effect on the next request.

use std::collections::BTreeSet;

use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
    sea_query::IntoCondition,
};
use uuid::Uuid;

use crate::{
    entity::users::{Column as UserCol, Entity as Users},
    error::AppResult,
    middleware::auth::Principal,
    permissions::Role,
};

/// `{admin_id} ∪ {staff created by admin_id}`.
pub async fn company_user_ids<C: ConnectionTrait>(
    conn: &C,
    admin_id: Uuid,
) -> AppResult<BTreeSet<Uuid>> {
    let staff: Vec<Uuid> = Users::find()
        .select_only()
        .column(UserCol::Id)
        .filter(UserCol::CreatedBy.eq(admin_id))
        .filter(UserCol::Role.eq(Role::Staff.as_str()))
        .into_tuple()
        .all(conn)
        .await?;

    let mut ids: BTreeSet<Uuid> = staff.into_iter().collect();
    ids.insert(admin_id);
    Ok(ids)
}

pub async fn is_user_in_company<C: ConnectionTrait>(
    conn: &C,
    admin_id: Uuid,
    target_user_id: Uuid,
) -> AppResult<bool> {
    if target_user_id == admin_id {
        return Ok(true);
    }
    let hits = Users::find()
        .filter(UserCol::Id.eq(target_user_id))
        .filter(UserCol::CreatedBy.eq(admin_id))
        .filter(UserCol::Role.eq(Role::Staff.as_str()))
        .count(conn)
        .await?;
    Ok(hits > 0)
}

/// Which owners a principal may see in list and aggregate queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    Owners(BTreeSet<Uuid>),
}

impl Scope {
    pub async fn for_principal<C: ConnectionTrait>(
        conn: &C,
        principal: &Principal,
    ) -> AppResult<Self> {
        Ok(match principal.role {
            Role::Superadmin => Scope::All,
            Role::Admin => Scope::Owners(company_user_ids(conn, principal.user_id).await?),
            Role::Staff => Scope::Owners(BTreeSet::from([principal.user_id])),
        })
    }

    pub fn includes(&self, owner: Option<Uuid>) -> bool {
        match (self, owner) {
            (Scope::All, _) => true,
            (Scope::Owners(ids), Some(id)) => ids.contains(&id),
            (Scope::Owners(_), None) => false,
        }
    }

    /// Owner filter for tenant-owned rows.
    pub fn condition<Col>(&self, owner_col: Col) -> Condition
    where
        Col: ColumnTrait,
    {
        match self {
            Scope::All => Condition::all(),
            Scope::Owners(ids) => owner_col
                .is_in(ids.iter().copied().collect::<Vec<_>>())
                .into_condition(),
        }
    }

    /// Owner filter that also lets ownerless (shared) rows through.
    pub fn condition_with_shared<Col>(&self, owner_col: Col) -> Condition
    where
        Col: ColumnTrait,
    {
        match self {
            Scope::All => Condition::all(),
            Scope::Owners(_) => Condition::any()
                .add(owner_col.is_null())
                .add(self.condition(owner_col)),
        }
    }
}
