use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    entity::users::{Entity as Users, Model as UserModel},
    error::AppError,
    permissions::{MenuPermission, Permissions, Role, normalize_permissions},
    state::AppState,
};

/// The authenticated actor behind a request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
    pub permissions: Permissions,
    pub ip_address: Option<String>,
}

impl Principal {
    /// Build a principal from a stored user row. Fails on an unknown role.
    pub fn from_user(user: &UserModel) -> Result<Self, AppError> {
        let role = user
            .role
            .parse::<Role>()
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
        Ok(Self {
            user_id: user.id,
            name: user.name.clone(),
            role,
            permissions: normalize_permissions(user.permissions.as_ref()),
            ip_address: None,
        })
    }

    pub fn with_ip(mut self, ip: Option<String>) -> Self {
        self.ip_address = ip;
        self
    }

    pub fn is_superadmin(&self) -> bool {
        self.role == Role::Superadmin
    }

    /// Owner stamped on records this principal creates. Superadmin records are ownerless.
    pub fn owner_id(&self) -> Option<Uuid> {
        match self.role {
            Role::Superadmin => None,
            Role::Admin | Role::Staff => Some(self.user_id),
        }
    }

    /// Menu gate. Admins and the superadmin see every menu; staff need the flag.
    pub fn can_open(&self, menu: MenuPermission) -> bool {
        match self.role {
            Role::Superadmin | Role::Admin => true,
            Role::Staff => self.permissions.get(menu),
        }
    }
}

pub fn ensure_menu(principal: &Principal, menu: MenuPermission) -> Result<(), AppError> {
    if !principal.can_open(menu) {
        return Err(AppError::Forbidden(format!(
            "missing '{}' permission",
            menu.key()
        )));
    }
    Ok(())
}

pub fn ensure_superadmin(principal: &Principal) -> Result<(), AppError> {
    if principal.role != Role::Superadmin {
        return Err(AppError::Forbidden("superadmin only".into()));
    }
    Ok(())
}

/// Admin or superadmin.
pub fn ensure_manager(principal: &Principal) -> Result<(), AppError> {
    if principal.role == Role::Staff {
        return Err(AppError::Forbidden("staff accounts cannot manage users".into()));
    }
    Ok(())
}

pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    forwarded.or_else(|| {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
    })
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?
            .trim();

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.auth.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

        // Reload so role and permission changes apply without re-login.
        let user = Users::find_by_id(user_id)
            .one(&state.orm)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Account no longer exists".into()))?;

        Ok(Principal::from_user(&user)?.with_ip(client_ip(&parts.headers)))
    }
}
