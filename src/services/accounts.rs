//! Account plumbing shared by the admin, staff and profile services.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use uuid::Uuid;

use crate::{
    dto::users::UpdateUserRequest,
    entity::users::{ActiveModel, Model as UserModel},
    error::{AppError, AppResult, is_unique_violation},
    permissions::{Permissions, Role},
};

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim().to_ascii_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("a valid email is required".into()));
    }
    Ok(email)
}

pub fn validate_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    Ok(name.to_string())
}

pub fn validate_password(raw: &str) -> AppResult<()> {
    if raw.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn email_taken() -> AppError {
    AppError::conflict("Email is already taken")
}

pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub permissions: Permissions,
    pub created_by: Option<Uuid>,
}

pub async fn insert_account<C: ConnectionTrait>(
    conn: &C,
    account: NewAccount,
) -> AppResult<UserModel> {
    let name = validate_name(&account.name)?;
    let email = normalize_email(&account.email)?;
    validate_password(&account.password)?;
    let password_hash = hash_password(&account.password)?;

    let now = Utc::now();
    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        password_hash: Set(password_hash),
        role: Set(account.role.as_str().to_string()),
        permissions: Set(Some(account.permissions.to_value())),
        created_by: Set(account.created_by),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    match active.insert(conn).await {
        Ok(user) => Ok(user),
        Err(err) if is_unique_violation(&err) => Err(email_taken()),
        Err(err) => Err(err.into()),
    }
}

/// Apply a partial account update. Returns the saved row and the names of the
/// fields that were touched (password included by name only).
pub async fn update_account<C: ConnectionTrait>(
    conn: &C,
    existing: UserModel,
    payload: UpdateUserRequest,
) -> AppResult<(UserModel, Vec<&'static str>)> {
    let role: Role = existing.role.parse().unwrap_or(Role::Staff);
    let mut changed = Vec::new();
    let mut active: ActiveModel = existing.into();

    if let Some(name) = payload.name.as_deref() {
        active.name = Set(validate_name(name)?);
        changed.push("name");
    }
    if let Some(email) = payload.email.as_deref() {
        active.email = Set(normalize_email(email)?);
        changed.push("email");
    }
    if let Some(password) = payload.password.as_deref() {
        validate_password(password)?;
        active.password_hash = Set(hash_password(password)?);
        changed.push("password");
    }
    if let Some(permissions) = payload.permissions {
        let permissions = match role {
            Role::Staff => permissions.restrict_for_staff(),
            Role::Admin | Role::Superadmin => permissions,
        };
        active.permissions = Set(Some(permissions.to_value()));
        changed.push("permissions");
    }
    active.updated_at = Set(Utc::now().into());

    match active.update(conn).await {
        Ok(user) => Ok((user, changed)),
        Err(err) if is_unique_violation(&err) => Err(email_taken()),
        Err(err) => Err(err.into()),
    }
}
