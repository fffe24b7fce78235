use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::{
    audit::{self, ActivityAction, ActivityEntry, EntityType},
    config::AuthConfig,
    dto::auth::{Claims, LoginRequest, LoginResponse, UpdateProfileRequest},
    entity::users::{ActiveModel, Column, Entity as Users, Model as UserModel},
    error::{AppError, AppResult, is_unique_violation},
    middleware::auth::{Principal, ensure_menu},
    models::User,
    permissions::MenuPermission,
    response::{ApiResponse, Meta},
    services::accounts::{
        hash_password, normalize_email, validate_name, validate_password, verify_password,
    },
    state::AppState,
};

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".into())
}

pub fn issue_token(auth: &AuthConfig, user: &UserModel) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(auth.token_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.clone(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
    ip_address: Option<String>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_ascii_lowercase();

    let user = Users::find()
        .filter(Column::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(invalid_credentials());
    }

    let token = issue_token(&state.auth, &user)?;
    let principal = Principal::from_user(&user)?.with_ip(ip_address);

    audit::record(
        &state.orm,
        &principal,
        ActivityEntry::new(
            ActivityAction::Login,
            EntityType::Auth,
            Some(user.id),
            format!("{} logged in", user.name),
        ),
    )
    .await;

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
        user: User::from(user),
    };

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

async fn current_user(state: &AppState, principal: &Principal) -> AppResult<UserModel> {
    Users::find_by_id(principal.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn get_profile(state: &AppState, principal: &Principal) -> AppResult<ApiResponse<User>> {
    ensure_menu(principal, MenuPermission::Profile)?;
    let user = current_user(state, principal).await?;
    Ok(ApiResponse::success("Profile", User::from(user), Some(Meta::empty())))
}

/// Self-service update of name, email and password.
pub async fn update_profile(
    state: &AppState,
    principal: &Principal,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_menu(principal, MenuPermission::Profile)?;
    let user = current_user(state, principal).await?;

    let mut changed: Vec<&'static str> = Vec::new();
    let current_hash = user.password_hash.clone();
    let mut active: ActiveModel = user.into();

    if let Some(name) = payload.name.as_deref() {
        active.name = Set(validate_name(name)?);
        changed.push("name");
    }
    if let Some(email) = payload.email.as_deref() {
        active.email = Set(normalize_email(email)?);
        changed.push("email");
    }
    if let Some(new_password) = payload.new_password.as_deref() {
        let current = payload
            .current_password
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("current_password is required".into()))?;
        if !verify_password(current, &current_hash)? {
            return Err(AppError::BadRequest("current password is incorrect".into()));
        }
        validate_password(new_password)?;
        active.password_hash = Set(hash_password(new_password)?);
        changed.push("password");
    }
    active.updated_at = Set(Utc::now().into());

    let user = match active.update(&state.orm).await {
        Ok(user) => user,
        Err(err) if is_unique_violation(&err) => {
            return Err(AppError::conflict("Email is already taken"));
        }
        Err(err) => return Err(err.into()),
    };

    audit::record(
        &state.orm,
        principal,
        ActivityEntry::new(
            ActivityAction::Update,
            EntityType::Profile,
            Some(user.id),
            "Updated profile",
        )
        .with_metadata(serde_json::json!({ "fields": changed })),
    )
    .await;

    Ok(ApiResponse::success("Updated", User::from(user), Some(Meta::empty())))
}
