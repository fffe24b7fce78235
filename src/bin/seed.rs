use imei_ledger::{
    config::AppConfig,
    db::{DbPool, create_orm_conn, pg_pool, run_migrations},
    permissions::{Permissions, Role},
    services::accounts::{hash_password, normalize_email, validate_password},
};
use uuid::Uuid;

const GLOBAL_BRANDS: &[&str] = &[
    "Apple", "Samsung", "Xiaomi", "Oppo", "Vivo", "Realme", "Infinix", "Google", "OnePlus",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config).await?;
    run_migrations(&orm).await?;
    let pool = pg_pool(&orm);

    let email = std::env::var("SEED_SUPERADMIN_EMAIL")
        .unwrap_or_else(|_| "superadmin@example.com".to_string());
    let password =
        std::env::var("SEED_SUPERADMIN_PASSWORD").unwrap_or_else(|_| "superadmin123".to_string());

    let superadmin_id = ensure_superadmin(pool, &email, &password).await?;
    seed_brands(pool).await?;

    println!("Seed completed. Superadmin ID: {superadmin_id}");
    Ok(())
}

async fn ensure_superadmin(pool: &DbPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let email = normalize_email(email)?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    // Existing accounts keep their password; only the role is forced.
    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, permissions)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("Superadmin")
    .bind(email.as_str())
    .bind(password_hash)
    .bind(Role::Superadmin.as_str())
    .bind(Permissions::all().to_value())
    .fetch_one(pool)
    .await?;

    println!("Ensured superadmin {email}");
    Ok(user_id)
}

/// Ownerless brands are shared with every company.
async fn seed_brands(pool: &DbPool) -> anyhow::Result<()> {
    for name in GLOBAL_BRANDS {
        sqlx::query(
            r#"
            INSERT INTO brands (id, name, is_active, created_by)
            VALUES ($1, $2, TRUE, NULL)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(*name)
        .execute(pool)
        .await?;
    }

    println!("Seeded {} brands", GLOBAL_BRANDS.len());
    Ok(())
}
