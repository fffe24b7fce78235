use imei_ledger::{
    company::{company_user_ids, is_user_in_company},
    config::AuthConfig,
    db::{connect_url, run_migrations},
    dto::{
        brands::{CreateBrandRequest, UpdateBrandRequest},
        imei::{CreateImeiRequest, ImeiConflict, UpdateImeiRequest},
        sold::CreateSoldRequest,
        users::CreateUserRequest,
    },
    entity::{
        imei_records::{Column as ImeiCol, Entity as ImeiRecords},
        users::Entity as Users,
    },
    error::AppError,
    middleware::auth::Principal,
    permissions::{Permissions, Role},
    routes::params::{ActivityListQuery, BrandListQuery, SoldListQuery},
    services::{
        accounts::{NewAccount, insert_account},
        activity_service, admin_service, brand_service, imei_service, sold_service, staff_service,
        stats_service,
    },
    state::AppState,
};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

// Two companies side by side: X (admin + Bob) and Y (admin + Carol).
#[tokio::test]
async fn company_scoping_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let root_model = insert_account(
        &state.orm,
        NewAccount {
            name: "Root".into(),
            email: "root@example.com".into(),
            password: "rootpass".into(),
            role: Role::Superadmin,
            permissions: Permissions::all(),
            created_by: None,
        },
    )
    .await?;
    let root = Principal::from_user(&root_model)?;

    let admin_x = create_admin(&state, &root, "Company X", "x@example.com").await?;
    let admin_y = create_admin(&state, &root, "Company Y", "y@example.com").await?;
    let bob = create_staff(&state, &admin_x, "Bob", "bob@example.com").await?;
    let carol = create_staff(&state, &admin_y, "Carol", "carol@example.com").await?;

    // Membership
    assert!(is_user_in_company(&state.orm, admin_x.user_id, bob.user_id).await?);
    assert!(!is_user_in_company(&state.orm, admin_x.user_id, carol.user_id).await?);
    let members = company_user_ids(&state.orm, admin_x.user_id).await?;
    assert!(members.contains(&admin_x.user_id) && members.contains(&bob.user_id));
    assert!(!members.contains(&carol.user_id));

    // Bob buys a phone for 10000.
    let phone = imei_service::create_imei(&state, &bob, imei_payload("350000000000111", 10_000))
        .await?
        .data
        .expect("created imei");
    assert_eq!(phone.created_by, Some(bob.user_id));

    // Another company only learns that the IMEI exists.
    let first = imei_service::check_imei(&state, &carol, &phone.imei).await?.data;
    let second = imei_service::check_imei(&state, &carol, &phone.imei).await?.data;
    assert_eq!(first, second);
    let first = first.expect("check result");
    assert!(first.exists);
    assert_eq!(first.access_denied, Some(true));
    assert!(first.record.is_none());

    let own = imei_service::check_imei(&state, &admin_x, &phone.imei)
        .await?
        .data
        .expect("check result");
    assert_eq!(own.access_denied, Some(false));
    assert_eq!(own.record.map(|r| r.id), Some(phone.id));
    assert_eq!(own.already_sold, Some(false));

    let missing = imei_service::check_imei(&state, &carol, "000000000000000")
        .await?
        .data
        .expect("check result");
    assert!(!missing.exists);

    // Duplicate create is a conflict and leaves a single row behind.
    let err = imei_service::create_imei(&state, &carol, imei_payload(&phone.imei, 1))
        .await
        .err()
        .expect("duplicate imei");
    let AppError::Conflict { details, .. } = err else {
        panic!("expected conflict, got {err:?}");
    };
    let conflict: ImeiConflict = serde_json::from_value(details.expect("conflict details"))?;
    assert_eq!(conflict.existing_id, phone.id);
    assert!(!conflict.can_edit);
    let rows = ImeiRecords::find()
        .filter(ImeiCol::Imei.eq(phone.imei.as_str()))
        .count(&state.orm)
        .await?;
    assert_eq!(rows, 1);

    // Foreign records are forbidden, not hidden.
    let err = imei_service::get_imei(&state, &admin_y, phone.id)
        .await
        .err()
        .expect("cross-company read");
    assert!(matches!(err, AppError::Forbidden(_)));
    let err = imei_service::update_imei(&state, &carol, phone.id, UpdateImeiRequest::default())
        .await
        .err()
        .expect("cross-company update");
    assert!(matches!(err, AppError::Forbidden(_)));
    let err = imei_service::get_imei(&state, &admin_y, Uuid::new_v4())
        .await
        .err()
        .expect("missing record");
    assert!(matches!(err, AppError::NotFound));

    // Staff cannot touch the admin's records even inside their own company.
    let admin_phone =
        imei_service::create_imei(&state, &admin_x, imei_payload("350000000000222", 8_000))
            .await?
            .data
            .expect("created imei");
    let err = imei_service::delete_imei(&state, &bob, admin_phone.id)
        .await
        .err()
        .expect("staff delete of admin record");
    assert!(matches!(err, AppError::Forbidden(_)));
    let update = UpdateImeiRequest {
        color: Some("Green".into()),
        ..Default::default()
    };
    let updated = imei_service::update_imei(&state, &admin_x, phone.id, update)
        .await?
        .data
        .expect("updated imei");
    assert_eq!(updated.color, "Green");

    // Sold at 15000.
    let sale = CreateSoldRequest {
        imei_id: phone.id,
        sold_name: "Dewi".into(),
        sold_amount: 15_000,
        sold_date: None,
        store: "Main".into(),
    };
    sold_service::create_sold(&state, &bob, sale).await?;
    let again = CreateSoldRequest {
        imei_id: phone.id,
        sold_name: "Eka".into(),
        sold_amount: 16_000,
        sold_date: None,
        store: "Main".into(),
    };
    let err = sold_service::create_sold(&state, &bob, again)
        .await
        .err()
        .expect("second sale");
    assert!(matches!(err, AppError::Conflict { .. }));

    let bob_stats = stats_service::stock_statistics(&state, &bob)
        .await?
        .data
        .expect("stats");
    assert_eq!(bob_stats.total_count, 1);
    assert_eq!(bob_stats.sold_count, 1);
    assert_eq!(bob_stats.available_count, 0);
    assert_eq!(bob_stats.profit, 5_000);

    let y_stats = stats_service::stock_statistics(&state, &admin_y)
        .await?
        .data
        .expect("stats");
    assert_eq!(y_stats.total_count, 0);

    for principal in [&root, &admin_x, &admin_y, &bob, &carol] {
        let stats = stats_service::stock_statistics(&state, principal)
            .await?
            .data
            .expect("stats");
        let count = imei_service::count_imei_records(&state.orm, principal).await?;
        assert_eq!(stats.total_count, count, "role {}", principal.role);
    }

    // A sale belongs to whoever owns the IMEI: the superadmin selling X's stock
    // counts for X, and Bob selling a shared IMEI counts for nobody's company.
    sold_service::create_sold(&state, &root, sale_payload(admin_phone.id, 9_000)).await?;
    let shared = imei_service::create_imei(&state, &root, imei_payload("350000000000444", 1_000))
        .await?
        .data
        .expect("created imei");
    assert_eq!(shared.created_by, None);
    sold_service::create_sold(&state, &bob, sale_payload(shared.id, 2_000)).await?;

    for principal in [&root, &admin_x, &admin_y, &bob, &carol] {
        let stats = stats_service::stock_statistics(&state, principal)
            .await?
            .data
            .expect("stats");
        let listed = sold_service::list_sold(&state, principal, SoldListQuery::default())
            .await?
            .meta
            .and_then(|m| m.total);
        assert_eq!(Some(stats.sold_count), listed, "role {}", principal.role);
    }
    let x_stats = stats_service::stock_statistics(&state, &admin_x)
        .await?
        .data
        .expect("stats");
    assert_eq!(x_stats.sold_count, 2);
    assert_eq!(x_stats.total_sold_amount, 24_000);

    // Brands: company brands are invisible to other companies, and deleting one
    // leaves the brand text on IMEI records.
    let brand = brand_service::create_brand(
        &state,
        &admin_x,
        CreateBrandRequest {
            name: "Brand-X".into(),
            is_active: None,
        },
    )
    .await?
    .data
    .expect("brand");
    let carol_brands = brand_service::list_brands(&state, &carol, BrandListQuery::default())
        .await?
        .data
        .expect("brands");
    assert!(carol_brands.items.iter().all(|b| b.id != brand.id));

    let mut branded = imei_payload("350000000000333", 5_000);
    branded.brand = "Brand-X".into();
    let branded = imei_service::create_imei(&state, &admin_x, branded)
        .await?
        .data
        .expect("created imei");
    // Saving a brand unchanged leaves no trail; a rename does.
    let brand_updates = || ActivityListQuery {
        action: Some("update".into()),
        entity_type: Some("brand".into()),
        ..Default::default()
    };
    let rename = |name: &str| UpdateBrandRequest {
        name: Some(name.into()),
        is_active: None,
    };
    brand_service::update_brand(&state, &admin_x, brand.id, rename("Brand-X")).await?;
    let logged = activity_service::list_activity(&state, &admin_x, brand_updates())
        .await?
        .meta
        .and_then(|m| m.total);
    assert_eq!(logged, Some(0));
    brand_service::update_brand(&state, &admin_x, brand.id, rename("Brand-X2")).await?;
    let logged = activity_service::list_activity(&state, &admin_x, brand_updates())
        .await?
        .meta
        .and_then(|m| m.total);
    assert_eq!(logged, Some(1));

    brand_service::delete_brand(&state, &admin_x, brand.id).await?;
    let kept = imei_service::get_imei(&state, &admin_x, branded.id)
        .await?
        .data
        .expect("imei");
    assert_eq!(kept.record.brand, "Brand-X");

    // Activity is company-scoped and the superadmin leaves no trail.
    let x_log = activity_service::list_activity(&state, &admin_x, ActivityListQuery::default())
        .await?
        .data
        .expect("activity");
    assert!(x_log.items.iter().any(|a| a.user_id == bob.user_id));
    assert!(x_log.items.iter().all(|a| a.user_id != carol.user_id));
    let y_log = activity_service::list_activity(&state, &admin_y, ActivityListQuery::default())
        .await?
        .data
        .expect("activity");
    assert!(y_log.items.iter().all(|a| a.user_id != bob.user_id));
    let root_log = activity_service::list_activity(&state, &root, ActivityListQuery::default())
        .await?
        .data
        .expect("activity");
    assert!(root_log.items.iter().all(|a| a.user_id != root.user_id));

    // Company detail
    let detail = admin_service::company_detail(&state, &root, admin_x.user_id)
        .await?
        .data
        .expect("detail");
    assert_eq!(detail.stats.staff_count, 1);
    assert_eq!(detail.stats.imei_count, 3);
    assert_eq!(detail.stats.sold_count, 2);
    assert_eq!(detail.recent.sold.len(), 2);
    assert_eq!(detail.recent.staff.len(), 1);

    let err = admin_service::company_detail(&state, &admin_x, admin_x.user_id)
        .await
        .err()
        .expect("admin cannot open company detail");
    assert!(matches!(err, AppError::Forbidden(_)));

    // A staff account with no admin belongs to no company.
    let orphan = insert_account(
        &state.orm,
        NewAccount {
            name: "Orphan".into(),
            email: "orphan@example.com".into(),
            password: "secret123".into(),
            role: Role::Staff,
            permissions: Permissions::staff_default(),
            created_by: None,
        },
    )
    .await?;
    for admin in [&admin_x, &admin_y] {
        let err = staff_service::get_staff(&state, admin, orphan.id)
            .await
            .err()
            .expect("unassigned staff read");
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = staff_service::delete_staff(&state, admin, orphan.id)
            .await
            .err()
            .expect("unassigned staff delete");
        assert!(matches!(err, AppError::Forbidden(_)));
    }
    staff_service::get_staff(&state, &root, orphan.id).await?;

    // Removing Bob hands his records to the admin.
    staff_service::delete_staff(&state, &admin_x, bob.user_id).await?;
    let moved = ImeiRecords::find_by_id(phone.id)
        .one(&state.orm)
        .await?
        .expect("imei survives staff deletion");
    assert_eq!(moved.created_by, Some(admin_x.user_id));

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = connect_url(database_url).await?;
    run_migrations(&orm).await?;
    orm.execute_unprepared(
        "TRUNCATE TABLE activity_logs, sold_records, imei_records, brands, users",
    )
    .await?;

    let auth = AuthConfig {
        jwt_secret: "test-secret".into(),
        token_ttl_hours: 1,
    };
    Ok(AppState::new(orm, auth))
}

async fn principal_for(state: &AppState, id: Uuid) -> anyhow::Result<Principal> {
    let user = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user {id} missing"))?;
    Ok(Principal::from_user(&user)?)
}

async fn create_admin(
    state: &AppState,
    root: &Principal,
    name: &str,
    email: &str,
) -> anyhow::Result<Principal> {
    let admin = admin_service::create_admin(state, root, user_payload(name, email))
        .await?
        .data
        .expect("created admin");
    principal_for(state, admin.id).await
}

async fn create_staff(
    state: &AppState,
    admin: &Principal,
    name: &str,
    email: &str,
) -> anyhow::Result<Principal> {
    let staff = staff_service::create_staff(state, admin, user_payload(name, email))
        .await?
        .data
        .expect("created staff");
    assert_eq!(staff.created_by, Some(admin.user_id));
    principal_for(state, staff.id).await
}

fn user_payload(name: &str, email: &str) -> CreateUserRequest {
    CreateUserRequest {
        name: name.into(),
        email: email.into(),
        password: "secret123".into(),
        permissions: None,
        admin_id: None,
    }
}

fn sale_payload(imei_id: Uuid, amount: i64) -> CreateSoldRequest {
    CreateSoldRequest {
        imei_id,
        sold_name: "Walk-in".into(),
        sold_amount: amount,
        sold_date: None,
        store: "Main".into(),
    }
}

fn imei_payload(imei: &str, amount: i64) -> CreateImeiRequest {
    CreateImeiRequest {
        imei: imei.into(),
        purchase: "Supplier".into(),
        amount,
        brand: "Samsung".into(),
        ..Default::default()
    }
}
