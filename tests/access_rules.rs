use axum::http::HeaderMap;
use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::BTreeSet;

use imei_ledger::{
    audit::{field_changes, snapshot_changes},
    company::Scope,
    config::AuthConfig,
    dto::{auth::Claims, imei::ImeiWithSale, stats::StockStatistics},
    entity::users::Model as UserModel,
    export::{CSV_HEADERS, csv_row, to_csv},
    guard::{Decision, DenyReason, decide},
    middleware::auth::{Principal, client_ip},
    models::{ImeiRecord, SoldRecord},
    permissions::{MenuPermission, Permissions, Role, normalize_permissions},
    routes::params::{DEFAULT_PER_PAGE, MAX_PAGE, MAX_PER_PAGE, Pagination},
    services::auth_service::issue_token,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde_json::json;
use uuid::Uuid;

fn imei_record(amount: i64) -> ImeiRecord {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    ImeiRecord {
        id: Uuid::new_v4(),
        imei: "356789012345678".into(),
        purchase: "Walk-in".into(),
        amount,
        date: NaiveDate::from_ymd_opt(2024, 3, 1),
        brand: "Samsung".into(),
        model: "A54".into(),
        color: "Black".into(),
        ram: "8GB".into(),
        storage: "128GB".into(),
        created_by: None,
        created_at: at,
        updated_at: at,
    }
}

fn sold_record(imei_id: Uuid, amount: i64) -> SoldRecord {
    let at = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
    SoldRecord {
        id: Uuid::new_v4(),
        imei_id,
        sold_name: "Rina".into(),
        sold_amount: amount,
        sold_date: NaiveDate::from_ymd_opt(2024, 3, 5),
        store: "Main St".into(),
        created_by: None,
        created_at: at,
        updated_at: at,
    }
}

#[test]
fn superadmin_is_always_allowed() {
    let me = Uuid::new_v4();
    let owner = Some(Uuid::new_v4());
    assert_eq!(decide(me, Role::Superadmin, owner, false), Decision::Allow);
    assert_eq!(decide(me, Role::Superadmin, None, false), Decision::Allow);
}

#[test]
fn ownerless_records_are_shared() {
    let me = Uuid::new_v4();
    assert_eq!(decide(me, Role::Admin, None, false), Decision::Allow);
    assert_eq!(decide(me, Role::Staff, None, false), Decision::Allow);
}

#[test]
fn admin_needs_owner_in_company() {
    let me = Uuid::new_v4();
    let owner = Some(Uuid::new_v4());
    assert_eq!(decide(me, Role::Admin, owner, true), Decision::Allow);
    assert_eq!(
        decide(me, Role::Admin, owner, false),
        Decision::Deny(DenyReason::NotInCompany)
    );
}

#[test]
fn staff_only_touch_their_own_records() {
    let me = Uuid::new_v4();
    assert_eq!(decide(me, Role::Staff, Some(me), false), Decision::Allow);
    // Company membership does not widen a staff member's reach.
    assert_eq!(
        decide(me, Role::Staff, Some(Uuid::new_v4()), true),
        Decision::Deny(DenyReason::NotOwner)
    );
}

#[test]
fn denial_maps_to_forbidden() {
    let err = Decision::Deny(DenyReason::NotOwner)
        .into_result()
        .err()
        .expect("deny is an error");
    assert_eq!(err.status(), axum::http::StatusCode::FORBIDDEN);
}

#[test]
fn owner_scope_excludes_ownerless_rows() {
    let me = Uuid::new_v4();
    let scope = Scope::Owners(BTreeSet::from([me]));
    assert!(scope.includes(Some(me)));
    assert!(!scope.includes(Some(Uuid::new_v4())));
    assert!(!scope.includes(None));
    assert!(Scope::All.includes(None));
}

#[test]
fn legacy_permission_shapes_normalize() {
    let canonical = json!({ "dashboard": true, "stock": false, "bogus": true, "reports": "yes" });
    let perms = normalize_permissions(Some(&canonical));
    assert!(perms.get(MenuPermission::Dashboard));
    assert!(!perms.get(MenuPermission::Stock));
    assert!(!perms.get(MenuPermission::Reports));
    assert_eq!(perms.to_value(), json!({ "dashboard": true, "stock": false }));

    let encoded = json!(r#"{"stock":true}"#);
    assert!(normalize_permissions(Some(&encoded)).get(MenuPermission::Stock));

    let double = json!(serde_json::to_string(r#"{"activity":true}"#).unwrap());
    assert!(normalize_permissions(Some(&double)).get(MenuPermission::Activity));

    for junk in [json!([1, 2]), json!(42), json!("not json"), json!(null)] {
        assert!(normalize_permissions(Some(&junk)).is_empty(), "{junk}");
    }
    assert!(normalize_permissions(None).is_empty());
}

#[test]
fn staff_never_hold_the_staff_flag() {
    let perms = Permissions::all().restrict_for_staff();
    assert!(!perms.get(MenuPermission::Staff));
    assert!(perms.get(MenuPermission::Stock));

    let defaults = Permissions::staff_default();
    assert!(defaults.get(MenuPermission::Dashboard));
    assert!(defaults.get(MenuPermission::Profile));
    assert!(!defaults.get(MenuPermission::Brands));
}

#[test]
fn menu_gate_only_binds_staff() {
    let staff = Principal {
        user_id: Uuid::new_v4(),
        name: "Bob".into(),
        role: Role::Staff,
        permissions: Permissions::staff_default(),
        ip_address: None,
    };
    assert!(staff.can_open(MenuPermission::Stock));
    assert!(!staff.can_open(MenuPermission::Reports));
    assert_eq!(staff.owner_id(), Some(staff.user_id));

    let admin = Principal {
        role: Role::Admin,
        permissions: Permissions::default(),
        ..staff.clone()
    };
    assert!(admin.can_open(MenuPermission::Reports));

    let root = Principal {
        role: Role::Superadmin,
        ..staff
    };
    assert_eq!(root.owner_id(), None);
}

#[test]
fn statistics_derive_available_and_profit() {
    let stats = StockStatistics::from_totals(3, 1, 30_000, 15_000);
    assert_eq!(stats.available_count, 2);
    assert_eq!(stats.profit, -15_000);

    let single = StockStatistics::from_totals(1, 1, 10_000, 15_000);
    assert_eq!(single.available_count, 0);
    assert_eq!(single.profit, 5_000);
}

#[test]
fn pagination_is_clamped() {
    let page = Pagination::new(0, -5).normalize();
    assert_eq!(page.page, 1);
    assert_eq!(page.per_page, DEFAULT_PER_PAGE);
    assert_eq!(page.offset(), 0);

    let page = Pagination::new(3, 10_000).normalize();
    assert_eq!(page.per_page, MAX_PER_PAGE);
    assert_eq!(page.offset(), 2 * MAX_PER_PAGE);

    assert_eq!(Pagination::default().normalize().page, 1);

    let page = Pagination::new(i64::MAX, 100).normalize();
    assert_eq!(page.page, MAX_PAGE);
    assert_eq!(page.offset(), (MAX_PAGE - 1) * MAX_PER_PAGE);
}

#[test]
fn field_changes_reports_from_and_to() {
    let before = json!({ "amount": 100, "brand": "Oppo", "color": "Red" });
    let after = json!({ "amount": 120, "brand": "Oppo", "ram": "4GB" });
    let changes = field_changes(&before, &after);

    assert_eq!(changes.len(), 3);
    assert_eq!(changes["amount"], json!({ "from": 100, "to": 120 }));
    assert_eq!(changes["color"], json!({ "from": "Red", "to": null }));
    assert_eq!(changes["ram"], json!({ "from": null, "to": "4GB" }));
}

#[test]
fn snapshot_changes_ignores_updated_at() {
    let before = imei_record(100);
    let mut after = before.clone();
    after.updated_at = Utc::now();
    assert!(snapshot_changes(&before, &after).is_empty());

    after.color = "Blue".into();
    let changes = snapshot_changes(&before, &after);
    assert_eq!(changes.keys().collect::<Vec<_>>(), vec!["color"]);
}

#[test]
fn csv_row_fills_profit_only_for_sales() {
    let record = imei_record(10_000);
    let sale = sold_record(record.id, 15_000);

    let sold_row = csv_row(&ImeiWithSale::new(record.clone(), Some(sale)));
    assert_eq!(sold_row[0], "356789012345678");
    assert_eq!(sold_row[3], "2024-03-01");
    assert_eq!(sold_row[10], "15000");
    assert_eq!(sold_row[13], "5000");
    assert_eq!(sold_row[14], "2024-03-01 09:30:00");

    let free_sale = sold_record(record.id, 0);
    let zero_row = csv_row(&ImeiWithSale::new(record.clone(), Some(free_sale)));
    assert_eq!(zero_row[13], "");

    let stock_row = csv_row(&ImeiWithSale::new(record, None));
    assert_eq!(stock_row[9], "");
    assert_eq!(stock_row[13], "");
}

#[test]
fn csv_document_has_header_and_rows() {
    let items = vec![
        ImeiWithSale::new(imei_record(1), None),
        ImeiWithSale::new(imei_record(2), None),
    ];
    let body = to_csv(&items).expect("csv");
    let mut lines = body.lines();
    assert_eq!(lines.next(), Some(CSV_HEADERS.join(",").as_str()));
    assert_eq!(lines.count(), 2);
}

#[test]
fn client_ip_prefers_forwarded_for() {
    let mut headers = HeaderMap::new();
    assert_eq!(client_ip(&headers), None);

    headers.insert("x-real-ip", "10.0.0.9".parse().unwrap());
    assert_eq!(client_ip(&headers).as_deref(), Some("10.0.0.9"));

    headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
    assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
}

#[test]
fn issued_token_carries_subject_and_role() {
    let auth = AuthConfig {
        jwt_secret: "test-secret".into(),
        token_ttl_hours: 1,
    };
    let now = Utc::now();
    let user = UserModel {
        id: Uuid::new_v4(),
        name: "Ana".into(),
        email: "ana@example.com".into(),
        password_hash: String::new(),
        role: Role::Admin.as_str().into(),
        permissions: None,
        created_by: None,
        created_at: now.into(),
        updated_at: now.into(),
    };

    let token = issue_token(&auth, &user).expect("token");
    let decoded = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .expect("valid token");
    assert_eq!(decoded.claims.sub, user.id.to_string());
    assert_eq!(decoded.claims.role, "admin");
}
