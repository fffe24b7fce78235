use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    audit::{ActivityAction, EntityType},
    dto::{
        activity::ActivityList,
        auth::{LoginRequest, LoginResponse, UpdateProfileRequest},
        brands::{BrandList, CreateBrandRequest, UpdateBrandRequest},
        imei::{
            CreateImeiRequest, ImeiCheckResponse, ImeiConflict, ImeiList, ImeiStatus,
            ImeiWithSale, UpdateImeiRequest,
        },
        sold::{CreateSoldRequest, SoldList, SoldWithImei, UpdateSoldRequest},
        stats::StockStatistics,
        users::{
            CompanyDetail, CompanyRecent, CompanyStats, CreateUserRequest, UpdateUserRequest,
            UserList,
        },
    },
    models::{ActivityLog, Brand, ImeiRecord, SoldRecord, User},
    permissions::{MenuPermission, Permissions, Role},
    response::{ApiResponse, Meta},
    routes::{
        activity, admins, auth, brands, health, imei, params, profile, reports, sold, staff,
        stats,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        auth::login,
        profile::get_profile,
        profile::update_profile,
        imei::list_imei,
        imei::check_imei,
        imei::get_imei,
        imei::create_imei,
        imei::update_imei,
        imei::delete_imei,
        sold::list_sold,
        sold::get_sold,
        sold::create_sold,
        sold::update_sold,
        sold::delete_sold,
        brands::list_brands,
        brands::get_brand,
        brands::create_brand,
        brands::update_brand,
        brands::delete_brand,
        staff::list_staff,
        staff::get_staff,
        staff::create_staff,
        staff::update_staff,
        staff::delete_staff,
        admins::list_admins,
        admins::get_admin,
        admins::company_detail,
        admins::create_admin,
        admins::update_admin,
        admins::delete_admin,
        activity::list_activity,
        stats::stock_statistics,
        reports::export_csv
    ),
    components(
        schemas(
            User,
            Role,
            MenuPermission,
            Permissions,
            Brand,
            ImeiRecord,
            SoldRecord,
            ActivityLog,
            ActivityAction,
            EntityType,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            CreateImeiRequest,
            UpdateImeiRequest,
            ImeiStatus,
            ImeiWithSale,
            ImeiList,
            ImeiConflict,
            ImeiCheckResponse,
            CreateSoldRequest,
            UpdateSoldRequest,
            SoldWithImei,
            SoldList,
            CreateBrandRequest,
            UpdateBrandRequest,
            BrandList,
            CreateUserRequest,
            UpdateUserRequest,
            UserList,
            CompanyStats,
            CompanyRecent,
            CompanyDetail,
            StockStatistics,
            ActivityList,
            params::SortOrder,
            params::SoldStatus,
            health::HealthData,
            Meta,
            ApiResponse<User>,
            ApiResponse<ImeiList>,
            ApiResponse<SoldList>,
            ApiResponse<StockStatistics>,
            ApiResponse<CompanyDetail>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Profile", description = "Own account endpoints"),
        (name = "IMEI", description = "IMEI stock endpoints"),
        (name = "Sold", description = "Sale endpoints"),
        (name = "Brands", description = "Brand catalogue endpoints"),
        (name = "Staff", description = "Company staff endpoints"),
        (name = "Admins", description = "Company admin endpoints (superadmin only)"),
        (name = "Activity", description = "Audit log endpoints"),
        (name = "Stats", description = "Stock statistics endpoints"),
        (name = "Reports", description = "Report export endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
