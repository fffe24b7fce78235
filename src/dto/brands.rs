use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Brand;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBrandRequest {
    pub name: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBrandRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct BrandList {
    #[schema(value_type = Vec<Brand>)]
    pub items: Vec<Brand>,
}
