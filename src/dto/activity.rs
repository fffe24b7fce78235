use serde::Serialize;
use utoipa::ToSchema;

use crate::models::ActivityLog;

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ActivityList {
    #[schema(value_type = Vec<ActivityLog>)]
    pub items: Vec<ActivityLog>,
}
