//! `GET /api/stats`: network-wide admin totals.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::registry::{self, AdminStats};

pub async fn admin(State(ctx): State<ApiContext>) -> Result<Json<AdminStats>, ApiError> {
    let conn = ctx.core.db()?;
    Ok(Json(registry::admin_stats(&conn)?))
}
