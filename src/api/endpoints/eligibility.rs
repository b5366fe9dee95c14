//! `GET /api/eligibility?last_donation=YYYY-MM-DD`: eligibility snapshot.

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::eligibility::EligibilityStatus;

#[derive(Deserialize)]
pub struct EligibilityQuery {
    pub last_donation: Option<String>,
}

pub async fn check(
    State(ctx): State<ApiContext>,
    Query(query): Query<EligibilityQuery>,
) -> Result<Json<EligibilityStatus>, ApiError> {
    let last_donation = query
        .last_donation
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| {
            ApiError::BadRequest("Invalid last_donation date (expected YYYY-MM-DD)".into())
        })?;

    let status = ctx.core.policy().status(last_donation, ctx.core.today());
    Ok(Json(status))
}
