//! Hospital endpoints.
//!
//! - `GET /api/hospitals`: admin list, `?q=` narrows by name or location
//! - `POST /api/hospitals`: register (unverified)
//! - `DELETE /api/hospitals/:id`: delete with inventory and requests
//! - `POST /api/hospitals/:id/verify`: admin approval
//! - `PUT /api/hospitals/:id/inventory`: set stock for one group
//! - `GET /api/hospitals/:id/stats`: dashboard counters

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext};
use crate::models::{BloodGroup, BloodInventory, Hospital, HospitalFilter};
use crate::registry::{self, HospitalStats};
use crate::validation::HospitalRegistration;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    #[serde(default)]
    pub verified_only: bool,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Hospital>>, ApiError> {
    let filter = HospitalFilter {
        verified_only: query.verified_only,
    };
    let conn = ctx.core.db()?;
    let hospitals = registry::browse_hospitals(&conn, &filter, query.q.as_deref())?;
    Ok(Json(hospitals))
}

pub async fn register(
    State(ctx): State<ApiContext>,
    Json(form): Json<HospitalRegistration>,
) -> Result<(StatusCode, Json<Hospital>), ApiError> {
    let conn = ctx.core.db()?;
    let hospital = registry::register_hospital(&conn, &form)?;
    Ok((StatusCode::CREATED, Json(hospital)))
}

#[derive(Debug, Deserialize)]
pub struct InventoryBody {
    pub blood_group: BloodGroup,
    pub units: u32,
}

pub async fn set_inventory(
    State(ctx): State<ApiContext>,
    Path(hospital_id): Path<String>,
    Json(body): Json<InventoryBody>,
) -> Result<Json<BloodInventory>, ApiError> {
    let id = parse_id(&hospital_id, "hospital")?;
    let conn = ctx.core.db()?;
    let inventory = registry::set_inventory(&conn, &id, body.blood_group, body.units)?;
    Ok(Json(inventory))
}

pub async fn stats(
    State(ctx): State<ApiContext>,
    Path(hospital_id): Path<String>,
) -> Result<Json<HospitalStats>, ApiError> {
    let id = parse_id(&hospital_id, "hospital")?;
    let conn = ctx.core.db()?;
    Ok(Json(registry::hospital_stats(&conn, &id)?))
}

pub async fn verify(
    State(ctx): State<ApiContext>,
    Path(hospital_id): Path<String>,
) -> Result<Json<Hospital>, ApiError> {
    let id = parse_id(&hospital_id, "hospital")?;
    let conn = ctx.core.db()?;
    registry::verify_hospital(&conn, &id)?;
    Ok(Json(registry::get_hospital(&conn, &id)?))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(hospital_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&hospital_id, "hospital")?;
    let conn = ctx.core.db()?;
    registry::delete_hospital(&conn, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
