//! Blood request endpoints.
//!
//! - `GET /api/requests`: request board, most urgent first
//! - `POST /api/requests`: post a request
//! - `PATCH /api/requests/:id`: edit or close a request
//! - `DELETE /api/requests/:id`: withdraw a request
//! - `GET /api/requests/:id/matches`: donors who could answer
//! - `POST /api/requests/:id/respond`: count a donor response

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext};
use crate::models::{BloodGroup, BloodRequest, Donor, RequestFilter, RequestStatus};
use crate::registry::{self, NewRequest, RequestUpdate};

#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    pub hospital_id: Option<Uuid>,
    pub status: Option<RequestStatus>,
    pub blood_group: Option<BloodGroup>,
}

pub async fn board(
    State(ctx): State<ApiContext>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<Vec<BloodRequest>>, ApiError> {
    let filter = RequestFilter {
        hospital_id: query.hospital_id,
        status: query.status,
        blood_group: query.blood_group,
    };
    let conn = ctx.core.db()?;
    Ok(Json(registry::request_board(&conn, &filter)?))
}

pub async fn post(
    State(ctx): State<ApiContext>,
    Json(new): Json<NewRequest>,
) -> Result<(StatusCode, Json<BloodRequest>), ApiError> {
    let conn = ctx.core.db()?;
    let request = registry::post_request(&conn, new, ctx.core.today())?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Path(request_id): Path<String>,
    Json(update): Json<RequestUpdate>,
) -> Result<Json<BloodRequest>, ApiError> {
    let id = parse_id(&request_id, "request")?;
    let conn = ctx.core.db()?;
    Ok(Json(registry::update_request(&conn, &id, update)?))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(request_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&request_id, "request")?;
    let conn = ctx.core.db()?;
    registry::delete_request(&conn, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn matches(
    State(ctx): State<ApiContext>,
    Path(request_id): Path<String>,
) -> Result<Json<Vec<Donor>>, ApiError> {
    let id = parse_id(&request_id, "request")?;
    let conn = ctx.core.db()?;
    let donors = registry::matching_donors(&conn, &id, ctx.core.policy(), ctx.core.today())?;
    Ok(Json(donors))
}

#[derive(Serialize)]
pub struct RespondResponse {
    pub donors_responded: u32,
}

pub async fn respond(
    State(ctx): State<ApiContext>,
    Path(request_id): Path<String>,
) -> Result<Json<RespondResponse>, ApiError> {
    let id = parse_id(&request_id, "request")?;
    let conn = ctx.core.db()?;
    let donors_responded = registry::respond_to_request(&conn, &id)?;
    Ok(Json(RespondResponse { donors_responded }))
}
