//! Donor endpoints.
//!
//! - `GET /api/donors`: admin list, `?q=` narrows by name or phone
//! - `POST /api/donors`: register
//! - `POST /api/donors/search`: directory search
//! - `GET /api/donors/:id`: dashboard profile
//! - `PATCH /api/donors/:id`: edit profile
//! - `DELETE /api/donors/:id`: delete with history
//! - `POST /api/donors/:id/donations`: log a donation

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext};
use crate::db::repository::DonorRepo;
use crate::directory::{MissingCoordinates, SearchCriteria};
use crate::geo::Coordinates;
use crate::models::{BloodGroup, DonationRecord, Donor};
use crate::registry::{self, DonorHit, DonorProfile, DonorUpdate, NewDonation};
use crate::validation::DonorRegistration;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Donor>>, ApiError> {
    let conn = ctx.core.db()?;
    Ok(Json(registry::browse_donors(&conn, query.q.as_deref())?))
}

pub async fn register(
    State(ctx): State<ApiContext>,
    Json(form): Json<DonorRegistration>,
) -> Result<(StatusCode, Json<Donor>), ApiError> {
    let conn = ctx.core.db()?;
    let donor = registry::register_donor(&conn, &form, ctx.core.phone_rule(), ctx.core.today())?;
    Ok((StatusCode::CREATED, Json(donor)))
}

/// Search body. Radius and missing-coordinate handling fall back to the
/// server settings when omitted.
#[derive(Debug, Default, Deserialize)]
pub struct SearchBody {
    #[serde(default)]
    pub blood_group: Option<BloodGroup>,
    #[serde(default)]
    pub recipient_group: Option<BloodGroup>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub available_only: bool,
    #[serde(default)]
    pub max_distance_km: Option<f64>,
    #[serde(default)]
    pub reference: Option<Coordinates>,
    #[serde(default)]
    pub missing_coordinates: Option<MissingCoordinates>,
}

pub async fn search(
    State(ctx): State<ApiContext>,
    Json(body): Json<SearchBody>,
) -> Result<Json<Vec<DonorHit>>, ApiError> {
    let settings = &ctx.core.settings;
    let criteria = SearchCriteria {
        blood_group: body.blood_group,
        recipient_group: body.recipient_group,
        city: body.city,
        query: body.query,
        available_only: body.available_only,
        max_distance_km: body.max_distance_km.unwrap_or(settings.default_max_distance_km),
        reference: body.reference,
        missing_coordinates: body
            .missing_coordinates
            .unwrap_or(settings.missing_coordinates),
    };

    let conn = ctx.core.db()?;
    let hits = registry::search_donors(
        &DonorRepo::new(&conn),
        &criteria,
        ctx.core.policy(),
        ctx.core.today(),
    )?;
    Ok(Json(hits))
}

pub async fn profile(
    State(ctx): State<ApiContext>,
    Path(donor_id): Path<String>,
) -> Result<Json<DonorProfile>, ApiError> {
    let id = parse_id(&donor_id, "donor")?;
    let conn = ctx.core.db()?;
    let profile = registry::donor_profile(&conn, &id, ctx.core.policy(), ctx.core.today())?;
    Ok(Json(profile))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Path(donor_id): Path<String>,
    Json(update): Json<DonorUpdate>,
) -> Result<Json<Donor>, ApiError> {
    let id = parse_id(&donor_id, "donor")?;
    let conn = ctx.core.db()?;
    let donor = registry::update_donor(&conn, &id, update, ctx.core.phone_rule())?;
    Ok(Json(donor))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(donor_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&donor_id, "donor")?;
    let conn = ctx.core.db()?;
    registry::delete_donor(&conn, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn record_donation(
    State(ctx): State<ApiContext>,
    Path(donor_id): Path<String>,
    Json(donation): Json<NewDonation>,
) -> Result<(StatusCode, Json<DonationRecord>), ApiError> {
    let id = parse_id(&donor_id, "donor")?;
    let conn = ctx.core.db()?;
    let record = registry::record_donation(&conn, &id, donation)?;
    Ok((StatusCode::CREATED, Json(record)))
}
