//! `GET /api/compatibility/:group`: donor groups a recipient can receive.

use axum::extract::Path;
use axum::Json;
use serde::Serialize;

use crate::compatibility;
use crate::models::BloodGroup;

#[derive(Serialize)]
pub struct CompatibilityResponse {
    pub recipient: String,
    pub donors: Vec<BloodGroup>,
}

/// Unknown groups answer with an empty list rather than an error.
pub async fn donors_for(Path(group): Path<String>) -> Json<CompatibilityResponse> {
    let donors = compatibility::compatible_donors_for(&group);
    Json(CompatibilityResponse {
        recipient: group,
        donors,
    })
}
