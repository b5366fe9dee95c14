//! Form pre-validation, so clients can show inline errors before submit.
//!
//! - `POST /api/validate/donor`
//! - `POST /api/validate/hospital`

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;
use crate::validation::{DonorRegistration, FieldError, HospitalRegistration};

#[derive(Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl From<Vec<FieldError>> for ValidationResponse {
    fn from(errors: Vec<FieldError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

pub async fn donor(
    State(ctx): State<ApiContext>,
    Json(form): Json<DonorRegistration>,
) -> Json<ValidationResponse> {
    Json(form.validate_with(ctx.core.phone_rule()).into())
}

pub async fn hospital(Json(form): Json<HospitalRegistration>) -> Json<ValidationResponse> {
    Json(form.validate().into())
}
