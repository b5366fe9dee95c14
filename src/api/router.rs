//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.

use std::sync::Arc;

use axum::routing::{delete, get, patch, post, put};
use axum::Router;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/compatibility/:group",
            get(endpoints::compatibility::donors_for),
        )
        .route("/eligibility", get(endpoints::eligibility::check))
        .route("/validate/donor", post(endpoints::validate::donor))
        .route("/validate/hospital", post(endpoints::validate::hospital))
        .route(
            "/donors",
            get(endpoints::donors::list).post(endpoints::donors::register),
        )
        .route("/donors/search", post(endpoints::donors::search))
        .route(
            "/donors/:id",
            get(endpoints::donors::profile)
                .patch(endpoints::donors::update)
                .delete(endpoints::donors::delete),
        )
        .route(
            "/donors/:id/donations",
            post(endpoints::donors::record_donation),
        )
        .route(
            "/hospitals",
            get(endpoints::hospitals::list).post(endpoints::hospitals::register),
        )
        .route("/hospitals/:id", delete(endpoints::hospitals::delete))
        .route("/hospitals/:id/verify", post(endpoints::hospitals::verify))
        .route(
            "/hospitals/:id/inventory",
            put(endpoints::hospitals::set_inventory),
        )
        .route("/hospitals/:id/stats", get(endpoints::hospitals::stats))
        .route(
            "/requests",
            get(endpoints::requests::board).post(endpoints::requests::post),
        )
        .route(
            "/requests/:id",
            patch(endpoints::requests::update).delete(endpoints::requests::delete),
        )
        .route("/requests/:id/matches", get(endpoints::requests::matches))
        .route("/requests/:id/respond", post(endpoints::requests::respond))
        .route("/stats", get(endpoints::stats::admin))
        .with_state(ctx);

    Router::new().nest("/api", routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Settings;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn test_app() -> Router {
        let core = CoreState::in_memory(Settings::default())
            .unwrap()
            .with_fixed_today(today());
        api_router(Arc::new(core))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 65536)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn donor_form(name: &str, phone: &str, group: &str) -> Value {
        json!({
            "name": name,
            "age": 28,
            "gender": "Female",
            "blood_group": group,
            "phone": phone,
            "city": "Bengaluru",
            "coordinates": { "lat": 12.9716, "lng": 77.5946 }
        })
    }

    fn hospital_form() -> Value {
        json!({
            "name": "City General Hospital",
            "email": "city@hospital.com",
            "phone": "1234567890",
            "location": "Downtown, Metro City",
            "password": "hunter22",
            "confirm_password": "hunter22",
            "terms_accepted": true
        })
    }

    #[tokio::test]
    async fn health_reports_version() {
        let app = test_app();
        let (status, json) = send(&app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::config::APP_VERSION);
    }

    #[tokio::test]
    async fn compatibility_lookup() {
        let app = test_app();
        let (status, json) = send(&app, "GET", "/api/compatibility/AB-", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["donors"], json!(["A-", "B-", "AB-", "O-"]));

        let (status, json) = send(&app, "GET", "/api/compatibility/Z", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["donors"], json!([]));
    }

    #[tokio::test]
    async fn eligibility_uses_server_date() {
        let app = test_app();
        let (status, json) =
            send(&app, "GET", "/api/eligibility?last_donation=2025-05-02", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["eligible"], false);
        assert_eq!(json["days_remaining"], 60);
        assert_eq!(json["next_eligible_date"], "2025-07-31");

        let (_, never) = send(&app, "GET", "/api/eligibility", None).await;
        assert_eq!(never["eligible"], true);
        assert_eq!(never["days_remaining"], 0);

        let (status, json) =
            send(&app, "GET", "/api/eligibility?last_donation=yesterday", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn validate_donor_lists_field_errors() {
        let app = test_app();
        let (status, json) = send(
            &app,
            "POST",
            "/api/validate/donor",
            Some(donor_form("R2D2", "12345", "O+")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"][0]["field"], "name");
        assert_eq!(json["errors"][1]["field"], "phone");
    }

    #[tokio::test]
    async fn donor_lifecycle() {
        let app = test_app();

        let (status, donor) = send(
            &app,
            "POST",
            "/api/donors",
            Some(donor_form("Asha Verma", "9876543210", "O-")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(donor["is_available"], true);
        assert_eq!(donor["registration_date"], "2025-06-01");
        let id = donor["id"].as_str().unwrap().to_string();

        let (status, json) = send(
            &app,
            "POST",
            "/api/donors",
            Some(donor_form("Someone Else", "9876543210", "A+")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "CONFLICT");

        let (status, record) = send(
            &app,
            "POST",
            &format!("/api/donors/{id}/donations"),
            Some(json!({ "date": "2025-05-20", "location": "Red Cross Camp" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(record["units"], 1);

        let (status, profile) = send(&app, "GET", &format!("/api/donors/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["donor"]["donation_count"], 1);
        assert_eq!(profile["eligibility"]["eligible"], false);
        assert_eq!(profile["tier"], "Bronze");
        assert_eq!(profile["history"].as_array().unwrap().len(), 1);

        let (status, updated) = send(
            &app,
            "PATCH",
            &format!("/api/donors/{id}"),
            Some(json!({ "city": "Mysuru" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["city"], "Mysuru");

        let (status, _) = send(&app, "DELETE", &format!("/api/donors/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "DELETE", &format!("/api/donors/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, stats) = send(&app, "GET", "/api/stats", None).await;
        assert_eq!(stats["total_donors"], 0);
        assert_eq!(stats["total_donations"], 0);
    }

    #[tokio::test]
    async fn invalid_registration_is_400_with_fields() {
        let app = test_app();
        let (status, json) = send(
            &app,
            "POST",
            "/api/donors",
            Some(donor_form("Asha Verma", "555", "B+")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(json["error"]["fields"][0]["field"], "phone");
    }

    #[tokio::test]
    async fn search_filters_by_recipient_and_distance() {
        let app = test_app();
        send(&app, "POST", "/api/donors", Some(donor_form("Near Donor", "9000000001", "O-"))).await;
        let mut far = donor_form("Far Donor", "9000000002", "O-");
        far["coordinates"] = json!({ "lat": 19.0760, "lng": 72.8777 });
        send(&app, "POST", "/api/donors", Some(far)).await;
        send(&app, "POST", "/api/donors", Some(donor_form("Wrong Group", "9000000003", "B+"))).await;

        let (status, hits) = send(
            &app,
            "POST",
            "/api/donors/search",
            Some(json!({
                "recipient_group": "A-",
                "reference": { "lat": 12.97, "lng": 77.59 }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let hits = hits.as_array().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["name"], "Near Donor");
        assert!(hits[0]["distance_km"].as_f64().unwrap() < 1.0);

        let (_, all) = send(&app, "POST", "/api/donors/search", Some(json!({}))).await;
        assert_eq!(all.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn request_board_and_matches() {
        let app = test_app();
        let (_, hospital) = send(&app, "POST", "/api/hospitals", Some(hospital_form())).await;
        assert_eq!(hospital["verified"], false);
        let hospital_id = hospital["id"].as_str().unwrap().to_string();

        send(&app, "POST", "/api/donors", Some(donor_form("Asha Verma", "9000000001", "O-"))).await;
        send(&app, "POST", "/api/donors", Some(donor_form("Ravi Kumar", "9000000002", "A+"))).await;

        let (status, low) = send(
            &app,
            "POST",
            "/api/requests",
            Some(json!({
                "hospital_id": hospital_id,
                "blood_group": "B-",
                "units_needed": 2,
                "urgency": "Low"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (_, critical) = send(
            &app,
            "POST",
            "/api/requests",
            Some(json!({
                "hospital_id": hospital_id,
                "blood_group": "A+",
                "units_needed": 4,
                "urgency": "Critical"
            })),
        )
        .await;

        let (status, board) = send(&app, "GET", "/api/requests", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(board[0]["id"], critical["id"]);
        assert_eq!(board[1]["id"], low["id"]);

        let critical_id = critical["id"].as_str().unwrap();
        let (status, matches) =
            send(&app, "GET", &format!("/api/requests/{critical_id}/matches"), None).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = matches
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Asha Verma", "Ravi Kumar"]);

        let (_, respond) =
            send(&app, "POST", &format!("/api/requests/{critical_id}/respond"), None).await;
        assert_eq!(respond["donors_responded"], 1);

        let (_, inventory) = send(
            &app,
            "PUT",
            &format!("/api/hospitals/{hospital_id}/inventory"),
            Some(json!({ "blood_group": "O+", "units": 40 })),
        )
        .await;
        assert_eq!(inventory["O+"], 40);

        let (_, stats) =
            send(&app, "GET", &format!("/api/hospitals/{hospital_id}/stats"), None).await;
        assert_eq!(stats["active_requests"], 2);
        assert_eq!(stats["donors_responded"], 1);
        assert_eq!(stats["units_in_stock"], 40);

        let (_, admin) = send(&app, "GET", "/api/stats", None).await;
        assert_eq!(admin["total_hospitals"], 1);
        assert_eq!(admin["active_requests"], 2);
    }

    async fn post_request(app: &Router, hospital_id: &str, group: &str, urgency: &str) -> Value {
        let (status, request) = send(
            app,
            "POST",
            "/api/requests",
            Some(json!({
                "hospital_id": hospital_id,
                "blood_group": group,
                "units_needed": 2,
                "urgency": urgency
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        request
    }

    #[tokio::test]
    async fn hospital_admin_list_verify_and_delete() {
        let app = test_app();
        let (_, city) = send(&app, "POST", "/api/hospitals", Some(hospital_form())).await;
        let mut westside = hospital_form();
        westside["name"] = json!("Westside Clinic");
        westside["location"] = json!("Harbour Road");
        let (_, clinic) = send(&app, "POST", "/api/hospitals", Some(westside)).await;
        let city_id = city["id"].as_str().unwrap().to_string();
        let clinic_id = clinic["id"].as_str().unwrap().to_string();

        let (status, all) = send(&app, "GET", "/api/hospitals", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 2);
        let (_, harbour) = send(&app, "GET", "/api/hospitals?q=harbour", None).await;
        assert_eq!(harbour.as_array().unwrap().len(), 1);
        assert_eq!(harbour[0]["id"], clinic["id"]);

        let (status, verified) =
            send(&app, "POST", &format!("/api/hospitals/{city_id}/verify"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(verified["verified"], true);
        let (_, approved) = send(&app, "GET", "/api/hospitals?verified_only=true", None).await;
        assert_eq!(approved.as_array().unwrap().len(), 1);
        assert_eq!(approved[0]["id"], city["id"]);

        post_request(&app, &city_id, "O-", "Critical").await;
        post_request(&app, &city_id, "B+", "Low").await;
        let survivor = post_request(&app, &clinic_id, "A+", "High").await;

        let (status, _) = send(&app, "DELETE", &format!("/api/hospitals/{city_id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, orphans) =
            send(&app, "GET", &format!("/api/requests?hospital_id={city_id}"), None).await;
        assert_eq!(orphans, json!([]));
        let (_, board) = send(&app, "GET", "/api/requests", None).await;
        assert_eq!(board.as_array().unwrap().len(), 1);
        assert_eq!(board[0]["id"], survivor["id"]);

        let (_, admin) = send(&app, "GET", "/api/stats", None).await;
        assert_eq!(admin["total_hospitals"], 1);
        assert_eq!(admin["active_requests"], 1);

        let (status, _) = send(&app, "DELETE", &format!("/api/hospitals/{city_id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) =
            send(&app, "POST", &format!("/api/hospitals/{city_id}/verify"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn request_edit_close_and_withdraw() {
        let app = test_app();
        let (_, hospital) = send(&app, "POST", "/api/hospitals", Some(hospital_form())).await;
        let hospital_id = hospital["id"].as_str().unwrap().to_string();
        let request = post_request(&app, &hospital_id, "AB+", "Medium").await;
        let request_id = request["id"].as_str().unwrap().to_string();
        let uri = format!("/api/requests/{request_id}");

        let (status, edited) = send(
            &app,
            "PATCH",
            &uri,
            Some(json!({ "units_needed": 6, "urgency": "High" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(edited["units_needed"], 6);
        assert_eq!(edited["urgency"], "High");
        assert_eq!(edited["blood_group"], "AB+");

        let (status, json) = send(&app, "PATCH", &uri, Some(json!({ "units_needed": 0 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");

        let (_, closed) = send(&app, "PATCH", &uri, Some(json!({ "status": "Fulfilled" }))).await;
        assert_eq!(closed["status"], "Fulfilled");
        let (status, _) = send(&app, "POST", &format!("{uri}/respond"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, board) = send(&app, "GET", "/api/requests", None).await;
        assert_eq!(board, json!([]));
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "PATCH", &uri, Some(json!({ "urgency": "Low" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn donor_admin_list_searches_name_and_phone() {
        let app = test_app();
        send(&app, "POST", "/api/donors", Some(donor_form("Asha Verma", "9000000001", "O-"))).await;
        send(&app, "POST", "/api/donors", Some(donor_form("Ravi Kumar", "9800000002", "A+"))).await;

        let (status, all) = send(&app, "GET", "/api/donors", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 2);

        let (_, by_name) = send(&app, "GET", "/api/donors?q=ravi", None).await;
        assert_eq!(by_name.as_array().unwrap().len(), 1);
        assert_eq!(by_name[0]["name"], "Ravi Kumar");

        let (_, by_phone) = send(&app, "GET", "/api/donors?q=900000", None).await;
        assert_eq!(by_phone.as_array().unwrap().len(), 1);
        assert_eq!(by_phone[0]["name"], "Asha Verma");
    }

    #[tokio::test]
    async fn malformed_id_is_400_unknown_is_404() {
        let app = test_app();
        let (status, _) = send(&app, "GET", "/api/requests/not-a-uuid/matches", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let unknown = uuid::Uuid::new_v4();
        let (status, json) =
            send(&app, "GET", &format!("/api/requests/{unknown}/matches"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = test_app();
        let req = Request::builder()
            .uri("/api/nonexistent")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
