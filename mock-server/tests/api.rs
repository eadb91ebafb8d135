use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, ORGANIZER_TOKEN, PARTICIPANT_TOKEN};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str, token: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn booking() -> Value {
    json!({
        "title": "Rust pairing",
        "scheduledDate": "2030-05-01T10:00:00Z",
        "durationMinutes": 45,
        "participantUserId": "user-2"
    })
}

// --- auth ---

#[tokio::test]
async fn missing_token_returns_401_envelope() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/api/appointments")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn unknown_token_returns_401() {
    let resp = app()
        .oneshot(get("/api/skills", "forged"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- appointments ---

#[tokio::test]
async fn list_appointments_empty_page() {
    let resp = app()
        .oneshot(get("/api/appointments?pageNumber=1&pageSize=10", ORGANIZER_TOKEN))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["totalRecords"], 0);
    assert_eq!(body["hasNextPage"], false);
}

#[tokio::test]
async fn create_appointment_returns_201_with_end_time() {
    let resp = app()
        .oneshot(json_request("POST", "/api/appointments", ORGANIZER_TOKEN, booking()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["status"], "Pending");
    assert_eq!(body["data"]["organizerUserId"], "user-1");
    assert_eq!(body["data"]["participantName"], "Bob");
    assert_eq!(body["data"]["endTime"], "2030-05-01T10:45:00Z");
}

#[tokio::test]
async fn create_appointment_blank_title_returns_400() {
    let mut input = booking();
    input["title"] = json!("  ");
    let resp = app()
        .oneshot(json_request("POST", "/api/appointments", ORGANIZER_TOKEN, input))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "Title is required");
}

#[tokio::test]
async fn get_appointment_not_found() {
    let resp = app()
        .oneshot(get("/api/appointments/missing", ORGANIZER_TOKEN))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["message"], "Appointment not found");
}

#[tokio::test]
async fn appointment_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/appointments", ORGANIZER_TOKEN, booking()))
        .await
        .unwrap();
    let id = body_json(resp).await["data"]["id"].as_str().unwrap().to_string();

    // only the participant may respond
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/api/appointments/{id}/respond"),
            ORGANIZER_TOKEN,
            json!({"status": "Confirmed"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/api/appointments/{id}/respond"),
            PARTICIPANT_TOKEN,
            json!({"status": "Confirmed"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"], true);

    // second response conflicts
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/api/appointments/{id}/respond"),
            PARTICIPANT_TOKEN,
            json!({"status": "Cancelled"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["message"], "Appointment is not pending");

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/api/appointments/{id}/reschedule"),
            ORGANIZER_TOKEN,
            json!({"newScheduledDate": "2030-05-02T09:00:00Z", "newDurationMinutes": 30}),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"]["status"], "Rescheduled");
    assert_eq!(body["data"]["endTime"], "2030-05-02T09:30:00Z");

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/api/appointments/{id}/meeting-link"),
            PARTICIPANT_TOKEN,
            json!({}),
        ))
        .await
        .unwrap();
    let link = body_json(resp).await["data"].as_str().unwrap().to_string();
    assert!(link.ends_with(&id));

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/api/appointments/{id}/cancel"),
            PARTICIPANT_TOKEN,
            json!({"reason": "Sick"}),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"]["status"], "Cancelled");
    assert_eq!(body["data"]["cancellationReason"], "Sick");

    // filtered listing
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/appointments?status=Pending", PARTICIPANT_TOKEN))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["totalRecords"], 0);
}

// --- skills and catalog ---

#[tokio::test]
async fn skill_crud_and_favorites() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/skills",
            ORGANIZER_TOKEN,
            json!({"name": "Rust", "categoryId": "cat-programming", "isOffered": true, "tags": ["async"]}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["category"]["name"], "Programming");

    // someone else cannot edit it
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/api/skills/{id}"),
            PARTICIPANT_TOKEN,
            json!({"name": "Mine now", "categoryId": "cat-programming"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/api/skills/favorites/{id}"),
            PARTICIPANT_TOKEN,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/skills/favorites", PARTICIPANT_TOKEN))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["data"], json!([id.clone()]));

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/skills?isOffered=false", PARTICIPANT_TOKEN))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["totalRecords"], 0);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/skills/{id}"))
                .header(http::header::AUTHORIZATION, format!("Bearer {ORGANIZER_TOKEN}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/skills/favorites", PARTICIPANT_TOKEN))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["data"], json!([]));
}

#[tokio::test]
async fn duplicate_category_conflicts() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/categories",
            ORGANIZER_TOKEN,
            json!({"name": "music"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn proficiency_levels_seeded() {
    let resp = app()
        .oneshot(get("/api/proficiency-levels", ORGANIZER_TOKEN))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"][0]["rank"], 1);
}

// --- matches ---

#[tokio::test]
async fn match_request_flow() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/matches/requests",
            PARTICIPANT_TOKEN,
            json!({"targetUserId": "user-1", "skillId": "s1", "isSkillExchange": false}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = body_json(resp).await["data"]["id"].as_str().unwrap().to_string();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/matches/requests/incoming", ORGANIZER_TOKEN))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["data"][0]["id"], id.as_str());

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/api/matches/requests/{id}/accept"),
            ORGANIZER_TOKEN,
            json!({"message": "Happy to"}),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"]["status"], "Accepted");

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/api/matches/requests/{id}/reject"),
            ORGANIZER_TOKEN,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/matches", PARTICIPANT_TOKEN))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["totalRecords"], 1);
}

#[tokio::test]
async fn match_request_to_self_rejected() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/matches/requests",
            ORGANIZER_TOKEN,
            json!({"targetUserId": "user-1", "skillId": "s1"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
