use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use detailcrm_pages::routes;
use detailcrm_supabase::testing::FakeBackend;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const PAGES: [&str; 7] = [
    "/dashboard",
    "/board",
    "/calendar",
    "/analytics",
    "/metrics",
    "/reviews",
    "/settings",
];

fn app(backend: &Arc<FakeBackend>) -> Router {
    routes(backend.clone())
}

fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn anonymous_requests_redirect_to_login_without_queries() {
    for page in PAGES {
        let backend = Arc::new(FakeBackend::new());
        let response = app(&backend).oneshot(get(page, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{page}");
        assert_eq!(response.headers()[header::LOCATION], "/login", "{page}");
        assert!(backend.calls().is_empty(), "{page} touched the backend");
    }
}

#[tokio::test]
async fn rejected_token_redirects_without_data_queries() {
    for page in PAGES {
        let backend = Arc::new(FakeBackend::new().with_user("valid", "user-1"));
        let response = app(&backend)
            .oneshot(get(page, Some("expired")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{page}");
        assert!(backend.data_calls().is_empty(), "{page} queried data");
    }
}

#[tokio::test]
async fn failing_reads_render_empty_fallbacks() {
    let backend = Arc::new(
        FakeBackend::new()
            .with_user("t", "user-1")
            .failing("jobs")
            .failing("customers")
            .failing("pipeline_stages")
            .failing("clients")
            .failing("services")
            .failing("service_categories")
            .failing("add_ons")
            .failing("projects")
            .failing("events")
            .failing("gmb_reviews")
            .failing("calendar_settings")
            .failing("google_calendar_integrations")
            .failing("email_integrations")
            .failing("gmb_integrations"),
    );

    for page in PAGES {
        let response = app(&backend).oneshot(get(page, Some("t"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{page}");
    }

    let board = json_body(app(&backend).oneshot(get("/board", Some("t"))).await.unwrap()).await;
    assert_eq!(
        board,
        json!({"stages": [], "jobs": [], "clientStages": [], "clients": []})
    );

    let calendar =
        json_body(app(&backend).oneshot(get("/calendar", Some("t"))).await.unwrap()).await;
    assert_eq!(calendar["jobs"], json!([]));
    assert_eq!(calendar["settings"]["timezone"], "UTC");
    assert_eq!(calendar["googleCalendarConnected"], false);
}

#[tokio::test]
async fn undecodable_rows_are_skipped_individually() {
    let backend = Arc::new(
        FakeBackend::new()
            .with_user("t", "user-1")
            .with_rows(
                "projects",
                vec![json!({"no_id": true}), json!({"id": 5, "name": "Fleet"})],
            )
            .with_rows("events", vec![json!({"id": 1, "name": "page_view"})]),
    );

    let metrics = json_body(app(&backend).oneshot(get("/metrics", Some("t"))).await.unwrap()).await;
    assert_eq!(metrics["projects"].as_array().unwrap().len(), 1);
    assert_eq!(metrics["projects"][0]["id"], "5");
    assert_eq!(metrics["events"][0]["name"], "page_view");
}

#[tokio::test]
async fn board_keeps_rows_with_null_columns() {
    let backend = Arc::new(
        FakeBackend::new()
            .with_user("t", "user-1")
            .with_rows(
                "jobs",
                vec![
                    json!({
                        "id": 1,
                        "job_add_ons": [{"quantity": 1, "add_on": {"id": 1, "name": "Wax", "price": 20}}]
                    }),
                    json!({
                        "id": 2,
                        "job_add_ons": [{"quantity": 1, "add_on": {"id": 2, "name": "Clay", "price": null}}]
                    }),
                ],
            )
            .with_rows(
                "pipeline_stages",
                vec![json!({"id": 1, "name": "Booked", "position": null, "is_archived": null})],
            ),
    );

    let body = json_body(app(&backend).oneshot(get("/board", Some("t"))).await.unwrap()).await;
    let jobs = body["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[1]["jobAddOns"][0]["addOn"]["price"], Value::Null);
    assert_eq!(body["stages"][0]["name"], "Booked");
    assert_eq!(body["stages"][0]["position"], Value::Null);
    assert_eq!(body["stages"][0]["isArchived"], false);
}

#[tokio::test]
async fn dashboard_queries_upcoming_jobs_and_active_stages() {
    let backend = Arc::new(
        FakeBackend::new()
            .with_user("t", "user-1")
            .with_rows(
                "jobs",
                vec![json!({
                    "id": 7,
                    "scheduled_at": "2099-01-01T09:00:00Z",
                    "customer": {"id": 3, "name": "Sam"}
                })],
            )
            .with_rows("customers", vec![json!({"id": 3, "name": "Sam"})])
            .with_rows(
                "pipeline_stages",
                vec![json!({"id": 1, "name": "Booked", "position": 0, "kind": "job"})],
            ),
    );

    let response = app(&backend)
        .oneshot(get("/dashboard", Some("t")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["upcomingJobs"][0]["customer"]["name"], "Sam");
    assert_eq!(body["recentCustomers"][0]["id"], "3");
    assert_eq!(body["stages"][0]["name"], "Booked");

    let selects = backend.selects();
    let jobs = selects.iter().find(|q| q.table() == "jobs").unwrap();
    assert!(jobs.filter_for("scheduled_at").unwrap().starts_with("gte."));
    let stages = selects
        .iter()
        .find(|q| q.table() == "pipeline_stages")
        .unwrap();
    assert_eq!(stages.filter_for("is_archived"), Some("is.false"));
    assert_eq!(stages.filter_for("kind"), Some("eq.job"));
}

#[tokio::test]
async fn calendar_uses_stored_settings_and_connection_flag() {
    let backend = Arc::new(
        FakeBackend::new()
            .with_user("t", "user-1")
            .with_rows(
                "calendar_settings",
                vec![json!({
                    "user_id": "user-1",
                    "work_start": "07:30",
                    "work_end": "16:00",
                    "slot_minutes": 90,
                    "timezone": "America/Chicago"
                })],
            )
            .with_rows(
                "google_calendar_integrations",
                vec![json!({"id": "g1", "created_at": "2025-01-01T00:00:00Z"})],
            ),
    );

    let body = json_body(app(&backend).oneshot(get("/calendar", Some("t"))).await.unwrap()).await;
    assert_eq!(body["settings"]["slotMinutes"], 90);
    assert_eq!(body["settings"]["timezone"], "America/Chicago");
    assert_eq!(body["googleCalendarConnected"], true);

    let settings_query = backend
        .selects()
        .into_iter()
        .find(|q| q.table() == "calendar_settings")
        .unwrap();
    assert_eq!(settings_query.filter_for("user_id"), Some("eq.user-1"));
}

#[tokio::test]
async fn calendar_replaces_unknown_timezone() {
    let backend = Arc::new(
        FakeBackend::new()
            .with_user("t", "user-1")
            .with_rows("calendar_settings", vec![json!({"timezone": "Mars/Olympus"})]),
    );

    let body = json_body(app(&backend).oneshot(get("/calendar", Some("t"))).await.unwrap()).await;
    assert_eq!(body["settings"]["timezone"], "UTC");
}

#[tokio::test]
async fn settings_lists_integrations_without_tokens() {
    let backend = Arc::new(
        FakeBackend::new()
            .with_user("t", "user-1")
            .with_rows(
                "email_integrations",
                vec![json!({
                    "id": "e1",
                    "provider": "outlook",
                    "email_address": "shop@example.com",
                    "access_token": "secret-access",
                    "refresh_token": "secret-refresh"
                })],
            )
            .with_rows("gmb_integrations", vec![json!({"id": "b1"})])
            .with_rows(
                "pipeline_stages",
                vec![
                    json!({"id": 1, "name": "Booked", "position": 0}),
                    json!({"id": 2, "name": "Old", "position": 1, "is_archived": true}),
                ],
            ),
    );

    let response = app(&backend)
        .oneshot(get("/settings", Some("t")))
        .await
        .unwrap();
    let raw = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(raw.to_vec()).unwrap();
    assert!(!text.contains("secret-"));

    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["integrations"]["email"][0]["provider"], "outlook");
    assert_eq!(
        body["integrations"]["email"][0]["emailAddress"],
        "shop@example.com"
    );
    assert_eq!(body["integrations"]["gmb"][0]["provider"], "gmb");
    assert_eq!(body["integrations"]["googleCalendar"], json!([]));
    assert_eq!(body["stages"].as_array().unwrap().len(), 2);
    assert_eq!(body["calendarSettings"]["slotMinutes"], 60);

    let stage_query = backend
        .selects()
        .into_iter()
        .find(|q| q.table() == "pipeline_stages")
        .unwrap();
    assert_eq!(stage_query.filter_for("is_archived"), None);
}

#[tokio::test]
async fn analytics_includes_summary() {
    let backend = Arc::new(
        FakeBackend::new().with_user("t", "user-1").with_rows(
            "jobs",
            vec![
                json!({"id": 1, "service": {"id": 1, "name": "Wash", "price": 40}}),
                json!({"id": 2, "service": {"id": 1, "name": "Wash", "price": 40},
                       "job_add_ons": [{"add_on": {"id": 9, "name": "Wax", "price": 25}}]}),
            ],
        ),
    );

    let body =
        json_body(app(&backend).oneshot(get("/analytics", Some("t"))).await.unwrap()).await;
    assert_eq!(body["summary"]["totalJobs"], 2);
    assert_eq!(body["summary"]["serviceRevenue"], 80.0);
    assert_eq!(body["summary"]["addOnRevenue"], 25.0);
    assert_eq!(body["summary"]["jobsByService"]["Wash"], 2);
}

#[tokio::test]
async fn reviews_and_metrics_ordering() {
    let backend = Arc::new(
        FakeBackend::new().with_user("t", "user-1").with_rows(
            "gmb_reviews",
            vec![json!({"id": "r1", "reviewer_name": "Lee", "star_rating": 5})],
        ),
    );

    let body = json_body(app(&backend).oneshot(get("/reviews", Some("t"))).await.unwrap()).await;
    assert_eq!(body["reviews"][0]["reviewerName"], "Lee");
    assert_eq!(body["integrations"], json!([]));

    app(&backend)
        .oneshot(get("/metrics", Some("t")))
        .await
        .unwrap();
    let events = backend
        .selects()
        .into_iter()
        .find(|q| q.table() == "events")
        .unwrap();
    assert!(events.filter_for("created_at").unwrap().starts_with("gte."));
}
