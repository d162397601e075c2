use detailcrm_admin::{
    bucket_spec, create_user, new_user_request, setup_storage, DEFAULT_BUCKET, DEFAULT_MAX_SIZE_MB,
};
use detailcrm_common::CrmError;
use detailcrm_config::SupabaseConfig;
use detailcrm_supabase::{BucketStatus, SupabaseClient};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn admin_client(server: &MockServer, service_role_key: Option<&str>) -> SupabaseClient {
    SupabaseClient::new(&SupabaseConfig {
        url: server.uri(),
        anon_key: "anon".to_string(),
        service_role_key: service_role_key.map(str::to_string),
    })
}

#[tokio::test]
async fn create_user_sends_confirmed_user_with_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .and(header("apikey", "service-key"))
        .and(body_partial_json(json!({
            "email": "owner@shine.example",
            "email_confirm": true,
            "user_metadata": {"full_name": "Rae Owner"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u-42",
            "email": "owner@shine.example"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = new_user_request("owner@shine.example", "s3cret-pass", Some("Rae Owner")).unwrap();
    let user = create_user(&admin_client(&server, Some("service-key")), &request)
        .await
        .unwrap();
    assert_eq!(user.id, "u-42");
}

#[tokio::test]
async fn create_user_duplicate_is_database_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "msg": "A user with this email address has already been registered"
        })))
        .mount(&server)
        .await;

    let request = new_user_request("owner@shine.example", "s3cret-pass", None).unwrap();
    let err = create_user(&admin_client(&server, Some("service-key")), &request)
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::DatabaseError(ref m) if m.contains("already been registered")));
}

#[tokio::test]
async fn setup_storage_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/storage/v1/bucket"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "job-photos", "name": "job-photos", "public": false}
        ])))
        .mount(&server)
        .await;

    let bucket = bucket_spec(DEFAULT_BUCKET, false, DEFAULT_MAX_SIZE_MB).unwrap();
    let status = setup_storage(&admin_client(&server, Some("service-key")), &bucket)
        .await
        .unwrap();
    assert_eq!(status, BucketStatus::AlreadyExists);
}

#[tokio::test]
async fn setup_storage_without_service_key_fails() {
    let server = MockServer::start().await;
    let bucket = bucket_spec("receipts", true, 5).unwrap();
    let err = setup_storage(&admin_client(&server, None), &bucket)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("SUPABASE_SERVICE_ROLE_KEY"));
}
