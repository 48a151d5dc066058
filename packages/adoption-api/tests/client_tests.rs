//! Exercises the HTTP client against an in-process API stub.

use adoption_api::{AdoptionApiClient, ApiError, SignInRequest};
use axum::extract::{Json, Path};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use serde_json::{json, Value};

// ============================================================================
// Stub API
// ============================================================================

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == "secret" {
        (
            StatusCode::OK,
            Json(json!({ "token": "tok-7", "user": { "id": 7, "email": body["email"] } })),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "statusCode": 400,
                "success": false,
                "message": "Invalid email or password",
                "data": null
            })),
        )
    }
}

async fn all_pets() -> Json<Value> {
    Json(json!({
        "statusCode": 200,
        "success": true,
        "message": "ok",
        "data": { "items": [
            { "petId": 1, "petName": "Mochi", "slug": "mochi", "isVerified": true },
            { "petId": 2, "petName": "Bun", "slug": "bun", "verificationStatus": "pending_verification" },
            { "petId": 3, "petName": "Tofu", "slug": "tofu" }
        ] },
        "detailErrors": null
    }))
}

async fn self_info(Path(id): Path<String>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "Bearer tok-7")
        .unwrap_or(false);

    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Unauthorized" })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": { "userId": id.parse::<i64>().unwrap_or_default(), "fullName": "Lan Nguyen", "role": "staff" }
        })),
    )
}

async fn pet_by_id(Path(id): Path<i64>) -> Json<Value> {
    if id == 1 {
        Json(json!({ "success": true, "data": { "petId": 1, "petName": "Mochi" } }))
    } else {
        Json(json!({ "statusCode": 404, "success": false, "message": "Pet not found", "data": null }))
    }
}

async fn verify(Path(_id): Path<i64>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["isApproved"].is_boolean() {
        (StatusCode::OK, Json(json!({ "success": true, "data": null })))
    } else {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "success": false, "message": "isApproved is required" })),
        )
    }
}

async fn delete_volunteer(Path(_id): Path<i64>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

async fn spawn_api() -> String {
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/Pets", get(all_pets))
        .route("/users/self-info/:id", get(self_info))
        .route("/pets/:id", get(pet_by_id))
        .route("/pets/:id/verification", patch(verify))
        .route("/volunteer-applications/:id", delete(delete_volunteer))
        .route("/adoption-applications", get(broken));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/", addr)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_sign_in_returns_token() {
    let client = AdoptionApiClient::new(spawn_api().await);

    let auth = client
        .sign_in(&SignInRequest {
            email: "a@b.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();

    assert_eq!(auth.token, "tok-7");
    assert_eq!(auth.user.unwrap().id.as_deref(), Some("7"));
}

#[tokio::test]
async fn test_sign_in_with_wrong_password_is_client_error() {
    let client = AdoptionApiClient::new(spawn_api().await);

    let err = client
        .sign_in(&SignInRequest {
            email: "a@b.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();

    assert!(err.is_client_error());
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.message(), "Invalid email or password");
}

#[tokio::test]
async fn test_get_all_pets_unwraps_items() {
    let client = AdoptionApiClient::new(spawn_api().await);

    let pets = client.get_all_pets().await.unwrap();

    assert_eq!(pets.len(), 3);
    assert_eq!(pets[1].pet_name, "Bun");
}

#[tokio::test]
async fn test_private_endpoint_sends_bearer_token() {
    let base = spawn_api().await;

    let anonymous = AdoptionApiClient::new(base.clone());
    let err = anonymous.get_self_info("7").await.unwrap_err();
    assert!(err.is_unauthorized());

    let authed = AdoptionApiClient::new(base).with_token("tok-7");
    let profile = authed.get_self_info("7").await.unwrap();
    assert_eq!(profile.user_id, Some(7));
    assert_eq!(profile.role.as_deref(), Some("staff"));
}

#[tokio::test]
async fn test_envelope_refusal_on_ok_status() {
    let client = AdoptionApiClient::new(spawn_api().await);

    assert_eq!(client.get_pet(1).await.unwrap().pet_name, "Mochi");

    match client.get_pet(42).await {
        Err(ApiError::Rejected {
            status_code,
            message,
        }) => {
            assert_eq!(status_code, 404);
            assert_eq!(message, "Pet not found");
        }
        other => panic!("expected rejection, got {:?}", other.map(|p| p.pet_id)),
    }
}

#[tokio::test]
async fn test_unit_endpoints_accept_empty_and_enveloped_bodies() {
    let client = AdoptionApiClient::new(spawn_api().await).with_token("tok-7");

    client.verify_pet(2, true).await.unwrap();
    client.delete_volunteer_application(5).await.unwrap();
}

#[tokio::test]
async fn test_server_error_keeps_raw_body() {
    let client = AdoptionApiClient::new(spawn_api().await);

    let err = client.list_adoption_applications().await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(!err.is_client_error());
    assert_eq!(err.message(), "upstream exploded");
}
