mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{database_app, offline_app, register, send};

#[tokio::test]
async fn root_describes_the_service() {
    let app = offline_app();
    let (status, body) = common::get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "DevCamper API");
}

#[tokio::test]
async fn health_reports_unreachable_database() {
    let app = offline_app();
    let (status, body) = common::get(&app, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = offline_app();

    for (method, uri) in [
        (Method::GET, "/api/v1/auth/me"),
        (Method::PUT, "/api/v1/auth/updatedetails"),
        (Method::POST, "/api/v1/bootcamps"),
        (Method::DELETE, "/api/v1/courses/5d725a4a7b292f5f8ceff789"),
        (Method::POST, "/api/v1/bootcamps/5d725a037b292f5f8ceff787/reviews"),
        (Method::GET, "/api/v1/users"),
    ] {
        let (status, body) = send(&app, method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body, json!({ "success": false, "error": "Not authorized to access this route" }));
    }
}

#[tokio::test]
async fn forged_tokens_are_rejected() {
    let app = offline_app();
    let (status, _) = send(&app, Method::GET, "/api/v1/auth/me", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_validates_before_touching_the_database() {
    let app = offline_app();

    let (status, body) = send(&app, Method::POST, "/api/v1/auth/register", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please add a name, Please add an email, Please add a password");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "name": "John", "email": "john@gmail.com", "password": "123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must be at least 6 characters");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "name": "John", "email": "john@gmail.com", "password": "123456", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Role 'admin' cannot be self-assigned");
}

#[tokio::test]
async fn login_requires_both_fields() {
    let app = offline_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "john@gmail.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please provide an email and password");
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn register_login_and_me() {
    let app = database_app().await;

    let email = format!("john-{}@gmail.com", common::unique());
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "name": "John Doe", "email": email, "password": "123456", "role": "user" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().is_some());

    // Same email again
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "name": "John Again", "email": email, "password": "123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": email, "password": "123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], email.as_str());
    assert_eq!(body["data"]["role"], "user");
    assert!(body["data"].get("password").is_none());

    // Wrong password and unknown email look the same
    let (wrong_status, wrong_body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": email, "password": "654321" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "nobody@devcamper.com", "password": "654321" })),
    )
    .await;
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, unknown_status);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn update_details_and_password() {
    let app = database_app().await;
    let token = register(&app, "user").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/auth/updatedetails",
        Some(&token),
        Some(json!({ "name": "Renamed User" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Renamed User");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/auth/updatepassword",
        Some(&token),
        Some(json!({ "currentPassword": "wrong-one", "newPassword": "abcdef" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Password is incorrect");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/auth/updatepassword",
        Some(&token),
        Some(json!({ "currentPassword": "123456", "newPassword": "abcdef" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn role_gates_apply_after_authentication() {
    let app = database_app().await;
    let user_token = register(&app, "user").await;
    let publisher_token = register(&app, "publisher").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/bootcamps",
        Some(&user_token),
        Some(common::bootcamp_body("Not Allowed")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "User role 'user' is not authorized to access this route");

    let (status, _) = send(&app, Method::GET, "/api/v1/users", Some(&publisher_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
