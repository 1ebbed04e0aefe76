mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{get, login, send, setup_seeded_db, test_app, ADMIN_EMAIL, ADMIN_PASSWORD};

async fn create_standard_user(app: &axum::Router, admin_token: &str, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/users",
        Some(admin_token),
        Some(json!({
            "email": email,
            "password": "Password123",
            "firstName": "Grace",
            "lastName": "Hopper",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_admin_login_returns_token() {
    let app = test_app(setup_seeded_db().await);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "Admin@Example.com", "password": ADMIN_PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["tokenType"], "Bearer");
    assert_eq!(body["data"]["expiresIn"], 3600);
    assert_eq!(body["data"]["user"]["email"], ADMIN_EMAIL);
    assert_eq!(body["data"]["user"]["roles"][0]["name"], "admin");
    assert!(body["data"]["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let app = test_app(setup_seeded_db().await);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": "not-the-password" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = test_app(setup_seeded_db().await);

    let (status, body) = get(&app, "/api/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = get(&app, "/api/profile", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_crud_flow() {
    let app = test_app(setup_seeded_db().await);
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let id = create_standard_user(&app, &token, "grace@example.com").await;

    let (status, body) = get(&app, &format!("/api/users/{id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fullName"], "Grace Hopper");
    assert_eq!(body["data"]["isActive"], true);
    assert_eq!(body["data"]["roles"][0]["name"], "user");

    let (status, body) = get(&app, "/api/users?search=grace&limit=5", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["limit"], 5);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/users/{id}"),
        Some(&token),
        Some(json!({ "lastName": "Brewster", "isActive": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lastName"], "Brewster");
    assert_eq!(body["data"]["isActive"], false);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, &format!("/api/users/{id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = test_app(setup_seeded_db().await);
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&token),
        Some(json!({
            "email": "ADMIN@example.com",
            "password": "Password123",
            "firstName": "Copy",
            "lastName": "Cat",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_invalid_input_is_a_bad_request() {
    let app = test_app(setup_seeded_db().await);
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(&token),
        Some(json!({
            "email": "short@example.com",
            "password": "123",
            "firstName": "Too",
            "lastName": "Short",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&app, "/api/users/not-a-uuid", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_standard_user_lacks_admin_permissions() {
    let app = test_app(setup_seeded_db().await);
    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    create_standard_user(&app, &admin_token, "grace@example.com").await;

    let token = login(&app, "grace@example.com", "Password123").await;

    let (status, body) = get(&app, "/api/users", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Insufficient permissions: users.read required");

    let (status, _) = get(&app, "/api/roles", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = get(&app, "/api/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["permissions"], json!([]));
}

#[tokio::test]
async fn test_admin_cannot_delete_itself() {
    let app = test_app(setup_seeded_db().await);
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, profile) = get(&app, "/api/profile", Some(&token)).await;
    let id = profile["data"]["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{id}"),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You cannot delete your own account");
}

#[tokio::test]
async fn test_roles_list_includes_permissions() {
    let app = test_app(setup_seeded_db().await);
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = get(&app, "/api/roles", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    let roles = body["data"].as_array().unwrap();
    assert_eq!(roles.len(), 2);
    assert_eq!(roles[0]["name"], "admin");
    assert_eq!(roles[0]["permissions"].as_array().unwrap().len(), 9);
    assert_eq!(roles[1]["name"], "user");
}

#[tokio::test]
async fn test_profile_update_and_password_change() {
    let app = test_app(setup_seeded_db().await);
    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    create_standard_user(&app, &admin_token, "grace@example.com").await;
    let token = login(&app, "grace@example.com", "Password123").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/profile",
        Some(&token),
        Some(json!({
            "firstName": "Amazing",
            "avatar": "data:image/png;base64,iVBORw0KGgo=",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["firstName"], "Amazing");
    assert_eq!(body["data"]["avatar"], "data:image/png;base64,iVBORw0KGgo=");

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/profile/password",
        Some(&token),
        Some(json!({ "currentPassword": "wrong-password", "newPassword": "NewPassword456" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/profile/password",
        Some(&token),
        Some(json!({ "currentPassword": "Password123", "newPassword": "NewPassword456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password updated successfully");

    login(&app, "grace@example.com", "NewPassword456").await;
}

#[tokio::test]
async fn test_dashboard_stats_and_recent_activity() {
    let app = test_app(setup_seeded_db().await);
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    create_standard_user(&app, &token, "grace@example.com").await;

    let (status, body) = get(&app, "/api/dashboard/stats", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let stats = &body["data"];
    assert_eq!(stats["totalUsers"], 2);
    assert_eq!(stats["activeUsers"], 2);
    assert_eq!(stats["inactiveUsers"], 0);
    assert_eq!(stats["totalRoles"], 2);
    assert_eq!(stats["totalPermissions"], 9);
    assert_eq!(stats["newUsersThisMonth"], 2);

    let (status, body) = get(&app, "/api/dashboard/recent-activity?limit=5", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let actions: Vec<&str> = body["activities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["action"].as_str().unwrap())
        .collect();
    assert!(actions.contains(&"user.login"));
    assert!(actions.contains(&"user.created"));
    assert_eq!(body["activities"][0]["user"]["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn test_malformed_query_string_returns_envelope() {
    let app = test_app(setup_seeded_db().await);
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = get(&app, "/api/dashboard/recent-activity?limit=abc", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("limit"));

    let (status, body) = get(&app, "/api/users?page=first", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_unsupported_method_returns_envelope() {
    let app = test_app(setup_seeded_db().await);

    let (status, body) = send(&app, Method::DELETE, "/health/live", None, None).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Method not allowed");
}
