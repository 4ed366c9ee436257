mod common;

use anyhow::Result;
use campus_token_api::auth::{issue_token, Role};
use campus_token_api::config::SecurityConfig;
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn protected_routes_require_a_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in ["/auth/me", "/users", "/profiles", "/activities"] {
        let res = client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");

        let body: Value = res.json().await?;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHORIZED");
        assert_eq!(body["error"], "Missing Authorization header");
    }
    Ok(())
}

#[tokio::test]
async fn malformed_and_forged_tokens_are_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/activities"))
        .header("Authorization", "Token abc")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(server.url("/activities"))
        .bearer_auth("not.a.jwt")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Signed with a different secret
    let other = SecurityConfig {
        jwt_secret: "someone-elses-secret".into(),
        jwt_expiry_hours: 1,
        bcrypt_cost: 4,
        enable_cors: false,
        cors_origins: vec![],
    };
    let (forged, _) = issue_token(&other, Uuid::new_v4(), "mallory", Role::Admin)?;
    let res = client
        .post(server.url("/activities"))
        .bearer_auth(forged)
        .json(&json!({ "user_id": Uuid::new_v4(), "activity_type": "CREDIT", "amount": 5, "description": "x" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn admin_only_routes_refuse_regular_users() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::user_token()?;

    let res = client.get(server.url("/users")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client.get(server.url("/profiles")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(server.url(&format!("/users/{}", Uuid::new_v4())))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(server.url("/users"))
        .bearer_auth(&token)
        .json(&json!({ "username": "eve" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "FORBIDDEN");
    Ok(())
}

#[tokio::test]
async fn users_cannot_update_other_accounts() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::user_token()?;

    let res = client
        .put(server.url(&format!("/users/{}", Uuid::new_v4())))
        .bearer_auth(&token)
        .json(&json!({ "first_name": "Mallory" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn login_validates_its_body() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.post(server.url("/auth/login")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "INVALID_JSON");

    let res = client
        .post(server.url("/auth/login"))
        .json(&json!({ "username": "ada" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field_errors"]["password"], "This field is required");
    Ok(())
}
