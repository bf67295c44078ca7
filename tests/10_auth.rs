mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

use storefront_api::auth::{generate_jwt, Claims};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = reqwest::get(format!("{}/health", server.base_url)).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

async fn rejection(server: &common::TestServer, authorization: Option<&str>) -> Result<(StatusCode, Value)> {
    let client = reqwest::Client::new();
    let mut req = client.get(format!("{}/inventario", server.base_url));
    if let Some(value) = authorization {
        req = req.header(reqwest::header::AUTHORIZATION, value);
    }
    let res = req.send().await?;
    let status = res.status();
    Ok((status, res.json::<Value>().await?))
}

#[tokio::test]
async fn bad_credentials_are_rejected_with_401() -> Result<()> {
    let server = common::TestServer::start().await?;

    let (status, body) = rejection(&server, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid authentication");

    let (status, body) = rejection(&server, Some(&format!("Token {}", common::admin_token()))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid authentication");

    let forged = generate_jwt(&Claims::new(common::ADMIN_ID, 1)?, "some-other-secret")?;
    let (status, body) = rejection(&server, Some(&format!("Bearer {}", forged))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid token");

    let ghost = common::token_for("ghost");
    let (status, body) = rejection(&server, Some(&format!("Bearer {}", ghost))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "user not found");
    Ok(())
}

#[tokio::test]
async fn me_returns_user_without_password() -> Result<()> {
    let server = common::TestServer::start().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/auth/me", server.base_url))
        .bearer_auth(common::admin_token())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["id"], common::ADMIN_ID);
    assert_eq!(body["role"], "admin");
    assert!(body.get("password").is_none());
    Ok(())
}
