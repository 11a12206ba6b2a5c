mod common;

use anyhow::Result;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::{ADMIN_KEY, test_state};
use retail_bank_server::app;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    key: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {key}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

fn registration(username: &str, deposit: &str) -> Value {
    json!({
        "username": username,
        "first_name": "Test",
        "last_name": username,
        "email": format!("{username}@example.com"),
        "phone": "9876543210",
        "address": "12 MG Road",
        "city": "Pune",
        "state": "MH",
        "pincode": "411001",
        "initial_deposit": deposit
    })
}

/// Register through the API, approve as admin, return (customer key, account number).
async fn approved_customer(app: &Router, username: &str, deposit: &str) -> Result<(String, String)> {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/register",
        None,
        Some(registration(username, deposit)),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let id = body["customer"]["id"].as_str().unwrap_or_default().to_string();
    let (status, _) = send(
        app,
        "POST",
        &format!("/api/v1/admin/customers/{id}/approve"),
        Some(ADMIN_KEY),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    Ok((
        body["api_key"].as_str().unwrap_or_default().to_string(),
        body["account"]["account_number"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
    ))
}

#[tokio::test]
async fn test_health_check() -> Result<()> {
    let app = app::router(test_state());

    let (status, body) = send(&app, "GET", "/health", None, None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    Ok(())
}

#[tokio::test]
async fn test_register_returns_key_and_account() -> Result<()> {
    let app = app::router(test_state());

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/register",
        None,
        Some(registration("asha", "1000.00")),
    )
    .await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["customer"]["is_approved"], false);
    assert_eq!(body["account"]["balance"], "1000.00");
    assert_eq!(body["account"]["account_type"], "Saving");
    assert_eq!(body["api_key"].as_str().map(str::len), Some(64));
    assert!(body["customer"].get("api_key_hash").is_none());

    Ok(())
}

#[tokio::test]
async fn test_missing_or_unknown_key_is_unauthorized() -> Result<()> {
    let app = app::router(test_state());

    let (status, body) = send(&app, "GET", "/api/v1/dashboard", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "invalid_api_key");

    let (status, _) = send(&app, "GET", "/api/v1/dashboard", Some("nope"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_customer_cannot_use_admin_routes() -> Result<()> {
    let app = app::router(test_state());
    let (key, _) = approved_customer(&app, "asha", "1000.00").await?;

    let (status, body) = send(&app, "GET", "/api/v1/admin/reports", Some(&key), None).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "forbidden");
    Ok(())
}

#[tokio::test]
async fn test_unapproved_customer_gets_forbidden_on_deposit() -> Result<()> {
    let app = app::router(test_state());
    let (_, body) = send(
        &app,
        "POST",
        "/api/v1/register",
        None,
        Some(registration("asha", "1000.00")),
    )
    .await?;
    let key = body["api_key"].as_str().unwrap_or_default().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/deposit",
        Some(&key),
        Some(json!({ "amount": "10.00" })),
    )
    .await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "unapproved_account");
    Ok(())
}

#[tokio::test]
async fn test_deposit_withdraw_and_transfer_over_http() -> Result<()> {
    let app = app::router(test_state());
    let (asha, _) = approved_customer(&app, "asha", "1000.00").await?;
    let (_, ravi_number) = approved_customer(&app, "ravi", "500.00").await?;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/deposit",
        Some(&asha),
        Some(json!({ "amount": "250.50" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "1250.50");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/withdraw",
        Some(&asha),
        Some(json!({ "amount": "2000.00" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "insufficient_funds");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/transfer",
        Some(&asha),
        Some(json!({ "to_account_number": ravi_number, "amount": "300.00" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "950.50");
    let sent_id = body["transaction_ids"][0].as_str().unwrap_or_default().to_string();

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/transactions/{sent_id}"),
        Some(&asha),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction_type"], "Transfer");
    assert_eq!(body["amount"], "300.00");

    let (status, body) = send(&app, "GET", "/api/v1/transactions", Some(&asha), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);

    Ok(())
}

#[tokio::test]
async fn test_transfer_errors_over_http() -> Result<()> {
    let app = app::router(test_state());
    let (asha, asha_number) = approved_customer(&app, "asha", "1000.00").await?;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/transfer",
        Some(&asha),
        Some(json!({ "to_account_number": asha_number, "amount": "1.00" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "self_transfer");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/transfer",
        Some(&asha),
        Some(json!({ "to_account_number": "000000000000", "amount": "1.00" })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "recipient_not_found");

    Ok(())
}

#[tokio::test]
async fn test_admin_reports_and_customer_listing() -> Result<()> {
    let app = app::router(test_state());
    approved_customer(&app, "asha", "1000.00").await?;
    approved_customer(&app, "ravi", "500.00").await?;

    let (status, body) = send(&app, "GET", "/api/v1/admin/reports", Some(ADMIN_KEY), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_deposits"], "1500.00");
    assert_eq!(body["active_accounts"], 2);

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/admin/customers?search=ravi",
        Some(ADMIN_KEY),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["username"], "ravi");

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/admin/transactions",
        Some(ADMIN_KEY),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["description"], "Initial deposit");
    assert_eq!(body["items"][0]["account_number"].as_str().map(str::len), Some(12));
    assert!(body["items"][0]["counterpart_account_number"].is_null());

    Ok(())
}

#[tokio::test]
async fn test_admin_has_no_customer_account() -> Result<()> {
    let app = app::router(test_state());

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/deposit",
        Some(ADMIN_KEY),
        Some(json!({ "amount": "10.00" })),
    )
    .await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}
