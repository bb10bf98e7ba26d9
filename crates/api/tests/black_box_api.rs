use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use ledgerbank_api::app::{build_router, services::AppServices};
use ledgerbank_auth::{JwtClaims, PrincipalId, Role};
use ledgerbank_core::{AccountNumber, Money};
use ledgerbank_infra::{InMemoryLedgerStore, LedgerStore};
use ledgerbank_ledger::Account;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Spawn the real router on an ephemeral port over a seeded store.
    async fn spawn(jwt_secret: &str, balances: &[(&str, i64)]) -> Self {
        let store = Arc::new(InMemoryLedgerStore::new());
        for (number, balance) in balances {
            store
                .insert_account(
                    Account::open(
                        AccountNumber::parse(number).unwrap(),
                        PrincipalId::new(),
                        Money::from_minor_units(*balance),
                    )
                    .unwrap(),
                )
                .await
                .unwrap();
        }

        let services = Arc::new(AppServices::with_store(store));
        let app = build_router(jwt_secret.to_string(), services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, account_number: &str, role: Role) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: PrincipalId::new(),
        account_number: AccountNumber::parse(account_number).unwrap(),
        role,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

const SECRET: &str = "test-secret";

#[tokio::test]
async fn auth_is_required_for_ledger_endpoints() {
    let srv = TestServer::spawn(SECRET, &[("1234567890", 0)]).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/deposit", srv.base_url))
        .json(&json!({ "account_number": "1234567890", "amount": 100 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/accounts/1234567890/balance", srv.base_url))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_is_open() {
    let srv = TestServer::spawn(SECRET, &[]).await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn deposit_returns_authoritative_balance() {
    let srv = TestServer::spawn(SECRET, &[("1234567890", 0)]).await;
    let token = mint_jwt(SECRET, "1234567890", Role::Customer);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/deposit", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "account_number": "1234567890", "amount": 100 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["balance"], 100);
    assert!(body["transaction_id"].is_string());

    let res = client
        .get(format!("{}/accounts/1234567890/balance", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["balance"], 100);
}

#[tokio::test]
async fn overdraw_is_rejected_with_insufficient_funds() {
    let srv = TestServer::spawn(SECRET, &[("1234567890", 30)]).await;
    let token = mint_jwt(SECRET, "1234567890", Role::Customer);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/withdraw", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "account_number": "1234567890", "amount": 50 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_funds");

    // Balance untouched, no log record created.
    let res = client
        .get(format!("{}/accounts/1234567890/balance", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["balance"], 30);

    let res = client
        .get(format!("{}/accounts/1234567890/transactions", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn transfer_moves_money_and_logs_correlated_legs() {
    let srv = TestServer::spawn(SECRET, &[("AAAAAAAAAA", 100), ("BBBBBBBBBB", 10)]).await;
    let sender_token = mint_jwt(SECRET, "AAAAAAAAAA", Role::Customer);
    let receiver_token = mint_jwt(SECRET, "BBBBBBBBBB", Role::Customer);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/transfer", srv.base_url))
        .bearer_auth(&sender_token)
        .json(&json!({
            "from_account": "AAAAAAAAAA",
            "to_account": "BBBBBBBBBB",
            "amount": 40
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["balance"], 60);
    let transfer_id = body["transfer_id"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/accounts/BBBBBBBBBB/balance", srv.base_url))
        .bearer_auth(&receiver_token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["balance"], 50);

    // Each side sees exactly one leg, opposite-signed, same correlation id.
    let res = client
        .get(format!("{}/accounts/AAAAAAAAAA/transactions", srv.base_url))
        .bearer_auth(&sender_token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "transfer_out");
    assert_eq!(items[0]["signed_amount"], -40);
    assert_eq!(items[0]["transfer_id"], transfer_id.as_str());

    let res = client
        .get(format!("{}/accounts/BBBBBBBBBB/transactions", srv.base_url))
        .bearer_auth(&receiver_token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "transfer_in");
    assert_eq!(items[0]["signed_amount"], 40);
    assert_eq!(items[0]["transfer_id"], transfer_id.as_str());
}

#[tokio::test]
async fn same_account_transfer_is_invalid() {
    let srv = TestServer::spawn(SECRET, &[("AAAAAAAAAA", 100)]).await;
    let token = mint_jwt(SECRET, "AAAAAAAAAA", Role::Customer);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/transfer", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "from_account": "AAAAAAAAAA",
            "to_account": "AAAAAAAAAA",
            "amount": 10
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_operation");
}

#[tokio::test]
async fn customer_is_forbidden_on_foreign_accounts() {
    let srv = TestServer::spawn(SECRET, &[("AAAAAAAAAA", 100), ("BBBBBBBBBB", 100)]).await;
    let token = mint_jwt(SECRET, "AAAAAAAAAA", Role::Customer);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/withdraw", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "account_number": "BBBBBBBBBB", "amount": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    let res = client
        .get(format!("{}/accounts/BBBBBBBBBB/transactions", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn employee_may_act_on_any_account() {
    let srv = TestServer::spawn(SECRET, &[("AAAAAAAAAA", 0)]).await;
    let token = mint_jwt(SECRET, "EMP0000001", Role::Employee);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/deposit", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "account_number": "AAAAAAAAAA", "amount": 250 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["balance"], 250);
}

#[tokio::test]
async fn malformed_payloads_are_validation_errors() {
    let srv = TestServer::spawn(SECRET, &[("1234567890", 100)]).await;
    let token = mint_jwt(SECRET, "1234567890", Role::Customer);
    let client = reqwest::Client::new();

    // Wrong account-number length.
    let res = client
        .post(format!("{}/deposit", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "account_number": "12345", "amount": 100 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("account_number"));

    // Non-positive amount.
    let res = client
        .post(format!("{}/withdraw", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "account_number": "1234567890", "amount": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Missing amount.
    let res = client
        .post(format!("{}/deposit", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "account_number": "1234567890" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_account_is_not_found_for_staff() {
    let srv = TestServer::spawn(SECRET, &[]).await;
    let token = mint_jwt(SECRET, "MGR0000001", Role::Manager);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/deposit", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "account_number": "ZZZZZZZZZZ", "amount": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}
