//! API integration tests
//!
//! Run against a live server with a migrated database:
//! `cargo test --test api_tests -- --ignored`

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:3000";

struct TestUser {
    id: i64,
    token: String,
}

/// Register a fresh user and return its id and token
async fn register(client: &Client, prefix: &str) -> TestUser {
    let suffix = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default() % 1_000_000_000;
    let username = format!("{}_{}", prefix, suffix);

    let response = client
        .post(format!("{}/api/auth/register", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "secret123",
            "full_name": "Test User"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse register response");
    TestUser {
        id: body["user"]["user_id"].as_i64().expect("No user id in response"),
        token: body["token"].as_str().expect("No token in response").to_string(),
    }
}

async fn create_book(client: &Client, owner: &TestUser, title: &str) -> i64 {
    let response = client
        .post(format!("{}/api/books", BASE_URL))
        .bearer_auth(&owner.token)
        .json(&json!({
            "title": title,
            "author": "Jorge Amado",
            "isbn": "978-85-359-0277-1",
            "condition": "usado - bom",
            "exchange_available": true,
            "loan_available": true
        }))
        .send()
        .await
        .expect("Failed to send create book request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse book");
    assert_eq!(body["isbn"], "9788535902771");
    assert_eq!(body["available"], true);
    body["book_id"].as_i64().expect("No book id")
}

async fn request_loan(client: &Client, requester: &TestUser, book_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/api/transactions", BASE_URL))
        .bearer_auth(&requester.token)
        .json(&json!({
            "book_id": book_id,
            "transaction_type": "emprestimo",
            "request_message": "Posso pegar emprestado?"
        }))
        .send()
        .await
        .expect("Failed to send transaction request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let user = register(&client, "login").await;
    assert!(user.id > 0);

    let response = client
        .post(format!("{}/api/auth/login", BASE_URL))
        .json(&json!({
            "email": "nobody@example.com",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
#[ignore]
async fn test_loan_lifecycle() {
    let client = Client::new();
    let requester = register(&client, "req").await;
    let owner = register(&client, "own").await;
    let outsider = register(&client, "out").await;

    let book_id = create_book(&client, &owner, "Capitães da Areia").await;

    // Owner cannot request their own book
    let response = request_loan(&client, &owner, book_id).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Requester opens a pending loan request
    let response = request_loan(&client, &requester, book_id).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let transaction: Value = response.json().await.unwrap();
    assert_eq!(transaction["status"], "pendente");
    assert_eq!(transaction["owner_id"].as_i64(), Some(owner.id));
    let transaction_id = transaction["transaction_id"].as_i64().unwrap();

    // A second pending request for the same book conflicts
    let response = request_loan(&client, &requester, book_id).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Owner was notified
    let response = client
        .get(format!("{}/api/notifications?is_read=false", BASE_URL))
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap();
    let notifications: Value = response.json().await.unwrap();
    assert!(notifications
        .as_array()
        .unwrap()
        .iter()
        .any(|n| n["related_id"].as_i64() == Some(transaction_id)));

    // Requester cannot accept
    let response = client
        .put(format!("{}/api/transactions/{}/accept", BASE_URL, transaction_id))
        .bearer_auth(&requester.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Owner accepts
    let response = client
        .put(format!("{}/api/transactions/{}/accept", BASE_URL, transaction_id))
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let accepted: Value = response.json().await.unwrap();
    assert_eq!(accepted["status"], "aceito");

    // Accepted requests can no longer be cancelled or decided again
    let response = client
        .delete(format!("{}/api/transactions/{}", BASE_URL, transaction_id))
        .bearer_auth(&requester.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .put(format!("{}/api/transactions/{}/reject", BASE_URL, transaction_id))
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Only participants can see it
    let response = client
        .get(format!("{}/api/transactions/{}", BASE_URL, transaction_id))
        .bearer_auth(&outsider.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .get(format!("{}/api/transactions/{}", BASE_URL, transaction_id))
        .bearer_auth(&requester.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let details: Value = response.json().await.unwrap();
    assert_eq!(details["book_title"], "Capitães da Areia");

    // Status filter narrows the list
    let response = client
        .get(format!("{}/api/transactions?status=recusado", BASE_URL))
        .bearer_auth(&requester.token)
        .send()
        .await
        .unwrap();
    let list: Value = response.json().await.unwrap();
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn test_cancel_pending_request() {
    let client = Client::new();
    let requester = register(&client, "creq").await;
    let owner = register(&client, "cown").await;
    let book_id = create_book(&client, &owner, "Mar Morto").await;

    let response = request_loan(&client, &requester, book_id).await;
    let transaction: Value = response.json().await.unwrap();
    let transaction_id = transaction["transaction_id"].as_i64().unwrap();

    // Owner cannot cancel on the requester's behalf
    let response = client
        .delete(format!("{}/api/transactions/{}", BASE_URL, transaction_id))
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .delete(format!("{}/api/transactions/{}", BASE_URL, transaction_id))
        .bearer_auth(&requester.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Second cancel finds nothing
    let response = client
        .delete(format!("{}/api/transactions/{}", BASE_URL, transaction_id))
        .bearer_auth(&requester.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // A new request is possible again
    let response = request_loan(&client, &requester, book_id).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
#[ignore]
async fn test_book_ownership() {
    let client = Client::new();
    let owner = register(&client, "bown").await;
    let other = register(&client, "both").await;
    let book_id = create_book(&client, &owner, "Gabriela").await;

    let response = client
        .delete(format!("{}/api/books/{}", BASE_URL, book_id))
        .bearer_auth(&other.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .get(format!("{}/api/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap();
    let book: Value = response.json().await.unwrap();
    assert!(book["owner_name"].as_str().unwrap().starts_with("bown_"));

    let response = client
        .delete(format!("{}/api/books/{}", BASE_URL, book_id))
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/api/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_message_soft_delete() {
    let client = Client::new();
    let alice = register(&client, "malice").await;
    let bob = register(&client, "mbob").await;

    let response = client
        .post(format!("{}/api/messages", BASE_URL))
        .bearer_auth(&alice.token)
        .json(&json!({ "receiver_id": bob.id, "content": "Oi, ainda tem o livro?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let message: Value = response.json().await.unwrap();
    let message_id = message["message_id"].as_i64().unwrap();

    let response = client
        .delete(format!("{}/api/messages/{}", BASE_URL, message_id))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Hidden for the sender, still visible to the receiver
    let thread: Value = client
        .get(format!("{}/api/messages/conversation/{}", BASE_URL, bob.id))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(thread.as_array().unwrap().is_empty());

    let thread: Value = client
        .get(format!("{}/api/messages/conversation/{}", BASE_URL, alice.id))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(thread.as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_change_password() {
    let client = Client::new();
    let user = register(&client, "pwd").await;

    let response = client
        .put(format!("{}/api/auth/change-password", BASE_URL))
        .bearer_auth(&user.token)
        .json(&json!({ "old_password": "secret123", "new_password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .put(format!("{}/api/auth/change-password", BASE_URL))
        .bearer_auth(&user.token)
        .json(&json!({ "old_password": "wrong123", "new_password": "newpass456" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .put(format!("{}/api/auth/change-password", BASE_URL))
        .bearer_auth(&user.token)
        .json(&json!({ "old_password": "secret123", "new_password": "newpass456" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_token_of_deleted_account() {
    let client = Client::new();
    let owner = register(&client, "sown").await;
    let book_id = create_book(&client, &owner, "Tenda dos Milagres").await;
    let user = register(&client, "stale").await;

    let response = client
        .delete(format!("{}/api/auth/profile", BASE_URL))
        .bearer_auth(&user.token)
        .json(&json!({ "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The token is still within its lifetime, but writes are refused cleanly
    let response = client
        .post(format!("{}/api/books", BASE_URL))
        .bearer_auth(&user.token)
        .json(&json!({
            "title": "Jubiabá",
            "author": "Jorge Amado",
            "condition": "novo",
            "exchange_available": true,
            "loan_available": false
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "NotAuthenticated");

    let response = request_loan(&client, &user, book_id).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
