//! End-to-end tests for session identity

mod common;

use common::*;
use jukebox_server::server::Claims;
use reqwest::StatusCode;
use serde_json::Value;

async fn home_user(client: &TestClient) -> Value {
    let response = client.get_home().await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats: Value = response.json().await.unwrap();
    stats["user"].clone()
}

#[tokio::test]
async fn test_no_token_is_guest() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let user = home_user(&client).await;

    assert_eq!(user["userId"], Value::Null);
    assert_eq!(user["username"], Value::Null);
    assert_eq!(user["isAdmin"], false);
}

#[tokio::test]
async fn test_valid_cookie_identifies_user() {
    let server = TestServer::spawn().await;
    let client = TestClient::with_token(server.base_url.clone(), server.user_token());

    let user = home_user(&client).await;

    assert_eq!(user["userId"], TEST_USER_ID);
    assert_eq!(user["username"], TEST_USERNAME);
    assert_eq!(user["roomId"], TEST_ROOM_ID);
}

#[tokio::test]
async fn test_invalid_cookie_is_guest() {
    let server = TestServer::spawn().await;
    let client = TestClient::with_token(server.base_url.clone(), "garbage".to_string());

    let user = home_user(&client).await;

    assert_eq!(user["userId"], Value::Null);
}

#[tokio::test]
async fn test_expired_token_is_guest() {
    let server = TestServer::spawn().await;
    let token = server.sign(&Claims {
        user_id: Some(TEST_USER_ID),
        username: Some(TEST_USERNAME.to_string()),
        name: None,
        is_admin: true,
        room_id: None,
        exp: Some(1),
    });
    let client = TestClient::with_token(server.base_url.clone(), token);

    let user = home_user(&client).await;

    assert_eq!(user["userId"], Value::Null);
    assert_eq!(user["isAdmin"], false);
}

#[tokio::test]
async fn test_routes_do_not_require_a_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    assert_eq!(client.get_library().await.status(), StatusCode::OK);
    assert_eq!(
        client
            .get_song(&server.songs.song_2.to_string())
            .await
            .status(),
        StatusCode::OK
    );
}
