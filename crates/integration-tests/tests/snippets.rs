//! Signup, login and snippet creation end to end.
//!
//! Requires a running server with a migrated database; see the crate docs.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use snippetbox_integration_tests::{PASSWORD, TestClient, location, unique_email};

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_create_and_view_snippet() {
    let client = TestClient::new();
    client.signed_in().await;

    let title = format!("Integration {}", rand::random::<u32>());
    let resp = client
        .submit(
            "/snippet/create",
            "/snippet/create",
            &[("title", title.as_str()), ("content", "Over the wintry forest"), ("expires", "1")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let target = location(&resp).unwrap().to_string();
    assert!(target.starts_with("/snippet/"));

    let page = client.page(&target).await;
    assert!(page.contains(&title));
    assert!(page.contains("Snippet successfully created!"));

    let home = client.page("/").await;
    assert!(home.contains(&title));
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_invalid_snippet_is_unprocessable() {
    let client = TestClient::new();
    client.signed_in().await;

    let resp = client
        .submit(
            "/snippet/create",
            "/snippet/create",
            &[("title", ""), ("content", ""), ("expires", "2")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_duplicate_signup() {
    let client = TestClient::new();
    let email = unique_email();
    let fields = [("name", "Twice"), ("email", email.as_str()), ("password", PASSWORD)];

    let first = client.submit("/user/signup", "/user/signup", &fields).await;
    assert_eq!(first.status(), StatusCode::SEE_OTHER);

    let second = client.submit("/user/signup", "/user/signup", &fields).await;
    assert_eq!(second.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(second.text().await.unwrap().contains("Address is already in use"));
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_wrong_password() {
    let client = TestClient::new();
    let email = unique_email();
    client
        .submit(
            "/user/signup",
            "/user/signup",
            &[("name", "Wrong"), ("email", email.as_str()), ("password", PASSWORD)],
        )
        .await;

    let resp = client
        .submit(
            "/user/login",
            "/user/login",
            &[("email", email.as_str()), ("password", "not the password")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.text().await.unwrap().contains("Email or Password is incorrect"));
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_logout() {
    let client = TestClient::new();
    client.signed_in().await;

    let resp = client.submit("/", "/user/logout", &[]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/"));

    let resp = client.get("/snippet/create").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_missing_snippet_is_not_found() {
    let client = TestClient::new();
    for path in ["/snippet/0", "/snippet/abc", "/snippet/2147483647"] {
        let resp = client.get(path).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
    }
}
