//! Integration tests for Snippetbox.
//!
//! Every test talks HTTP to an already running server and is `#[ignore]`d
//! by default.
//!
//! # Running Tests
//!
//! ```bash
//! sb-cli migrate
//! cargo run -p snippetbox-web &
//! SNIPPETBOX_TEST_URL=https://localhost:4000 cargo test -p snippetbox-integration-tests -- --ignored
//! ```
//!
//! The CSRF cookie is always `Secure`, so the server must be reached over
//! HTTPS (a self-signed certificate is accepted).

use reqwest::{Client, Response, StatusCode, header::LOCATION, redirect::Policy};

/// Password long enough for the signup rules.
pub const PASSWORD: &str = "correct horse battery";

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("SNIPPETBOX_TEST_URL").unwrap_or_else(|_| "https://localhost:4000".to_string())
}

/// An address nobody has signed up with yet.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{:016x}@example.com", rand::random::<u64>())
}

/// Cookie-keeping client that does not follow redirects.
pub struct TestClient {
    pub client: Client,
    pub base_url: String,
}

impl TestClient {
    /// Build a client against [`base_url`].
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(true)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url(),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path`.
    ///
    /// # Panics
    ///
    /// Panics if the request fails at the transport level.
    #[allow(clippy::expect_used)]
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// GET `path` and return its body.
    ///
    /// # Panics
    ///
    /// Panics if the request or body read fails.
    #[allow(clippy::expect_used)]
    pub async fn page(&self, path: &str) -> String {
        self.get(path).await.text().await.expect("Failed to read body")
    }

    /// Load `form_page`, then POST `fields` plus the page's CSRF token to `action`.
    ///
    /// # Panics
    ///
    /// Panics if the form page has no CSRF field or a request fails.
    #[allow(clippy::expect_used)]
    pub async fn submit(&self, form_page: &str, action: &str, fields: &[(&str, &str)]) -> Response {
        let body = self.page(form_page).await;
        let token = csrf_field(&body).expect("form page has no csrf_token field");

        let mut fields = fields.to_vec();
        fields.push(("csrf_token", token.as_str()));
        self.client
            .post(self.url(action))
            .form(&fields)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Sign up and log in a fresh user; returns the email used.
    ///
    /// # Panics
    ///
    /// Panics if either step is not answered with `303 See Other`.
    pub async fn signed_in(&self) -> String {
        let email = unique_email();
        let signup = self
            .submit(
                "/user/signup",
                "/user/signup",
                &[("name", "Integration"), ("email", email.as_str()), ("password", PASSWORD)],
            )
            .await;
        assert_eq!(signup.status(), StatusCode::SEE_OTHER);

        let login = self
            .submit(
                "/user/login",
                "/user/login",
                &[("email", email.as_str()), ("password", PASSWORD)],
            )
            .await;
        assert_eq!(login.status(), StatusCode::SEE_OTHER);
        email
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

/// The `Location` header of a redirect, if any.
#[must_use]
pub fn location(response: &Response) -> Option<&str> {
    response.headers().get(LOCATION)?.to_str().ok()
}

/// Value of the first `csrf_token` hidden input in `html`.
#[must_use]
pub fn csrf_field(html: &str) -> Option<String> {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker)? + marker.len();
    let rest = html.get(start..)?;
    let end = rest.find('"')?;
    rest.get(..end).map(str::to_string)
}
