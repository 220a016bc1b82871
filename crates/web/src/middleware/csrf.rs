//! CSRF protection for state-changing requests.
//!
//! Double-submit scheme: a random 32-byte token lives in an `HttpOnly`,
//! `Secure`, root-path cookie, and every unsafe request must echo it back in
//! the `csrf_token` form field or the `X-CSRF-Token` header.
//!
//! Pages embed a *masked* copy of the token (`pad || pad ^ token`, fresh pad
//! per request) so the value rendered into HTML changes on every response.
//! Both masked and bare tokens are accepted on submission.

use axum::{
    body::{Body, to_bytes},
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap, HeaderValue, Method, StatusCode,
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE, VARY},
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use subtle::ConstantTimeEq;
use tower_sessions::cookie::{Cookie, SameSite, time::Duration};

/// Form field carrying the token.
pub const CSRF_FORM_FIELD: &str = "csrf_token";

/// Header carrying the token (for non-form requests).
pub const CSRF_HEADER_NAME: &str = "x-csrf-token";

const TOKEN_LEN: usize = 32;

/// Largest form body buffered while looking for the token.
const MAX_FORM_BYTES: usize = 64 * 1024;

type RawToken = [u8; TOKEN_LEN];

/// Attributes of the token cookie.
#[derive(Debug, Clone)]
pub struct CsrfCookie {
    pub name: &'static str,
    pub http_only: bool,
    pub secure: bool,
    pub path: &'static str,
    pub same_site: SameSite,
    pub max_age: Duration,
}

impl Default for CsrfCookie {
    fn default() -> Self {
        Self {
            name: "csrf_token",
            http_only: true,
            secure: true,
            path: "/",
            same_site: SameSite::Lax,
            max_age: Duration::days(365),
        }
    }
}

impl CsrfCookie {
    /// Build the `Set-Cookie` cookie for an encoded token.
    fn build(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.name, value))
            .http_only(self.http_only)
            .secure(self.secure)
            .path(self.path)
            .same_site(self.same_site)
            .max_age(self.max_age)
            .build()
    }

    /// The token carried by the request's cookie, if present and well-formed.
    fn read(&self, headers: &HeaderMap) -> Option<RawToken> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == self.name)
            .and_then(|cookie| decode_raw(cookie.value()))
    }
}

/// Masked token for embedding in the current page.
#[derive(Clone, Debug)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// The value to place in the `csrf_token` hidden input.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CsrfToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_else(|| {
            tracing::warn!("CSRF token not found in request extensions - middleware may be misconfigured");
            Self(String::new())
        }))
    }
}

/// Issue, expose and validate CSRF tokens.
///
/// Safe methods pass straight through. Unsafe methods without a matching
/// token get `400 Bad Request` and the handler is never called.
pub async fn csrf_middleware(
    State(cookie): State<CsrfCookie>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = cookie.read(request.headers());
    let token = existing.unwrap_or_else(generate_raw);
    request
        .extensions_mut()
        .insert(CsrfToken(mask(&token)));

    if !is_safe_method(request.method()) {
        let method = request.method().clone();
        let path = request.uri().path().to_owned();

        let (rebuilt, submitted) = match take_submitted_token(request).await {
            Ok(found) => found,
            Err(response) => return response,
        };
        request = rebuilt;

        let valid = existing.is_some()
            && submitted
                .as_deref()
                .and_then(unmask)
                .is_some_and(|candidate| tokens_match(&candidate, &token));
        if !valid {
            tracing::warn!(
                method = %method,
                path = %path,
                cookie_present = existing.is_some(),
                "CSRF token missing or invalid"
            );
            let mut response = reject();
            if existing.is_none() {
                issue_cookie(&mut response, &cookie, &token);
            }
            return response;
        }
    }

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .append(VARY, HeaderValue::from_static("Cookie"));
    if existing.is_none() {
        issue_cookie(&mut response, &cookie, &token);
    }
    response
}

/// Hand a fresh token to a client that arrived without one.
fn issue_cookie(response: &mut Response, cookie: &CsrfCookie, token: &RawToken) {
    if let Ok(value) = HeaderValue::from_str(&cookie.build(encode(token)).to_string()) {
        response.headers_mut().append(SET_COOKIE, value);
    }
}

fn reject() -> Response {
    (StatusCode::BAD_REQUEST, "Bad Request").into_response()
}

fn is_safe_method(method: &Method) -> bool {
    [Method::GET, Method::HEAD, Method::OPTIONS, Method::TRACE].contains(method)
}

/// Find the submitted token in the header or, for urlencoded forms, the body.
///
/// The body is buffered and re-attached so the handler can still extract it.
async fn take_submitted_token(request: Request) -> Result<(Request, Option<String>), Response> {
    if let Some(header) = request
        .headers()
        .get(CSRF_HEADER_NAME)
        .and_then(|v| v.to_str().ok())
    {
        let header = header.to_owned();
        return Ok((request, Some(header)));
    }

    let is_form = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
    if !is_form {
        return Ok((request, None));
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_FORM_BYTES).await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to buffer form body for CSRF check");
        reject()
    })?;

    let submitted = url::form_urlencoded::parse(&bytes)
        .find(|(key, _)| key == CSRF_FORM_FIELD)
        .map(|(_, value)| value.into_owned());

    Ok((Request::from_parts(parts, Body::from(bytes)), submitted))
}

fn generate_raw() -> RawToken {
    let mut bytes = [0u8; TOKEN_LEN];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}

fn encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn decode_raw(value: &str) -> Option<RawToken> {
    URL_SAFE_NO_PAD.decode(value).ok()?.try_into().ok()
}

fn mask(token: &RawToken) -> String {
    let pad = generate_raw();
    let mut out = Vec::with_capacity(TOKEN_LEN * 2);
    out.extend_from_slice(&pad);
    out.extend(pad.iter().zip(token).map(|(p, t)| p ^ t));
    encode(&out)
}

/// Recover the raw token from a masked or bare submission.
fn unmask(submitted: &str) -> Option<RawToken> {
    let bytes = URL_SAFE_NO_PAD.decode(submitted.trim()).ok()?;
    if bytes.len() == TOKEN_LEN {
        return bytes.try_into().ok();
    }
    if bytes.len() != TOKEN_LEN * 2 {
        return None;
    }

    let (pad, masked) = bytes.split_at(TOKEN_LEN);
    let mut token = [0u8; TOKEN_LEN];
    for ((out, p), m) in token.iter_mut().zip(pad).zip(masked) {
        *out = p ^ m;
    }
    Some(token)
}

fn tokens_match(a: &RawToken, b: &RawToken) -> bool {
    bool::from(a.as_slice().ct_eq(b.as_slice()))
}
