//! Panic recovery at the outermost edge of the middleware chain.
//!
//! A panic anywhere below this layer (in a handler, an extractor or another
//! middleware, while building or polling the response future) becomes a
//! generic `500` with `Connection: close`. The connection is dropped after
//! the response so it is never reused in a half-written state.

use std::any::Any;

use axum::{
    http::{HeaderValue, header::CONNECTION},
    response::{IntoResponse, Response},
};
use tower_http::catch_panic::CatchPanicLayer;

use super::security_headers::apply_security_headers;
use crate::error::AppError;

/// Signature of the panic-to-response conversion.
pub type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Layer that converts downstream panics into [`panic_response`].
#[must_use]
pub fn recover_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(panic_response as PanicHandler)
}

/// Report a panic payload through `AppError` and build the replacement response.
///
/// The panic unwound past the security headers middleware, so the headers are
/// re-applied here.
#[must_use]
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic_message(payload.as_ref());

    let mut response = AppError::Internal(format!("handler panicked: {message}")).into_response();
    let headers = response.headers_mut();
    headers.insert(CONNECTION, HeaderValue::from_static("close"));
    apply_security_headers(headers);
    response
}

/// Panics carry `&'static str` or `String` in practice; anything else is opaque.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        extract::Request,
        http::StatusCode,
        middleware,
        routing::get,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::middleware::security_headers::security_headers_middleware;

    async fn boom() -> &'static str {
        panic!("kaboom: db password is hunter2")
    }

    async fn boom_later() -> &'static str {
        tokio::task::yield_now().await;
        let detail = String::from("late failure");
        panic!("{detail}")
    }

    fn app() -> Router {
        Router::new()
            .route("/ok", get(|| async { "fine" }))
            .route("/boom", get(boom))
            .route("/boom-later", get(boom_later))
            .layer(middleware::from_fn(security_headers_middleware))
            .layer(recover_panic_layer())
    }

    async fn get_path(path: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = app()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_normal_path_untouched() {
        let (status, headers, body) = get_path("/ok").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "fine");
        assert!(headers.get(CONNECTION).is_none());
    }

    #[tokio::test]
    async fn test_panic_becomes_opaque_500_with_connection_close() {
        let (status, headers, body) = get_path("/boom").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(headers[CONNECTION], "close");
        assert_eq!(body, "Internal Server Error");
        assert!(!body.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_panic_after_await_is_caught() {
        let (status, headers, _) = get_path("/boom-later").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(headers[CONNECTION], "close");
    }

    #[tokio::test]
    async fn test_panic_response_keeps_security_headers() {
        let (_, headers, _) = get_path("/boom").await;
        assert_eq!(headers["x-xss-protection"], "1; mode=block");
        assert_eq!(headers["x-frame-options"], "deny");
    }

    #[test]
    fn test_panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "non-string panic payload");
    }
}
