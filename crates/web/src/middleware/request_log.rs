//! Access log middleware.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};

/// Emit one `info` event per request, then delegate.
///
/// Fields: `remote_addr` (`-` when the server was not started with connect
/// info), `version`, `method`, `uri` (path and query).
pub async fn log_request_middleware(request: Request, next: Next) -> Response {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "-".to_string(), |ConnectInfo(addr)| addr.to_string());
    let uri = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path(), |pq| pq.as_str());

    tracing::info!(
        remote_addr = %remote_addr,
        version = ?request.version(),
        method = %request.method(),
        uri = %uri,
        "request"
    );

    next.run(request).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use axum::{
        Router,
        body::Body,
        http::{Method, StatusCode},
        middleware,
        routing::{get, post},
    };
    use tower::ServiceExt;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    async fn logged_lines(request: Request) -> Vec<String> {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        app().oneshot(request).await.unwrap();

        logs.contents()
            .lines()
            .filter(|line| line.contains("request_log"))
            .map(str::to_owned)
            .collect()
    }

    fn app() -> Router {
        Router::new()
            .route("/snippet/view", get(|| async { "view" }))
            .route("/teapot", post(|| async { StatusCode::IM_A_TEAPOT }))
            .layer(middleware::from_fn(log_request_middleware))
    }

    #[tokio::test]
    async fn test_passes_request_through() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/snippet/view?id=3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_keeps_downstream_status_with_connect_info() {
        let mut request = Request::builder()
            .method(Method::POST)
            .uri("/teapot")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 7], 51234))));

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn test_logs_one_line_with_request_fields() {
        let mut request = Request::builder()
            .uri("/snippet/view?id=3")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 5555))));

        let lines = logged_lines(request).await;
        assert_eq!(lines.len(), 1, "{lines:?}");

        let line = &lines[0];
        assert!(line.contains("INFO"), "{line}");
        assert!(line.contains("remote_addr=10.0.0.1:5555"), "{line}");
        assert!(line.contains("version=HTTP/1.1"), "{line}");
        assert!(line.contains("method=GET"), "{line}");
        assert!(line.contains("uri=/snippet/view?id=3"), "{line}");
    }

    #[tokio::test]
    async fn test_logs_dash_without_connect_info() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/teapot")
            .body(Body::empty())
            .unwrap();

        let lines = logged_lines(request).await;
        assert_eq!(lines.len(), 1, "{lines:?}");
        assert!(lines[0].contains("remote_addr=-"), "{}", lines[0]);
        assert!(lines[0].contains("method=POST"), "{}", lines[0]);
    }
}
