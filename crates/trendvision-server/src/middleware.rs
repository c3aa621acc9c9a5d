use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Attach a request id to every request and echo it in `x-request-id`.
///
/// A caller-supplied `x-request-id` header is reused; otherwise a v4 UUID is
/// generated.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Extension, Router};
    use tower::ServiceExt;

    fn echo_app() -> Router {
        Router::new()
            .route(
                "/",
                get(|Extension(id): Extension<RequestId>| async move { id.0 }),
            )
            .layer(axum::middleware::from_fn(request_id))
    }

    async fn call(header: Option<&str>) -> (String, String) {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("x-request-id", value);
        }
        let response = echo_app()
            .oneshot(builder.body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let echoed = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (echoed, String::from_utf8(body.to_vec()).expect("utf8"))
    }

    #[tokio::test]
    async fn generates_uuid_when_header_absent_or_blank() {
        for header in [None, Some("   ")] {
            let (echoed, seen) = call(header).await;
            assert!(Uuid::parse_str(&echoed).is_ok(), "{echoed}");
            assert_eq!(echoed, seen);
        }
    }

    #[tokio::test]
    async fn reuses_caller_request_id() {
        let (echoed, seen) = call(Some("trace-7")).await;
        assert_eq!(echoed, "trace-7");
        assert_eq!(seen, "trace-7");
    }
}
