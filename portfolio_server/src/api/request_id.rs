//! Request ID middleware.
//!
//! Every request gets an id, either the caller's `x-request-id` or a fresh
//! UUID, which is logged at start and completion and echoed on the response
//! so client-side reports can be correlated with server logs.

use std::time::Instant;

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::info;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = extract_or_generate(&request);
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        request.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let start = Instant::now();
    info!(request_id = %request_id, %method, %path, "Request started");

    let mut response = next.run(request).await;

    info!(
        request_id = %request_id,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn extract_or_generate(request: &Request) -> String {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    #[test]
    fn reuses_an_incoming_request_id() {
        let request = Request::builder()
            .header(REQUEST_ID_HEADER, "client-supplied-id")
            .body(Body::empty())
            .unwrap();

        assert_eq!(extract_or_generate(&request), "client-supplied-id");
    }

    #[test]
    fn generates_a_uuid_when_absent_or_empty() {
        let absent = Request::builder().body(Body::empty()).unwrap();
        let generated = extract_or_generate(&absent);
        assert_eq!(generated.len(), 36);
        assert!(Uuid::parse_str(&generated).is_ok());

        let empty = Request::builder()
            .header(REQUEST_ID_HEADER, "")
            .body(Body::empty())
            .unwrap();
        assert!(Uuid::parse_str(&extract_or_generate(&empty)).is_ok());
    }
}
