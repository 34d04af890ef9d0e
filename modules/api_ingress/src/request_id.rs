//! `x-request-id` handling: generated when absent, exposed to handlers, recorded on the
//! `http_request` span and copied into every Problem Details body leaving the host.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderName, Request};
use axum::{middleware::Next, response::Response};
use problem::{Problem, APPLICATION_PROBLEM_JSON};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::request_id::{MakeRequestId, RequestId};
use tower_http::trace::{DefaultOnRequest, TraceLayer};
use tracing::{field::Empty, Span};

/// Problem bodies are small; anything larger is passed through untouched.
const PROBLEM_BODY_LIMIT: usize = 64 * 1024;

/// Request id as seen by handlers.
#[derive(Clone, Debug)]
pub struct XRequestId(pub String);

pub fn header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

#[derive(Clone, Default)]
pub struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = nanoid::nanoid!();
        Some(RequestId::new(id.parse().ok()?))
    }
}

fn request_id_of<B>(req: &Request<B>) -> &str {
    req.headers()
        .get(header())
        .and_then(|v| v.to_str().ok())
        .unwrap_or("n/a")
}

/// Stores the request id in the request extensions, records it on the current span and
/// stamps it into Problem responses so clients can quote it.
pub async fn push_req_id_to_extensions(mut req: Request<Body>, next: Next) -> Response {
    let rid = request_id_of(&req).to_owned();

    req.extensions_mut().insert(XRequestId(rid.clone()));
    Span::current().record("request_id", tracing::field::display(&rid));

    let resp = next.run(req).await;
    stamp_problem(resp, &rid).await
}

fn is_problem(resp: &Response) -> bool {
    resp.headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes() == APPLICATION_PROBLEM_JSON.as_bytes())
}

async fn stamp_problem(resp: Response, rid: &str) -> Response {
    if !is_problem(&resp) {
        return resp;
    }
    let (mut parts, body) = resp.into_parts();
    let bytes = match axum::body::to_bytes(body, PROBLEM_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Could not buffer problem body");
            return Response::from_parts(parts, Body::empty());
        }
    };

    let Ok(problem) = serde_json::from_slice::<Problem>(&bytes) else {
        return Response::from_parts(parts, Body::from(bytes));
    };
    match serde_json::to_vec(&problem.with_request_id(rid)) {
        Ok(stamped) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(stamped))
        }
        Err(_) => Response::from_parts(parts, Body::from(bytes)),
    }
}

/// `http_request` span per request; status and latency are recorded when the response is ready.
#[allow(clippy::type_complexity)]
pub fn create_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl Fn(&Request<Body>) -> Span + Clone,
    DefaultOnRequest,
    impl Fn(&Response, Duration, &Span) + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %req.method(),
                uri = %req.uri().path(),
                version = ?req.version(),
                module = "api_ingress",
                request_id = %request_id_of(req),
                status = Empty,
                latency_ms = Empty
            )
        })
        .on_response(|resp: &Response, latency: Duration, span: &Span| {
            let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
            span.record("status", resp.status().as_u16());
            span.record("latency_ms", latency_ms);
            tracing::debug!(status = resp.status().as_u16(), latency_ms, "Request finished");
        })
}
