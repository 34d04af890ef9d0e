//! RFC 9457 Problem Details shared by every HTTP-facing crate.
//!
//! Modules describe their failures once as [`ErrDef`] catalog entries and turn
//! them into [`ProblemResponse`]s at the REST boundary.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// RFC 9457 Problem Details for HTTP APIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    title = "Problem",
    description = "RFC 9457 Problem Details for HTTP APIs"
)]
pub struct Problem {
    /// URI reference identifying the problem type.
    #[serde(rename = "type")]
    pub type_url: String,
    /// Short, human-readable summary of the problem type.
    pub title: String,
    /// HTTP status code for this occurrence.
    pub status: u16,
    /// Explanation specific to this occurrence.
    pub detail: String,
    /// URI reference identifying this occurrence (usually the request path).
    #[serde(default)]
    pub instance: String,
    /// Machine-readable application error code.
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Field-level validation errors for 4xx problems.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationError>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(title = "ValidationError")]
pub struct ValidationError {
    pub detail: String,
    /// JSON Pointer to the invalid location (e.g., "/end_date").
    pub pointer: String,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_string(),
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            request_id: None,
            errors: None,
        }
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = type_url.into();
        self
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<ValidationError>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Axum response wrapper that renders `Problem` with correct status & content type.
#[derive(Debug, Clone)]
pub struct ProblemResponse(pub Problem);

impl From<Problem> for ProblemResponse {
    fn from(p: Problem) -> Self {
        Self(p)
    }
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let mut resp = axum::Json(self.0).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

/// Static error definition, one per catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    pub const fn new(
        status: u16,
        title: &'static str,
        code: &'static str,
        type_url: &'static str,
    ) -> Self {
        Self {
            status,
            title,
            code,
            type_url,
        }
    }

    #[inline]
    pub fn to_problem(&self, detail: impl Into<String>) -> Problem {
        Problem::new(
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            self.title,
            detail,
        )
        .with_code(self.code)
        .with_type(self.type_url)
    }

    /// Build the response for one occurrence, tagging it with the current span id
    /// when a request span is active. Behind `api_ingress` the tag is replaced by the
    /// request's `x-request-id`.
    pub fn respond(&self, detail: impl Into<String>, instance: &str) -> ProblemResponse {
        let problem = self.to_problem(detail).with_instance(instance);
        let problem = match tracing::Span::current().id() {
            Some(id) => problem.with_request_id(id.into_u64().to_string()),
            None => problem,
        };
        ProblemResponse(problem)
    }
}

pub fn bad_request(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(StatusCode::BAD_REQUEST, "Bad Request", detail).into()
}

pub fn unauthorized(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(StatusCode::UNAUTHORIZED, "Unauthorized", detail).into()
}

pub fn not_found(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(StatusCode::NOT_FOUND, "Not Found", detail).into()
}

pub fn internal_error(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
        detail,
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_into_response_sets_status_and_content_type() {
        let p = Problem::new(StatusCode::CONFLICT, "Conflict", "dates taken");
        let resp = ProblemResponse(p).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let ct = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        assert_eq!(ct, APPLICATION_PROBLEM_JSON);
    }

    #[test]
    fn err_def_builds_coded_problem() {
        const DEF: ErrDef = ErrDef::new(
            404,
            "Booking not found",
            "HOUSING_BOOKING_NOT_FOUND",
            "https://errors.dormease.dev/HOUSING_BOOKING_NOT_FOUND",
        );

        let resp = DEF.respond("Booking 42 was not found", "/bookings/42");
        assert_eq!(resp.0.status, 404);
        assert_eq!(resp.0.title, "Booking not found");
        assert_eq!(resp.0.code, "HOUSING_BOOKING_NOT_FOUND");
        assert_eq!(resp.0.instance, "/bookings/42");
        assert_eq!(
            resp.0.type_url,
            "https://errors.dormease.dev/HOUSING_BOOKING_NOT_FOUND"
        );
        // no span is entered in a plain unit test
        assert!(resp.0.request_id.is_none());
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let p = Problem::new(StatusCode::BAD_REQUEST, "Bad Request", "missing dates");
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["type"], "about:blank");
        assert!(v.get("request_id").is_none());
        assert!(v.get("errors").is_none());

        let p = p.with_errors(vec![ValidationError {
            detail: "must not precede start_date".to_string(),
            pointer: "/end_date".to_string(),
        }]);
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["errors"][0]["pointer"], "/end_date");
    }

    #[test]
    fn unknown_status_falls_back_to_500() {
        let mut p = Problem::new(StatusCode::BAD_REQUEST, "Bad Request", "x");
        p.status = 1000;
        assert_eq!(p.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn convenience_constructors() {
        assert_eq!(bad_request("x").0.status, 400);
        assert_eq!(unauthorized("x").0.status, 401);
        assert_eq!(not_found("x").0.title, "Not Found");
        assert_eq!(internal_error("x").0.status, 500);
    }
}
