//! Request extractors that reject with Problem Details instead of axum's plain-text bodies.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use problem::{ProblemResponse, ValidationError};
use serde::de::DeserializeOwned;

use crate::api::rest::error::catalog;

/// JSON request body; malformed or incomplete bodies become 400 `HOUSING_VALIDATION`.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let instance = req.uri().path().to_string();
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(&rejection, &instance)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PathParam<T>(pub T);

impl<T, S> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(path_rejection(&rejection, parts.uri.path())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(query_rejection(&rejection, parts.uri.path())),
        }
    }
}

fn json_rejection(rejection: &JsonRejection, instance: &str) -> ProblemResponse {
    tracing::debug!(error = %rejection, "Rejecting request body");
    validation_problem(rejection.body_text(), instance)
}

fn path_rejection(rejection: &PathRejection, instance: &str) -> ProblemResponse {
    tracing::debug!(error = %rejection, "Rejecting path parameters");
    validation_problem(rejection.body_text(), instance)
}

fn query_rejection(rejection: &QueryRejection, instance: &str) -> ProblemResponse {
    tracing::debug!(error = %rejection, "Rejecting query string");
    validation_problem(rejection.body_text(), instance)
}

fn validation_problem(detail: String, instance: &str) -> ProblemResponse {
    let mut resp = catalog::VALIDATION.respond(detail.clone(), instance);
    if let Some(pointer) = pointer_from_message(&detail) {
        resp.0 = resp.0.with_errors(vec![ValidationError { detail, pointer }]);
    }
    resp
}

/// JSON Pointer for the offending field of a serde error, e.g.
/// "...target type: missing field `total_price` at line 1" -> "/total_price"
/// "...target type: address.city: invalid type" -> "/address/city"
fn pointer_from_message(msg: &str) -> Option<String> {
    let msg = msg
        .split_once("target type: ")
        .map_or(msg, |(_, rest)| rest);

    let is_path = |p: &str| {
        !p.is_empty()
            && p.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'))
    };
    let (path, rest) = match msg.split_once(": ") {
        Some((p, r)) if is_path(p) => (p, r),
        _ => ("", msg),
    };

    let mut segments: Vec<String> = path
        .split('.')
        .filter(|s| !s.is_empty())
        .map(|s| s.replace('[', "/").replace(']', ""))
        .collect();
    if let Some(field) = rest
        .strip_prefix("missing field `")
        .and_then(|r| r.split('`').next())
    {
        segments.push(field.to_string());
    }

    if segments.is_empty() {
        None
    } else {
        Some(format!("/{}", segments.join("/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_top_level_field() {
        let msg = "Failed to deserialize the JSON body into the target type: \
                   missing field `total_price` at line 1 column 70";
        assert_eq!(pointer_from_message(msg).as_deref(), Some("/total_price"));
    }

    #[test]
    fn nested_type_error() {
        let msg = "Failed to deserialize the JSON body into the target type: \
                   address.city: invalid type: integer `5`, expected a string at line 1 column 30";
        assert_eq!(pointer_from_message(msg).as_deref(), Some("/address/city"));
    }

    #[test]
    fn array_element() {
        let msg = "Failed to deserialize the JSON body into the target type: \
                   images[1]: invalid type: null, expected a string";
        assert_eq!(pointer_from_message(msg).as_deref(), Some("/images/1"));
    }

    #[test]
    fn syntax_errors_have_no_pointer() {
        let msg = "Failed to parse the request body as JSON: EOF while parsing an object";
        assert_eq!(pointer_from_message(msg), None);
        assert_eq!(
            pointer_from_message("Expected request with `Content-Type: application/json`"),
            None
        );
    }
}
