use axum::{
    http::{StatusCode, Uri},
    response::{Html, Json},
};
use serde_json::{json, Value};

use problem::{Problem, ProblemResponse};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn serve_docs() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>DormEase API Docs</title>
  <script src="https://unpkg.com/@stoplight/elements@latest/web-components.min.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@latest/styles.min.css">
</head>
<body>
  <elements-api apiDescriptionUrl="/openapi.json" router="hash" layout="sidebar"></elements-api>
</body>
</html>"#,
    )
}

/// Fallback for unmatched routes.
pub async fn route_not_found(uri: Uri) -> ProblemResponse {
    Problem::new(
        StatusCode::NOT_FOUND,
        "Not Found",
        format!("No route for {}", uri.path()),
    )
    .with_code("ROUTE_NOT_FOUND")
    .with_instance(uri.path())
    .into()
}
