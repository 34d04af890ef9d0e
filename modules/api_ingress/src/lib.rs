//! HTTP host: owns the listener, the global middleware stack, health and
//! documentation endpoints. Feature modules contribute their routes as a
//! plain [`Router`] and their OpenAPI fragments as utoipa documents.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    http::header,
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod openapi;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

pub struct ApiIngress {
    config: ApiIngressConfig,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Wraps module routes with the host endpoints and middleware.
    ///
    /// `openapi` is served at `/openapi.json` (with `/docs`) only when docs are enabled.
    pub fn build_router(
        &self,
        routes: Router,
        openapi: Option<utoipa::openapi::OpenApi>,
    ) -> Result<Router> {
        tracing::debug!("Building HTTP router");
        let mut router = routes.route("/health", get(web::health_check));

        if self.config.enable_docs {
            let doc = openapi.unwrap_or_else(|| openapi::build_document([]));
            let op_count = doc
                .paths
                .paths
                .values()
                .map(|item| {
                    [
                        &item.get,
                        &item.put,
                        &item.post,
                        &item.delete,
                        &item.patch,
                    ]
                    .into_iter()
                    .filter(|op| op.is_some())
                    .count()
                })
                .sum::<usize>();
            tracing::info!("Emitting OpenAPI document with {op_count} operations");

            // Serialized once; handlers clone the value
            let doc_value = Arc::new(serde_json::to_value(&doc)?);
            router = router
                .route(
                    "/openapi.json",
                    get(move || {
                        let v = doc_value.clone();
                        async move {
                            ([(header::CACHE_CONTROL, "no-store")], Json((*v).clone()))
                                .into_response()
                        }
                    }),
                )
                .route("/docs", get(web::serve_docs));
        }

        router = router.fallback(web::route_not_found);

        // Outermost to innermost:
        // SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions -> Timeout -> CORS -> BodyLimit
        // (the last `.layer` call wraps everything before it)
        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));

        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        let x_request_id = request_id::header();
        router = router
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.request_timeout_secs,
            )))
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(request_id::create_trace_layer())
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        Ok(router)
    }

    /// Binds `addr` and serves until `shutdown` resolves.
    pub async fn serve<F>(&self, router: Router, addr: SocketAddr, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server bound on {}", listener.local_addr()?);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("HTTP server shutting down gracefully");
            })
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}
