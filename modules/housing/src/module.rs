use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::api::rest::auth::{build_authenticator, Authenticator};
use crate::api::rest::openapi::HousingApiDoc;
use crate::api::rest::routes;
use crate::config::HousingConfig;
use crate::contract::client::HousingApi;
use crate::domain::service::Service;
use crate::gateways::local::HousingLocalClient;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::SeaOrmHousingRepository;

/// Housing module wiring: repository, service, authenticator and REST surface.
#[derive(Clone)]
pub struct Housing {
    service: Arc<Service>,
    authenticator: Arc<dyn Authenticator>,
}

impl Housing {
    pub const NAME: &'static str = "housing";

    /// Wire the module on an already migrated connection.
    pub fn init(cfg: &HousingConfig, db: DatabaseConnection) -> anyhow::Result<Self> {
        info!("Initializing housing module");
        debug!(
            "Loaded housing config: price range {}..={}, auth mode {:?}, {} token(s)",
            cfg.min_monthly_price,
            cfg.max_monthly_price,
            cfg.auth.mode,
            cfg.auth.tokens.len()
        );
        if cfg.min_monthly_price > cfg.max_monthly_price {
            anyhow::bail!(
                "housing: min_monthly_price ({}) exceeds max_monthly_price ({})",
                cfg.min_monthly_price,
                cfg.max_monthly_price
            );
        }

        // Wire repository (infra) to domain service (port)
        let repo = SeaOrmHousingRepository::new(db);
        let service = Service::new(Arc::new(repo), cfg.service_config());
        let authenticator = build_authenticator(&cfg.auth)?;

        Ok(Self {
            service: Arc::new(service),
            authenticator,
        })
    }

    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running housing database migrations");
        Migrator::up(db, None).await?;
        info!("Housing database migrations completed successfully");
        Ok(())
    }

    pub fn register_rest(&self, router: axum::Router) -> anyhow::Result<axum::Router> {
        info!("Registering housing REST routes");
        let router = routes::register_routes(
            router,
            self.service.clone(),
            self.authenticator.clone(),
        )?;
        info!("Housing REST routes registered successfully");
        Ok(router)
    }

    /// In-process client for other modules and client sessions.
    pub fn client(&self) -> Arc<dyn HousingApi> {
        Arc::new(HousingLocalClient::new(self.service.clone()))
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn openapi() -> utoipa::openapi::OpenApi {
        HousingApiDoc::openapi()
    }
}
