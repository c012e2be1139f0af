use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_from_env;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::auth::AuthConfig;
use service::identity::Hs256IdentityVerifier;
use service::payments::gateway::{PaymentGateway, RazorpayGateway};
use service::repository::Repositories;
use service::teams::TeamPolicy;
use service::Services;

use crate::errors::StartupError;
use crate::metrics;
use crate::routes::{self, auth::ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire services and router from an already validated configuration.
pub fn build_app(cfg: &configs::AppConfig, repos: Repositories, gateway: Arc<dyn PaymentGateway>) -> Router {
    let services = Services::new(repos, AuthConfig::from_app(cfg), TeamPolicy::from(&cfg.teams), gateway);
    let state = ServerState {
        services,
        identity: Arc::new(Hs256IdentityVerifier::from_config(&cfg.auth)),
        cookie_secure: cfg.auth.cookie_secure,
        debug_routes: cfg.admin.debug_routes,
    };
    routes::build_router(state, build_cors())
}

fn bind_addr(cfg: &configs::ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address {}:{}: {e}", cfg.host, cfg.port)))
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = configs::AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    common::env::ensure_env("frontend").await?;

    // DB connection + schema
    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Database(format!("migrations: {e}")))?;

    if cfg.payment.key_id.is_empty() || cfg.payment.key_secret.is_empty() {
        warn!("payment keys not configured; order creation will fail");
    }
    let gateway: Arc<dyn PaymentGateway> = Arc::new(RazorpayGateway::new(&cfg.payment));

    metrics::init();
    let app = build_app(&cfg, Repositories::seaorm(db), gateway);

    // Bind and serve
    let addr = bind_addr(&cfg.server)?;
    info!(%addr, debug_routes = cfg.admin.debug_routes, "starting server crate");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
