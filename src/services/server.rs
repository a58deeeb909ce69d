use anyhow::Result;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::AppState;
use crate::api::routes::create_router;
use crate::config::AppConfig;
use crate::services::TournamentService;

pub struct ServerService {
    port: u16,
    config: AppConfig,
}

impl ServerService {
    pub fn new(port: u16, config: AppConfig) -> Self {
        Self { port, config }
    }

    pub async fn run(&self) -> Result<()> {
        let service = TournamentService::open(self.config.clone())?;
        info!(
            "Serving tournament from {} ({} teams, {} matches)",
            self.config.database_path,
            service.engine().teams().len(),
            service.engine().matches().len()
        );
        if self.config.admin_token.is_none() {
            info!("ADMIN_TOKEN is not set, every request is read-only");
        }

        let app = build_app(service, self.config.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Router with shared state and the HTTP middleware stack.
pub fn build_app(service: TournamentService, config: AppConfig) -> axum::Router {
    let state = Arc::new(AppState {
        service: Mutex::new(service),
        config,
    });

    create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
