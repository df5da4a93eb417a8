//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the forwarding fallback
//! - Wire up middleware (request ID, trace, timeout, gatekeeper)
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::any, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use url::Url;

use crate::config::GatekeeperConfig;
use crate::gate::{GateError, Gatekeeper};
use crate::http::middleware::{gatekeeper_middleware, GateState};
use crate::http::upstream::{forward_handler, Upstream, UpstreamError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("invalid public origin '{0}'")]
    InvalidOrigin(String),
}

/// HTTP server hosting the gatekeeper in front of the upstream application.
pub struct HttpServer {
    router: Router,
    config: GatekeeperConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatekeeperConfig) -> Result<Self, ServerError> {
        let gatekeeper = Arc::new(Gatekeeper::from_config(&config)?);
        Self::with_gatekeeper(config, gatekeeper)
    }

    /// Create a server around an already built gatekeeper.
    pub fn with_gatekeeper(config: GatekeeperConfig, gatekeeper: Arc<Gatekeeper>) -> Result<Self, ServerError> {
        let public_origin = match &config.server.public_origin {
            Some(origin) => Some(
                Url::parse(origin).map_err(|_| ServerError::InvalidOrigin(origin.clone()))?,
            ),
            None => None,
        };

        let gate_state = GateState::new(
            gatekeeper,
            public_origin,
            config.server.excluded_prefixes.clone(),
        );
        let upstream = Upstream::new(&config.upstream)?;

        let router = Self::build_router(&config, gate_state, upstream);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatekeeperConfig, gate_state: GateState, upstream: Upstream) -> Router {
        Router::new()
            .route("/", any(forward_handler))
            .route("/{*path}", any(forward_handler))
            .with_state(upstream)
            .layer(middleware::from_fn_with_state(gate_state, gatekeeper_middleware))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::with_status_code(
                        StatusCode::REQUEST_TIMEOUT,
                        Duration::from_secs(config.server.request_timeout_secs),
                    )),
            )
    }

    /// The assembled router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatekeeperConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_public_origin() {
        let mut config = GatekeeperConfig::default();
        config.session.token.secret = "s".into();
        config.server.public_origin = Some("::not a url::".into());
        assert!(matches!(
            HttpServer::new(config),
            Err(ServerError::InvalidOrigin(_))
        ));
    }

    #[test]
    fn test_bad_pattern_fails() {
        let mut config = GatekeeperConfig::default();
        config.routes.public = vec!["relative/*".into()];
        assert!(matches!(HttpServer::new(config), Err(ServerError::Gate(_))));
    }
}
