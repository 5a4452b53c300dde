pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::registry::Registry;

/// Build the HTTP routes for every table in the registry.
///
/// Each table `T` gets `/T/add`, `/T/del`, `/T/save` (POST) and `/T/get` (GET).
/// Any other method on those paths answers 405, any other path 404.
pub fn router(registry: &Registry, max_body_bytes: usize) -> Router {
    let mut app = Router::new();
    for (name, store) in registry.iter() {
        let table = Router::new()
            .route(
                "/add",
                post(handlers::add).fallback(handlers::method_not_allowed),
            )
            .route(
                "/del",
                post(handlers::del).fallback(handlers::method_not_allowed),
            )
            .route(
                "/get",
                get(handlers::get).fallback(handlers::method_not_allowed),
            )
            .route(
                "/save",
                post(handlers::save).fallback(handlers::method_not_allowed),
            )
            .with_state(Arc::clone(store));
        app = app.nest(&format!("/{}", name), table);
    }

    app.fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}

/// HTTP server
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    router: Router,
    registry: Registry,
    save_on_shutdown: bool,
}

impl Server {
    /// Bind to the configured address and route requests to the registry's tables
    pub async fn bind(config: &Config, registry: Registry) -> std::io::Result<Self> {
        let listener = TcpListener::bind(&config.server_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("HTTP server bound to {}", local_addr);

        let router = router(&registry, config.max_body_bytes);

        Ok(Self {
            listener,
            local_addr,
            router,
            registry,
            save_on_shutdown: config.save_on_shutdown,
        })
    }

    /// Get local listening address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until Ctrl-C or SIGTERM, then optionally save every table
    pub async fn run(self) -> std::io::Result<()> {
        info!("Server started, listening on {}", self.local_addr);
        for (name, store) in self.registry.iter() {
            info!(
                table = %name,
                kind = %store.kind(),
                path = %store.path().display(),
                entries = store.len(),
                "serving table"
            );
        }

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Server stopped");

        if self.save_on_shutdown {
            let registry = self.registry;
            let failures = tokio::task::spawn_blocking(move || registry.save_all())
                .await
                .map_err(std::io::Error::other)?;
            if !failures.is_empty() {
                warn!(failed = failures.len(), "some tables could not be saved on shutdown");
            }
        }
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
