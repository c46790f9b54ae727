//! Listener lifecycle for the quiz service.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use flagquiz_core::config::ServerSettings;
use flagquiz_core::store::AnswerStore;

use crate::error::ServerError;
use crate::routes::{build_router, AppState};

/// A bound, not yet serving, quiz service.
pub struct QuizServer {
    listener: TcpListener,
    router: Router,
}

impl QuizServer {
    /// Bind the listener described by `settings`.
    ///
    /// Binding to port 0 picks a free port; use [`QuizServer::local_addr`] to
    /// find out which.
    pub async fn bind(
        settings: &ServerSettings,
        store: Arc<AnswerStore>,
    ) -> Result<Self, ServerError> {
        let addr = settings
            .bind_addr()
            .map_err(|e| ServerError::Config(e.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("{addr}: {e}")))?;

        info!(questions = store.len(), "answer store loaded");
        let router = build_router(AppState { store }, settings);
        Ok(Self { listener, router })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener
            .local_addr()
            .map_err(|e| ServerError::Bind(e.to_string()))
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        info!("listening on http://{addr}");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        info!("server stopped");
        Ok(())
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("failed to listen for ctrl-c: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await
    }
}
