//! Wiring of the client components for one command invocation.

use super::navigator::TerminalNavigator;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use suraksh_application::{AuthUseCase, IngestionUseCase};
use suraksh_core::SurakshError;
use suraksh_core::backend::IntelligenceBackend;
use suraksh_core::config::ClientConfig;
use suraksh_core::event::EventBus;
use suraksh_core::guard::{GuardDecision, RouteGuard};
use suraksh_core::navigation::{Navigator, Route};
use suraksh_core::notification::NotificationStore;
use suraksh_core::session::SessionManager;
use suraksh_core::store::PersistedStore;
use suraksh_infrastructure::paths::SurakshPaths;
use suraksh_infrastructure::{ConfigService, FileStore};
use suraksh_interaction::{SurakshApi, TransportClient};

/// Global options that shape the context.
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    pub api_url: Option<String>,
    pub store_dir: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
}

pub struct AppContext {
    pub config: ClientConfig,
    pub session: Arc<SessionManager>,
    pub navigator: Arc<TerminalNavigator>,
    pub notifications: Arc<NotificationStore>,
    pub api: Arc<SurakshApi>,
    pub bus: EventBus,
}

impl AppContext {
    /// Builds the context for a command that renders `route`.
    pub fn new(options: &ContextOptions, route: Route) -> Result<Self> {
        let config_service = match &options.config_file {
            Some(path) => ConfigService::new(path),
            None => ConfigService::open_default()?,
        };
        let mut config = config_service.get_config();
        if let Some(url) = &options.api_url {
            config = config.with_api_base_url(url);
        }
        tracing::debug!("[AppContext] API base URL: {}", config.api_base_url);

        let store_dir = match &options.store_dir {
            Some(dir) => dir.clone(),
            None => SurakshPaths::store_dir()?,
        };
        let store: Arc<dyn PersistedStore> = Arc::new(FileStore::new(store_dir));

        let session = Arc::new(SessionManager::new(store.clone()));
        let navigator = Arc::new(TerminalNavigator::new(route));
        let transport = TransportClient::new(
            &config,
            session.clone(),
            navigator.clone() as Arc<dyn Navigator>,
        )
        .context("Failed to create HTTP transport")?;

        Ok(Self {
            config,
            session,
            navigator,
            notifications: Arc::new(NotificationStore::new(store)),
            api: Arc::new(SurakshApi::new(Arc::new(transport))),
            bus: EventBus::global().clone(),
        })
    }

    pub fn backend(&self) -> Arc<dyn IntelligenceBackend> {
        self.api.clone()
    }

    pub fn auth(&self) -> AuthUseCase {
        AuthUseCase::new(self.session.clone(), self.backend())
    }

    pub fn ingestion(&self) -> IngestionUseCase {
        IngestionUseCase::new(self.backend(), self.notifications.clone(), self.bus.clone())
    }

    /// Runs the route guard for a protected command.
    ///
    /// Without a session the guard redirects to login (which prints the
    /// hint) and this returns an authorization error the caller reports
    /// silently.
    pub async fn require_session(&self) -> Result<()> {
        let guard = RouteGuard::new(
            self.session.clone(),
            self.navigator.clone() as Arc<dyn Navigator>,
            self.config.hydration_delay,
        );
        match guard.resolve().await {
            GuardDecision::RenderProtected => Ok(()),
            _ => Err(SurakshError::Authorization("no active session".to_string()).into()),
        }
    }
}
