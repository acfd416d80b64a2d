use chrono::Duration;
use institute_registry::auth::{SessionGate, SessionKeys, StaticIdentityProvider};
use institute_registry::config::AppConfig;
use institute_registry::error::AppError;
use institute_registry::registrations::{
    RegistrationField, RegistrationRepository, RegistrationService,
};
use institute_registry::store::MemoryDocumentStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type OfficerGate = SessionGate<StaticIdentityProvider>;
pub(crate) type Registry = RegistrationService<MemoryDocumentStore>;

/// Wired-up domain services shared by the HTTP server and the CLI.
pub(crate) struct Components {
    pub(crate) gate: Arc<OfficerGate>,
    pub(crate) registry: Arc<Registry>,
}

impl Components {
    pub(crate) fn keys(&self) -> SessionKeys {
        self.gate.keys().clone()
    }
}

pub(crate) async fn open_store(config: &AppConfig) -> Result<MemoryDocumentStore, AppError> {
    match &config.store.snapshot_path {
        Some(path) => Ok(MemoryDocumentStore::open(path.clone()).await?),
        None => {
            warn!("APP_DATA_PATH not set; registrations are kept in memory only");
            Ok(MemoryDocumentStore::new())
        }
    }
}

pub(crate) fn build_components(config: &AppConfig, store: MemoryDocumentStore) -> Components {
    let provider = StaticIdentityProvider::new(&config.officers).with_lockout_window(
        Duration::minutes(i64::from(config.session.lockout_minutes)),
    );
    if provider.officer_count() == 0 {
        warn!("APP_OFFICERS not set; officer login is disabled");
    }

    let keys = SessionKeys::new(config.session.secret.as_bytes());
    let gate = SessionGate::new(Arc::new(provider), keys, config.session.secure_cookies);

    let repository = RegistrationRepository::new(Arc::new(store));
    let registry = RegistrationService::new(repository, config.export.empty_policy);

    Components {
        gate: Arc::new(gate),
        registry: Arc::new(registry),
    }
}

pub(crate) fn parse_order_by(raw: &str) -> Result<RegistrationField, String> {
    RegistrationField::parse(raw.trim()).ok_or_else(|| {
        let known: Vec<&str> = RegistrationField::ordered()
            .into_iter()
            .map(RegistrationField::wire_name)
            .collect();
        format!("unknown field '{raw}' (expected one of: {})", known.join(", "))
    })
}
