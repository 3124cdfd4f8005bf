use crate::auth::{services::AuthWorkflow, session::SessionStore};
use crate::config::AppConfig;
use crate::dashboard::services::DashboardService;
use crate::records::{RecordClient, RecordStore};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<AuthWorkflow>,
    pub dashboard: Arc<DashboardService>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let kv = match &config.storage.session_file {
            Some(path) => {
                info!(path = %path.display(), "using file-backed session storage");
                Arc::new(FileStore::open(path)?) as Arc<dyn KeyValueStore>
            }
            None => Arc::new(MemoryStore::new()) as Arc<dyn KeyValueStore>,
        };

        let records =
            Arc::new(RecordClient::new(&config.record_api_url)?) as Arc<dyn RecordStore>;

        Ok(Self::from_parts(config, kv, records))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        kv: Arc<dyn KeyValueStore>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        let sessions = SessionStore::new(kv, config.storage.namespace.clone());
        let auth = Arc::new(AuthWorkflow::new(
            records.clone(),
            sessions,
            config.login_latency,
        ));
        let dashboard = Arc::new(DashboardService::new(records, auth.sessions().clone()));
        Self {
            config,
            auth,
            dashboard,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_records().0
    }

    #[cfg(test)]
    pub fn fake_with_records() -> (Self, Arc<crate::records::fake::FakeRecords>) {
        use crate::config::StorageConfig;
        use crate::records::fake::FakeRecords;

        let config = Arc::new(AppConfig {
            record_api_url: "http://fake.local".into(),
            storage: StorageConfig {
                namespace: "ncvet_".into(),
                session_file: None,
            },
            login_latency: std::time::Duration::ZERO,
            host: "127.0.0.1".into(),
            port: 0,
        });
        let records = Arc::new(FakeRecords::new());
        let state = Self::from_parts(
            config,
            Arc::new(MemoryStore::new()),
            records.clone() as Arc<dyn RecordStore>,
        );
        (state, records)
    }
}
