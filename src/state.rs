use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, LedgerService, SeaOrmAuthService, SeaOrmLedgerService, SeaOrmSubjectService,
    SubjectService,
};

/// Everything a request handler or CLI command needs, built once at startup.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub subject_service: Arc<dyn SubjectService>,

    pub ledger_service: Arc<dyn LedgerService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::from_config(&config.database).await?;
        Ok(Self::with_store(config, store))
    }

    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let subject_service =
            Arc::new(SeaOrmSubjectService::new(store.clone())) as Arc<dyn SubjectService>;

        let ledger_service =
            Arc::new(SeaOrmLedgerService::new(store.clone())) as Arc<dyn LedgerService>;

        Self {
            config: Arc::new(config),
            store,
            auth_service,
            subject_service,
            ledger_service,
        }
    }
}
