//! Shared application state handed to every route through axum's
//! `State` extractor and to the auth extractors through request
//! extensions, mirroring the teacher's `AppState` split in
//! `fc-platform::shared::middleware`.

use std::sync::Arc;

use fc_auth::AuthResolver;
use fc_common::SystemClock;
use fc_config::AppConfig;
use fc_events::EventsService;
use fc_jobs::JobsService;
use fc_store::{PgAuthStore, PgStore};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthResolver<PgAuthStore>>,
    pub events: Arc<EventsService<SystemClock>>,
    pub jobs: Arc<JobsService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        store: PgStore,
        auth_store: PgAuthStore,
        config: AppConfig,
    ) -> Self {
        let auth = AuthResolver::new(auth_store, &config.auth.jwt_secret);
        let events = EventsService::new(store.clone(), SystemClock);
        let jobs = JobsService::new(store);

        Self {
            auth: Arc::new(auth),
            events: Arc::new(events),
            jobs: Arc::new(jobs),
            config: Arc::new(config),
        }
    }
}
