//! Construction of the hosted backend clients from startup configuration.

use std::sync::Arc;

use magsday_core::assist::GeminiClient;
use magsday_core::auth::FirebaseAuth;
use magsday_core::store::FirestoreStore;
use magsday_core::{AppConfig, Driver, Result, SessionManager, Synchronizer};

use super::KeyringSessions;

pub type AppAuth = FirebaseAuth<KeyringSessions>;
pub type AppDriver = Driver<AppAuth, FirestoreStore>;

/// Everything the app coroutine needs to talk to the backend.
pub struct Backend {
    pub driver: AppDriver,
    pub session: SessionManager<AppAuth>,
    pub assist: Arc<GeminiClient>,
}

impl Backend {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let firebase = config.require_firebase()?;
        let auth = FirebaseAuth::new(firebase.api_key, KeyringSessions::default())?;
        let store = FirestoreStore::new(
            firebase.project_id,
            auth.token_source(),
            config.poll_interval,
        )?;
        let assist = GeminiClient::new(config.assist.api_key.clone(), config.assist.model.clone())?;
        if !assist.is_enabled() {
            tracing::info!("AI assist disabled (no Gemini API key)");
        }

        let session = SessionManager::new(auth);
        let sync = Synchronizer::with_local_today(Arc::new(store), config.app_id.clone());
        tracing::info!(
            "Backend ready for project {} (app {}, today {})",
            firebase.project_id,
            config.app_id,
            sync.today()
        );

        Ok(Self {
            session: session.clone(),
            driver: Driver::new(session, sync),
            assist: Arc::new(assist),
        })
    }
}

/// Load configuration and build the backend. Errors are rendered as a notice.
pub fn load_backend() -> Result<Backend> {
    let config = AppConfig::from_env()?;
    tracing::debug!("Loaded configuration: {:?}", config);
    Backend::from_config(&config)
}
