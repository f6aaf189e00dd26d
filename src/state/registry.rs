use crate::api::{BungieClient, RemoteApi};
use crate::config::Config;
use crate::definitions::{DefinitionSource, Definitions, SqliteManifest};
use crate::error::AppResult;
use crate::services::{ProfileService, Reconciler, TransferService};
use crate::state::store::Store;
use std::sync::Arc;

pub struct Services {
    pub profile: Arc<ProfileService>,
    pub transfer: Arc<TransferService>,
}

pub struct Registry {
    pub config: Arc<Config>,
    pub api: Arc<dyn RemoteApi>,
    pub definitions: Arc<Definitions>,
    pub reconciler: Arc<Reconciler>,
    pub store: Arc<Store>,
    pub services: Arc<Services>,
}

impl Registry {
    pub fn new(config: Arc<Config>, api: Arc<dyn RemoteApi>, definitions: Arc<Definitions>) -> Self {
        let store = Arc::new(Store::new());
        let reconciler = Arc::new(Reconciler::new(definitions.clone()));

        let services = Arc::new(Services {
            profile: Arc::new(ProfileService::new(api.clone(), store.clone(), reconciler.clone())),
            transfer: Arc::new(TransferService::new(api.clone(), store.clone(), reconciler.clone())),
        });

        Self {
            config,
            api,
            definitions,
            reconciler,
            store,
            services,
        }
    }

    /// Wire up the real remote client and the local manifest database.
    pub async fn open(config: Arc<Config>) -> AppResult<Self> {
        let api: Arc<dyn RemoteApi> = Arc::new(BungieClient::new(&config)?);
        let manifest: Arc<dyn DefinitionSource> = Arc::new(SqliteManifest::open(&config.manifest_path)?);
        let definitions = Arc::new(Definitions::open(&config.language, manifest).await?);
        Ok(Self::new(config, api, definitions))
    }

    /// Point the definitions at another language. Lookups still in flight
    /// against the old language fail instead of mixing the two.
    pub async fn switch_language(&self, language: &str, source: Arc<dyn DefinitionSource>) -> AppResult<()> {
        self.definitions.invalidate(language, source).await?;
        Ok(())
    }
}
