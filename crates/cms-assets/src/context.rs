use std::sync::Arc;

use cms_store::{NodeStore, Session};

use crate::config::AssetsConfig;
use crate::error::AssetResult;

/// The store capability and configuration every asset component carries.
///
/// Cheap to clone. Components never keep a session open between calls:
/// each operation calls [`open`](Self::open) and drops the session when it
/// returns, whether it succeeded or failed.
#[derive(Clone)]
pub struct AssetContext {
    store: Arc<dyn NodeStore>,
    config: Arc<AssetsConfig>,
}

impl AssetContext {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self {
            store,
            config: Arc::new(AssetsConfig::default()),
        }
    }

    /// Replace the configuration. Fails if `config` does not validate.
    pub fn with_config(mut self, config: AssetsConfig) -> AssetResult<Self> {
        config.validate()?;
        self.config = Arc::new(config);
        Ok(self)
    }

    pub fn config(&self) -> &AssetsConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    /// Open a scoped session.
    pub fn open(&self) -> AssetResult<Box<dyn Session>> {
        Ok(self.store.open()?)
    }
}

impl std::fmt::Debug for AssetContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
