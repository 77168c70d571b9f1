//! Application context
//!
//! The host builds one `AppContext` at startup and passes it by reference to
//! whatever needs the store. The context owns the lazily constructed
//! [`StoreHandle`], so there is exactly one handle per context without any
//! global state.

use std::sync::{Arc, OnceLock};

use crate::config::StoreConfig;
use crate::database::{DestructiveMigrator, StoreHandle, SCHEMA_VERSION};

pub struct AppContext {
    config: StoreConfig,
    store: OnceLock<Arc<StoreHandle>>,
}

impl AppContext {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            store: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Shared store handle, constructed on first call
    ///
    /// Concurrent first calls race on the `OnceLock`; exactly one handle is
    /// built and every caller receives a clone of the same `Arc`. Building
    /// the handle does not open the database.
    pub fn store(&self) -> Arc<StoreHandle> {
        self.store
            .get_or_init(|| {
                let migrator = DestructiveMigrator::new(self.config.downgrade_policy);
                Arc::new(
                    StoreHandle::new(Some(self.config.sqlite_path()), SCHEMA_VERSION)
                        .with_migrator(Arc::new(migrator)),
                )
            })
            .clone()
    }
}
