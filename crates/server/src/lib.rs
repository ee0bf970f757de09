//! HTTP façade over the pixel store.
//!
//! Clients follow a read-then-write protocol: look a coordinate up, then create, update or
//! delete. There is no upsert; two clients creating the same coordinate at once see exactly
//! one success and one conflict.
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod service;
pub mod validation;

use std::sync::Arc;

use axum::Router;
use pixelwall_store::prelude::{BackingStore, DiskBackingStore, RamBackingStore, StoreError};
use tracing::info;

use crate::config::{BackingStoreKind, StorageConfig};
use crate::service::PixelService;

pub fn open_store(storage: &StorageConfig) -> Result<Arc<dyn BackingStore>, StoreError> {
    let store: Arc<dyn BackingStore> = match storage.backing_store {
        BackingStoreKind::Disk => {
            info!("Initializing disk backing store at {:?}", storage.data_dir);
            Arc::new(DiskBackingStore::open(&storage.data_dir)?)
        }
        BackingStoreKind::Ram => {
            info!("Initializing RAM backing store");
            Arc::new(RamBackingStore::new())
        }
    };
    Ok(store)
}

pub fn app(store: Arc<dyn BackingStore>) -> Router {
    routes::router(Arc::new(PixelService::new(store)))
}
