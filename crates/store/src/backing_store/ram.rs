use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};

use crate::backing_store::index::PixelIndex;
use crate::backing_store::{BackingStore, BackingStoreDescriptor};
use crate::color::HexColor;
use crate::error::StoreError;
use crate::id::PixelId;
use crate::types::{Pixel, PixelLoc};

/// Keeps the wall in memory only. Everything is lost when the process exits.
#[derive(Debug, Default)]
pub struct RamBackingStore {
    index: RwLock<PixelIndex>,
}

impl RamBackingStore {
    pub fn new() -> Self {
        debug!("Initializing RAM backing store");
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, PixelIndex>, StoreError> {
        self.index.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, PixelIndex>, StoreError> {
        self.index.write().map_err(|_| StoreError::Poisoned)
    }
}

impl BackingStore for RamBackingStore {
    fn describe(&self) -> Result<BackingStoreDescriptor, StoreError> {
        Ok(BackingStoreDescriptor {
            kind: "ram",
            pixels: self.read()?.len(),
        })
    }

    fn list(&self) -> Result<Vec<Pixel>, StoreError> {
        Ok(self.read()?.list())
    }

    fn find_by_coordinate(&self, x: i64, y: i64) -> Result<Option<Pixel>, StoreError> {
        trace!("Looking for pixel ({}, {}) in RAM backing store", x, y);
        Ok(self.read()?.by_loc(PixelLoc { x, y }).cloned())
    }

    fn find_by_id(&self, id: &PixelId) -> Result<Option<Pixel>, StoreError> {
        Ok(self.read()?.by_id(id).cloned())
    }

    fn create(&self, x: i64, y: i64, color: HexColor) -> Result<Pixel, StoreError> {
        let mut index = self.write()?;
        let pixel = index.prepare_create(PixelLoc { x, y }, color)?;
        index.put(pixel.clone());
        trace!("Pixel ({}, {}) created as {}", x, y, pixel.id);
        Ok(pixel)
    }

    fn update(&self, id: &PixelId, color: HexColor) -> Result<Pixel, StoreError> {
        let mut index = self.write()?;
        let pixel = index.prepare_update(id, color)?;
        index.put(pixel.clone());
        trace!("Pixel {} recolored to {}", id, pixel.color);
        Ok(pixel)
    }

    fn delete(&self, id: &PixelId) -> Result<(), StoreError> {
        let mut index = self.write()?;
        index
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        trace!("Pixel {} deleted", id);
        Ok(())
    }
}
