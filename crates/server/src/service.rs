use std::sync::Arc;

use pixelwall_store::prelude::{BackingStore, HexColor, Pixel, PixelId, PixelLoc};
use tracing::{debug, info, instrument};

use crate::error::ServiceError;
use crate::validation::NewPixel;

/// Addressing rules on top of a backing store: coordinates for lookup and creation, ids for
/// everything else. Holds no state of its own.
pub struct PixelService {
    store: Arc<dyn BackingStore>,
}

impl PixelService {
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<Pixel>, ServiceError> {
        let pixels = self.store.list()?;
        debug!("Listing {} pixels", pixels.len());
        Ok(pixels)
    }

    /// `None` is the regular answer for a coordinate nobody has painted yet.
    #[instrument(skip(self))]
    pub fn pixel_at(&self, loc: PixelLoc) -> Result<Option<Pixel>, ServiceError> {
        Ok(self.store.find_by_coordinate(loc.x, loc.y)?)
    }

    /// Fails with [`ServiceError::Conflict`] when the coordinate is taken, whether that is seen
    /// by the lookup or, for a racing request, by the store's own uniqueness check.
    #[instrument(skip(self))]
    pub fn create(&self, new: NewPixel) -> Result<Pixel, ServiceError> {
        let NewPixel { loc, color } = new;
        if self.store.find_by_coordinate(loc.x, loc.y)?.is_some() {
            return Err(ServiceError::Conflict(loc));
        }
        let pixel = self.store.create(loc.x, loc.y, color)?;
        info!("Created pixel {} at {} with {}", pixel.id, loc, pixel.color);
        Ok(pixel)
    }

    #[instrument(skip(self))]
    pub fn update(&self, id: &PixelId, color: HexColor) -> Result<Pixel, ServiceError> {
        let pixel = self.store.update(id, color)?;
        info!("Recolored pixel {} at {} to {}", id, pixel.loc(), pixel.color);
        Ok(pixel)
    }

    #[instrument(skip(self))]
    pub fn delete(&self, id: &PixelId) -> Result<(), ServiceError> {
        self.store.delete(id)?;
        info!("Deleted pixel {}", id);
        Ok(())
    }
}
