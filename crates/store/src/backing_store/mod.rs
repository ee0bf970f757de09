pub mod disk;
mod index;
pub mod ram;

use crate::color::HexColor;
use crate::error::StoreError;
use crate::id::PixelId;
use crate::types::Pixel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackingStoreDescriptor {
    pub kind: &'static str,
    /// Number of pixels currently stored.
    pub pixels: usize,
}

/// Durable mapping from a coordinate to at most one pixel.
///
/// Every call is atomic: it either applies completely or leaves the store untouched.
pub trait BackingStore: Send + Sync {
    fn describe(&self) -> Result<BackingStoreDescriptor, StoreError>;
    /// All stored pixels, ordered by row then column.
    fn list(&self) -> Result<Vec<Pixel>, StoreError>;
    fn find_by_coordinate(&self, x: i64, y: i64) -> Result<Option<Pixel>, StoreError>;
    fn find_by_id(&self, id: &PixelId) -> Result<Option<Pixel>, StoreError>;
    /// Store a new pixel under a fresh id.
    /// Fails with [`StoreError::Conflict`] if the coordinate is already taken.
    fn create(&self, x: i64, y: i64, color: HexColor) -> Result<Pixel, StoreError>;
    /// Fails with [`StoreError::NotFound`] if no pixel has this id.
    fn update(&self, id: &PixelId, color: HexColor) -> Result<Pixel, StoreError>;
    /// Fails with [`StoreError::NotFound`] if no pixel has this id.
    fn delete(&self, id: &PixelId) -> Result<(), StoreError>;
}
