//! Persistence for the shared pixel wall.
//!
//! A [`BackingStore`](backing_store::BackingStore) maps integer coordinates to at most one
//! [`Pixel`](types::Pixel) each. Uniqueness of a coordinate is enforced by the store itself,
//! so callers racing to create the same pixel observe a [`StoreError::Conflict`](error::StoreError::Conflict).
pub mod backing_store;
pub mod color;
pub mod error;
pub mod id;
pub mod types;

pub mod prelude {
    pub use crate::backing_store::disk::DiskBackingStore;
    pub use crate::backing_store::ram::RamBackingStore;
    pub use crate::backing_store::{BackingStore, BackingStoreDescriptor};
    pub use crate::color::{HexColor, InvalidColor};
    pub use crate::error::StoreError;
    pub use crate::id::PixelId;
    pub use crate::types::{Pixel, PixelLoc};
}
