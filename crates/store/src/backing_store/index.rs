use std::collections::HashMap;

use crate::color::HexColor;
use crate::error::StoreError;
use crate::id::PixelId;
use crate::types::{Pixel, PixelLoc};

/// In-memory view shared by every backing store: pixels by id, plus the coordinate index that
/// makes a coordinate unique.
#[derive(Debug, Default)]
pub(crate) struct PixelIndex {
    by_id: HashMap<PixelId, Pixel>,
    by_loc: HashMap<PixelLoc, PixelId>,
}

impl PixelIndex {
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn list(&self) -> Vec<Pixel> {
        let mut pixels: Vec<Pixel> = self.by_id.values().cloned().collect();
        pixels.sort_by_key(|p| (p.y, p.x));
        pixels
    }

    pub fn by_loc(&self, loc: PixelLoc) -> Option<&Pixel> {
        self.by_loc.get(&loc).and_then(|id| self.by_id.get(id))
    }

    pub fn by_id(&self, id: &PixelId) -> Option<&Pixel> {
        self.by_id.get(id)
    }

    /// Builds the pixel `create` would insert, without inserting it.
    pub fn prepare_create(&self, loc: PixelLoc, color: HexColor) -> Result<Pixel, StoreError> {
        if self.by_loc.contains_key(&loc) {
            return Err(StoreError::Conflict(loc));
        }
        Ok(Pixel {
            id: PixelId::generate(),
            x: loc.x,
            y: loc.y,
            color,
        })
    }

    /// Builds the pixel `update` would store, without storing it.
    pub fn prepare_update(&self, id: &PixelId, color: HexColor) -> Result<Pixel, StoreError> {
        let current = self
            .by_id
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(Pixel {
            color,
            ..current.clone()
        })
    }

    pub fn ensure_exists(&self, id: &PixelId) -> Result<(), StoreError> {
        if self.by_id.contains_key(id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(id.clone()))
        }
    }

    /// Inserts or replaces a pixel by id. A pixel previously stored at the same coordinate
    /// under another id is dropped, so the coordinate stays unique.
    pub fn put(&mut self, pixel: Pixel) {
        if let Some(previous) = self.by_id.get(&pixel.id) {
            self.by_loc.remove(&previous.loc());
        }
        if let Some(stale) = self.by_loc.insert(pixel.loc(), pixel.id.clone()) {
            if stale != pixel.id {
                self.by_id.remove(&stale);
            }
        }
        self.by_id.insert(pixel.id.clone(), pixel);
    }

    pub fn remove(&mut self, id: &PixelId) -> Option<Pixel> {
        let pixel = self.by_id.remove(id)?;
        self.by_loc.remove(&pixel.loc());
        Some(pixel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color(s: &str) -> HexColor {
        s.parse().unwrap()
    }

    #[test]
    fn test_put_keeps_coordinate_unique() {
        let mut index = PixelIndex::default();
        let first = index.prepare_create((1, 1).into(), color("#fff")).unwrap();
        index.put(first.clone());

        let intruder = Pixel {
            id: PixelId::from("other"),
            ..first.clone()
        };
        index.put(intruder.clone());

        assert_eq!(index.len(), 1);
        assert_eq!(index.by_loc((1, 1).into()), Some(&intruder));
        assert!(index.by_id(&first.id).is_none());
    }

    #[test]
    fn test_prepare_does_not_mutate() {
        let mut index = PixelIndex::default();
        let pixel = index.prepare_create((0, 0).into(), color("#000")).unwrap();
        assert_eq!(index.len(), 0);
        index.put(pixel.clone());

        let updated = index.prepare_update(&pixel.id, color("#111")).unwrap();
        assert_eq!(updated.color, color("#111"));
        assert_eq!(index.by_id(&pixel.id).unwrap().color, color("#000"));
    }

    #[test]
    fn test_list_is_row_major() {
        let mut index = PixelIndex::default();
        for (x, y) in [(2, 1), (0, 1), (5, 0)] {
            let pixel = index.prepare_create((x, y).into(), color("#abc")).unwrap();
            index.put(pixel);
        }
        let locs: Vec<_> = index.list().iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(locs, vec![(5, 0), (0, 1), (2, 1)]);
    }
}
