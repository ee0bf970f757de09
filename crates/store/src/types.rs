use serde::{Deserialize, Serialize};

use crate::color::HexColor;
use crate::id::PixelId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelLoc {
    pub x: i64,
    pub y: i64,
}

impl std::fmt::Display for PixelLoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl<X: Into<i64>, Y: Into<i64>> From<(X, Y)> for PixelLoc {
    fn from(loc: (X, Y)) -> Self {
        Self {
            x: loc.0.into(),
            y: loc.1.into(),
        }
    }
}

/// A colored block on the wall.
///
/// Serialized as `{"_id": .., "x": .., "y": .., "color": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pixel {
    #[serde(rename = "_id")]
    pub id: PixelId,
    pub x: i64,
    pub y: i64,
    pub color: HexColor,
}

impl Pixel {
    pub fn loc(&self) -> PixelLoc {
        PixelLoc {
            x: self.x,
            y: self.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_wire_shape() {
        let pixel = Pixel {
            id: PixelId::from("5c1a2b3c4d5e6f7a8b9c0d1e"),
            x: 3,
            y: -4,
            color: "#FF0000".parse().unwrap(),
        };
        let json = serde_json::to_value(&pixel).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"_id": "5c1a2b3c4d5e6f7a8b9c0d1e", "x": 3, "y": -4, "color": "#FF0000"})
        );
        let back: Pixel = serde_json::from_value(json).unwrap();
        assert_eq!(back, pixel);
    }

    #[test]
    fn test_pixel_rejects_bad_color() {
        let json = serde_json::json!({"_id": "a", "x": 0, "y": 0, "color": "red"});
        assert!(serde_json::from_value::<Pixel>(json).is_err());
    }

    #[test]
    fn test_loc_display() {
        assert_eq!(PixelLoc::from((3, -4)).to_string(), "(3, -4)");
    }
}
