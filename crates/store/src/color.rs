use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A color written as `#` followed by 3 or 6 hex digits, in either case.
///
/// The spelling is kept as given, so `#FF0000` and `#ff0000` are different values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("the color was not valid hex, color: {0:?}")]
pub struct InvalidColor(pub String);

pub fn is_hex_color(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

impl HexColor {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Expands the color to its red, green and blue channels. `#abc` means `#aabbcc`.
    pub fn rgb(&self) -> [u8; 3] {
        let digits: Vec<u8> = self.0[1..]
            .bytes()
            .map(|b| (b as char).to_digit(16).unwrap_or(0) as u8)
            .collect();
        if digits.len() == 3 {
            [digits[0] * 17, digits[1] * 17, digits[2] * 17]
        } else {
            [
                digits[0] * 16 + digits[1],
                digits[2] * 16 + digits[3],
                digits[4] * 16 + digits[5],
            ]
        }
    }
}

impl FromStr for HexColor {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_hex_color(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidColor(s.to_string()))
        }
    }
}

impl TryFrom<String> for HexColor {
    type Error = InvalidColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_hex_color(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidColor(value))
        }
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.0
    }
}

impl std::fmt::Display for HexColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
