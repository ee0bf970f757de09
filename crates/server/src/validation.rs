//! Request validation, run before the store is touched.
//!
//! Coordinates are checked before colors, so a request that is wrong in several ways always
//! reports the same error.
use pixelwall_store::prelude::{HexColor, PixelLoc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid x or y querystring parameter")]
    Query,
    #[error("invalid x or y in body, x: {x}, y: {y}")]
    Coordinates { x: String, y: String },
    #[error("the color was not valid hex, color: {0}")]
    Color(String),
    #[error("request body is not a JSON object: {0}")]
    Body(String),
    #[error("invalid pixel id in path: {0}")]
    Id(String),
}

#[derive(Debug, Default, Deserialize)]
pub struct CoordinateQuery {
    pub x: Option<String>,
    pub y: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatePixelBody {
    x: Option<Value>,
    y: Option<Value>,
    color: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct UpdatePixelBody {
    color: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPixel {
    pub loc: PixelLoc,
    pub color: HexColor,
}

pub fn validate_query(query: &CoordinateQuery) -> Result<PixelLoc, ValidationError> {
    let parse = |value: &Option<String>| value.as_deref().and_then(|s| s.parse::<i64>().ok());
    match (parse(&query.x), parse(&query.y)) {
        (Some(x), Some(y)) => Ok(PixelLoc { x, y }),
        _ => Err(ValidationError::Query),
    }
}

pub fn validate_create(body: &[u8]) -> Result<NewPixel, ValidationError> {
    let body: CreatePixelBody =
        serde_json::from_slice(body).map_err(|e| ValidationError::Body(e.to_string()))?;

    let loc = match (coordinate(body.x.as_ref()), coordinate(body.y.as_ref())) {
        (Some(x), Some(y)) => PixelLoc { x, y },
        _ => {
            return Err(ValidationError::Coordinates {
                x: render(body.x.as_ref()),
                y: render(body.y.as_ref()),
            });
        }
    };
    let color = color(body.color.as_ref())?;
    Ok(NewPixel { loc, color })
}

pub fn validate_update(body: &[u8]) -> Result<HexColor, ValidationError> {
    let body: UpdatePixelBody =
        serde_json::from_slice(body).map_err(|e| ValidationError::Body(e.to_string()))?;
    color(body.color.as_ref())
}

/// Integers, integral floats and strings holding an integer are coordinates.
fn coordinate(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn color(value: Option<&Value>) -> Result<HexColor, ValidationError> {
    match value {
        Some(Value::String(s)) => s
            .parse()
            .map_err(|_| ValidationError::Color(render(value))),
        _ => Err(ValidationError::Color(render(value))),
    }
}

fn render(value: Option<&Value>) -> String {
    value.map_or_else(|| "undefined".to_string(), Value::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(x: Option<&str>, y: Option<&str>) -> CoordinateQuery {
        CoordinateQuery {
            x: x.map(str::to_string),
            y: y.map(str::to_string),
        }
    }

    #[test]
    fn test_query() {
        assert_eq!(
            validate_query(&query(Some("3"), Some("-4"))),
            Ok(PixelLoc { x: 3, y: -4 })
        );
        for (x, y) in [
            (None, Some("1")),
            (Some("1"), None),
            (Some("a"), Some("1")),
            (Some("1.5"), Some("1")),
            (Some(""), Some("")),
        ] {
            assert_eq!(validate_query(&query(x, y)), Err(ValidationError::Query));
        }
    }

    #[test]
    fn test_create_accepts_numbers_and_numeric_strings() {
        let new = validate_create(br##"{"x": 3, "y": "4", "color": "#FF0000"}"##).unwrap();
        assert_eq!(new.loc, PixelLoc { x: 3, y: 4 });
        assert_eq!(new.color.as_str(), "#FF0000");

        let new = validate_create(br##"{"x": 2.0, "y": -1, "color": "#abc"}"##).unwrap();
        assert_eq!(new.loc, PixelLoc { x: 2, y: -1 });
    }

    #[test]
    fn test_create_rejects_bad_coordinates() {
        for body in [
            br##"{"y": 1, "color": "#fff"}"##.as_slice(),
            br##"{"x": 1.5, "y": 1, "color": "#fff"}"##.as_slice(),
            br##"{"x": "one", "y": 1, "color": "#fff"}"##.as_slice(),
            br##"{"x": true, "y": 1, "color": "#fff"}"##.as_slice(),
            br##"{"x": null, "y": 1, "color": "#fff"}"##.as_slice(),
        ] {
            assert!(matches!(
                validate_create(body),
                Err(ValidationError::Coordinates { .. })
            ));
        }
    }

    #[test]
    fn test_coordinates_checked_before_color() {
        let err = validate_create(br#"{"x": "a", "y": 1, "color": "red"}"#).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Coordinates {
                x: "\"a\"".to_string(),
                y: "1".to_string()
            }
        );
    }

    #[test]
    fn test_create_rejects_bad_color() {
        for (body, shown) in [
            (br#"{"x": 1, "y": 1, "color": "red"}"#.as_slice(), "\"red\""),
            (br##"{"x": 1, "y": 1, "color": "#12"}"##.as_slice(), "\"#12\""),
            (br#"{"x": 1, "y": 1, "color": ""}"#.as_slice(), "\"\""),
            (br#"{"x": 1, "y": 1, "color": 255}"#.as_slice(), "255"),
            (br#"{"x": 1, "y": 1}"#.as_slice(), "undefined"),
        ] {
            assert_eq!(
                validate_create(body),
                Err(ValidationError::Color(shown.to_string()))
            );
        }
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(validate_create(b""), Err(ValidationError::Body(_))));
        assert!(matches!(validate_create(b"42"), Err(ValidationError::Body(_))));
        assert!(matches!(validate_update(b"x=1"), Err(ValidationError::Body(_))));
    }

    #[test]
    fn test_update_ignores_extra_fields() {
        let color = validate_update(br##"{"x": "3", "y": "4", "color": "#00FF00"}"##).unwrap();
        assert_eq!(color.as_str(), "#00FF00");
        assert!(matches!(
            validate_update(br#"{"color": "transparent"}"#),
            Err(ValidationError::Color(_))
        ));
    }
}
