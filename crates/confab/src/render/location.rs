//! Location bodies: a coordinate pair the frontend turns into a map.
//!
//! The renderer only validates and carries the coordinates. Materializing
//! the map needs a concrete drawing area, which exists at draw time, not at
//! render time. The node defers that work to the frontend's next frame.

use serde_json::Value;

use crate::config::ThemeColor;
use crate::display::{DisplayNode, GeoPoint};
use crate::error::MalformedBody;

/// Degrees of longitude shown around the marker, the fixed-zoom analog.
pub const VIEW_SPAN_LON: f64 = 4.0;
/// Degrees of latitude shown around the marker.
pub const VIEW_SPAN_LAT: f64 = 2.0;

pub fn location(body: &Value, _theme: &ThemeColor) -> Result<DisplayNode, MalformedBody> {
    let obj = body
        .as_object()
        .ok_or_else(|| MalformedBody::new("location", "body is not an object"))?;
    let latitude = coord(obj, "latitude")?;
    let longitude = coord(obj, "longitude")?;
    Ok(DisplayNode::Map(GeoPoint {
        latitude,
        longitude,
    }))
}

fn coord(obj: &serde_json::Map<String, Value>, field: &'static str) -> Result<f64, MalformedBody> {
    obj.get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| MalformedBody::new("location", format!("missing numeric `{field}`")))
}

impl GeoPoint {
    /// Longitude bounds of the fixed-zoom viewport centered on the marker.
    pub fn x_bounds(&self) -> [f64; 2] {
        [self.longitude - VIEW_SPAN_LON, self.longitude + VIEW_SPAN_LON]
    }

    /// Latitude bounds of the fixed-zoom viewport centered on the marker.
    pub fn y_bounds(&self) -> [f64; 2] {
        [self.latitude - VIEW_SPAN_LAT, self.latitude + VIEW_SPAN_LAT]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinates() {
        let body = serde_json::json!({"latitude": 49.611, "longitude": 6.13});
        let DisplayNode::Map(point) = location(&body, &ThemeColor::DEFAULT).unwrap() else {
            panic!("expected map node");
        };
        assert_eq!(point.latitude, 49.611);
        assert_eq!(point.longitude, 6.13);
        assert_eq!(point.popup(), "49.611, 6.13");
    }

    #[test]
    fn viewport_is_centered_on_the_marker() {
        let point = GeoPoint {
            latitude: 10.0,
            longitude: 20.0,
        };
        assert_eq!(point.x_bounds(), [20.0 - VIEW_SPAN_LON, 20.0 + VIEW_SPAN_LON]);
        assert_eq!(point.y_bounds(), [10.0 - VIEW_SPAN_LAT, 10.0 + VIEW_SPAN_LAT]);
    }

    #[test]
    fn rejects_missing_or_non_numeric_coordinates() {
        assert!(location(&serde_json::json!({"latitude": 1.0}), &ThemeColor::DEFAULT).is_err());
        assert!(
            location(
                &serde_json::json!({"latitude": "x", "longitude": 2.0}),
                &ThemeColor::DEFAULT
            )
            .is_err()
        );
        assert!(location(&Value::String("nope".into()), &ThemeColor::DEFAULT).is_err());
    }
}
