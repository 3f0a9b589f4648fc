//! The render result handed to presentation.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use geo_common::GeoResult;
use serde::{Deserialize, Serialize};
use symmetry::AntipodePair;

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Timestamp, matched pairs and one encoded image per rendered variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPayload {
    pub timestamp: String,
    pub matches: Vec<AntipodePair>,
    /// Variable name → `data:image/png;base64,...`.
    pub rasters: BTreeMap<String, String>,
}

impl RenderPayload {
    pub fn to_json(&self) -> GeoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decoded PNG bytes for `variable`.
    pub fn raster_png(&self, variable: &str) -> Option<Vec<u8>> {
        self.rasters.get(variable).and_then(|url| decode_png_data_url(url))
    }
}

pub fn png_data_url(png: &[u8]) -> String {
    let mut url = String::with_capacity(PNG_DATA_URL_PREFIX.len() + png.len() * 4 / 3 + 4);
    url.push_str(PNG_DATA_URL_PREFIX);
    STANDARD.encode_string(png, &mut url);
    url
}

pub fn decode_png_data_url(url: &str) -> Option<Vec<u8>> {
    let encoded = url.strip_prefix(PNG_DATA_URL_PREFIX)?;
    STANDARD.decode(encoded).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_round_trip() {
        let bytes = [0x89, b'P', b'N', b'G', 0, 255];
        let url = png_data_url(&bytes);
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_png_data_url(&url).unwrap(), bytes);
    }

    #[test]
    fn test_rejects_other_media_types() {
        assert!(decode_png_data_url("data:image/jpeg;base64,AAAA").is_none());
    }

    #[test]
    fn test_json_shape() {
        let payload = RenderPayload {
            timestamp: "2024-01-15 12z".to_string(),
            matches: vec![AntipodePair {
                lat_a: -90.0,
                lon_a: 180.0,
                values_a: BTreeMap::from([("temperature".to_string(), 10.0005)]),
                lat_b: 90.0,
                lon_b: 0.0,
                values_b: BTreeMap::from([("temperature".to_string(), 10.0)]),
            }],
            rasters: BTreeMap::from([("temperature".to_string(), png_data_url(&[1, 2, 3]))]),
        };

        let value: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(value["timestamp"], "2024-01-15 12z");
        assert_eq!(value["matches"][0]["latA"], -90.0);
        assert_eq!(value["matches"][0]["valuesB"]["temperature"], 10.0);
        assert_eq!(value["rasters"]["temperature"], "data:image/png;base64,AQID");
    }
}
