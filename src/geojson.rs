//! Wire format of the static venue dataset.
//!
//! The same types are written by the `preprocess` tool and read back by the
//! browser app, so the property keys below are the dataset's column names.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: Geometry,
    pub properties: VenueProperties,
}

impl Feature {
    pub fn point(lon: f64, lat: f64, properties: VenueProperties) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry: Geometry {
                kind: "Point".to_string(),
                coordinates: vec![lon, lat],
            },
            properties,
        }
    }
}

/// Point geometry; coordinates are `[longitude, latitude]`, optionally
/// followed by an altitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VenueProperties {
    /// Empty when the feature has no id; such features are skipped at load.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "行政區", default)]
    pub district: String,
    #[serde(rename = "名稱", default)]
    pub name: String,
    #[serde(rename = "所屬單位", default)]
    pub organization: String,
    #[serde(rename = "經營主體", default)]
    pub operator: String,
    #[serde(rename = "市話", default)]
    pub landline: String,
    #[serde(rename = "分機", default)]
    pub extension: String,
    #[serde(rename = "行動電話", default)]
    pub mobile: String,
    #[serde(rename = "地址", default)]
    pub address: String,
    #[serde(rename = "場館類型", default)]
    pub category: String,
    #[serde(rename = "原始備註", default)]
    pub remark: String,
    #[serde(default)]
    pub icon: String,
}

// Hand-edited datasets sometimes carry numeric ids.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}
