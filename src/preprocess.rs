//! Conversion of the municipal sports-venue CSV into the GeoJSON the app loads.
//!
//! The CSV has free-text remarks instead of a category column and a handful
//! of rows whose longitude lost its leading "1" (e.g. `21.52` for `121.52`).
//! Both are normalised here so the browser side can trust the dataset.

use crate::geojson::{Feature, FeatureCollection, VenueProperties};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;

static GYM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"健身房").unwrap());
static YOGA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"瑜[珈伽]").unwrap());
static SWIM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"游泳").unwrap());
static CUE_CLIMB_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"撞球|攀岩").unwrap());

/// Category used when the remark is empty.
pub const OTHER_CATEGORY: &str = "其他";

#[derive(Debug)]
pub enum PreprocessError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
}

impl fmt::Display for PreprocessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreprocessError::Io(e) => write!(f, "I/O error: {}", e),
            PreprocessError::Csv(e) => write!(f, "Malformed CSV: {}", e),
            PreprocessError::Json(e) => write!(f, "Could not write GeoJSON: {}", e),
        }
    }
}

impl std::error::Error for PreprocessError {}

impl From<std::io::Error> for PreprocessError {
    fn from(e: std::io::Error) -> Self {
        PreprocessError::Io(e)
    }
}

impl From<csv::Error> for PreprocessError {
    fn from(e: csv::Error) -> Self {
        PreprocessError::Csv(e)
    }
}

impl From<serde_json::Error> for PreprocessError {
    fn from(e: serde_json::Error) -> Self {
        PreprocessError::Json(e)
    }
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct CsvRow {
    #[serde(rename = "編號")]
    id: String,
    #[serde(rename = "行政區")]
    district: String,
    #[serde(rename = "廠商名稱〈市招〉")]
    name: String,
    #[serde(rename = "所屬單位")]
    organization: String,
    #[serde(rename = "經營主體")]
    operator: String,
    #[serde(rename = "市話")]
    landline: String,
    #[serde(rename = "分機")]
    extension: String,
    #[serde(rename = "行動電話")]
    mobile: String,
    #[serde(rename = "地址")]
    address: String,
    #[serde(rename = "經度")]
    longitude: String,
    #[serde(rename = "緯度")]
    latitude: String,
    #[serde(rename = "備註")]
    remark: String,
}

/// A longitude that was shifted back into Taipei's 121.x band.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairedLongitude {
    pub name: String,
    pub original: f64,
    pub fixed: f64,
}

#[derive(Debug, Clone)]
pub struct Conversion {
    pub collection: FeatureCollection,
    /// (category, count), most frequent first.
    pub category_counts: Vec<(String, usize)>,
    /// (district, count), most frequent first.
    pub district_counts: Vec<(String, usize)>,
    pub repaired: Vec<RepairedLongitude>,
    pub skipped_rows: usize,
}

impl Conversion {
    pub fn to_geojson_string(&self) -> Result<String, PreprocessError> {
        Ok(serde_json::to_string_pretty(&self.collection)?)
    }
}

/// Parse a longitude, adding 100 when it looks like `2x.xxx` instead of `12x.xxx`.
pub fn fix_longitude(raw: &str) -> Option<f64> {
    let lon: f64 = raw.trim().parse().ok()?;
    if lon < 100.0 && lon > 20.0 && lon < 30.0 {
        Some(lon + 100.0)
    } else {
        Some(lon)
    }
}

/// Normalise a free-text remark to one of the app's venue categories.
pub fn classify_venue_type(remark: &str) -> String {
    let remark = remark.trim();
    if remark.is_empty() {
        return OTHER_CATEGORY.to_string();
    }

    let category = if GYM_REGEX.is_match(remark) {
        "健身房"
    } else if YOGA_REGEX.is_match(remark) {
        "瑜珈教室"
    } else if SWIM_REGEX.is_match(remark) {
        if remark.contains("室內外") {
            "室內外游泳池"
        } else if remark.contains("室外") {
            "室外游泳池"
        } else if remark.contains("室內") {
            "室內游泳池"
        } else {
            "游泳池"
        }
    } else if CUE_CLIMB_REGEX.is_match(remark) {
        "撞球場及攀岩場"
    } else {
        return remark.to_string();
    };
    category.to_string()
}

/// Icon key for a category; `marker` selects the default pin.
pub fn icon_key_for(category: &str) -> &'static str {
    match category {
        "健身房" => "dumbbell",
        "瑜珈教室" => "yoga",
        "游泳池" => "swimming",
        "室內游泳池" => "swimming-indoor",
        "室外游泳池" => "swimming-outdoor",
        "室內外游泳池" => "swimming-both",
        "撞球場及攀岩場" => "sports",
        _ => "marker",
    }
}

/// Drop spreadsheet artefacts: blanks, `nan`/`None`, and a trailing `.0`.
pub fn clean_phone(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() || value == "nan" || value == "None" {
        return String::new();
    }
    value.strip_suffix(".0").unwrap_or(value).to_string()
}

/// Tally in first-seen order, then sort by count descending (ties keep first-seen order).
fn ranked(counts: Vec<(String, usize)>) -> Vec<(String, usize)> {
    let mut counts = counts;
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn bump(counts: &mut Vec<(String, usize)>, index: &mut HashMap<String, usize>, key: &str) {
    match index.get(key) {
        Some(&i) => counts[i].1 += 1,
        None => {
            index.insert(key.to_string(), counts.len());
            counts.push((key.to_string(), 1));
        }
    }
}

/// Convert the CSV text (a leading BOM is tolerated) into venue features.
pub fn convert_csv(content: &str) -> Result<Conversion, PreprocessError> {
    let content = content.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut features = Vec::new();
    let mut repaired = Vec::new();
    let mut skipped_rows = 0;
    let (mut categories, mut category_index) = (Vec::new(), HashMap::new());
    let (mut districts, mut district_index) = (Vec::new(), HashMap::new());

    for (i, record) in reader.deserialize::<CsvRow>().enumerate() {
        let row = record?;

        let (Some(lon), Ok(lat)) = (fix_longitude(&row.longitude), row.latitude.trim().parse::<f64>())
        else {
            debug!("Row {} ('{}') has no usable coordinate, skipping", i + 1, row.name);
            skipped_rows += 1;
            continue;
        };

        if let Ok(original) = row.longitude.trim().parse::<f64>() {
            if original < 100.0 && lon > 100.0 {
                warn!("Repaired longitude of '{}': {} -> {}", row.name, original, lon);
                repaired.push(RepairedLongitude {
                    name: row.name.clone(),
                    original,
                    fixed: lon,
                });
            }
        }

        let category = classify_venue_type(&row.remark);
        bump(&mut categories, &mut category_index, &category);
        bump(&mut districts, &mut district_index, &row.district);

        let properties = VenueProperties {
            id: row.id,
            district: row.district,
            name: row.name,
            organization: row.organization,
            operator: row.operator,
            landline: clean_phone(&row.landline),
            extension: clean_phone(&row.extension),
            mobile: clean_phone(&row.mobile),
            address: row.address,
            icon: icon_key_for(&category).to_string(),
            category,
            remark: row.remark,
        };
        features.push(Feature::point(lon, lat, properties));
    }

    Ok(Conversion {
        collection: FeatureCollection::new(features),
        category_counts: ranked(categories),
        district_counts: ranked(districts),
        repaired,
        skipped_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_venues_from_geojson_str;

    const HEADER: &str = "編號,行政區,廠商名稱〈市招〉,所屬單位,經營主體,市話,分機,行動電話,地址,經度,緯度,備註";

    #[test]
    fn classifies_remarks() {
        assert_eq!(classify_venue_type("健身房(含重訓)"), "健身房");
        assert_eq!(classify_venue_type("瑜伽教室"), "瑜珈教室");
        assert_eq!(classify_venue_type("瑜珈"), "瑜珈教室");
        assert_eq!(classify_venue_type("室內外游泳池"), "室內外游泳池");
        assert_eq!(classify_venue_type("室外游泳"), "室外游泳池");
        assert_eq!(classify_venue_type("室內溫水游泳池"), "室內游泳池");
        assert_eq!(classify_venue_type("游泳"), "游泳池");
        assert_eq!(classify_venue_type("攀岩館"), "撞球場及攀岩場");
        assert_eq!(classify_venue_type("  桌球 "), "桌球");
        assert_eq!(classify_venue_type(""), OTHER_CATEGORY);
    }

    #[test]
    fn icon_keys_follow_categories() {
        assert_eq!(icon_key_for("室外游泳池"), "swimming-outdoor");
        assert_eq!(icon_key_for("桌球"), "marker");
    }

    #[test]
    fn repairs_only_dropped_hundreds() {
        assert_eq!(fix_longitude("21.5170"), Some(121.5170));
        assert_eq!(fix_longitude("121.5170"), Some(121.5170));
        assert_eq!(fix_longitude("15.0"), Some(15.0));
        assert_eq!(fix_longitude(""), None);
        assert_eq!(fix_longitude("abc"), None);
    }

    #[test]
    fn cleans_spreadsheet_phone_values() {
        assert_eq!(clean_phone("23456789.0"), "23456789");
        assert_eq!(clean_phone("nan"), "");
        assert_eq!(clean_phone("None"), "");
        assert_eq!(clean_phone(" 0912345678 "), "0912345678");
    }

    #[test]
    fn converts_rows_and_reports() {
        let csv = format!(
            "\u{feff}{}\n\
             1,中正區,站前健身房,,站前公司,23456789.0,12,,忠孝西路一段1號,21.5170,25.0478,健身房\n\
             2,中正區,南門泳池,體育局,,,,0912345678,南昌路,121.5150,25.0330,室內游泳池\n\
             3,大安區,無座標,,,,,,某處,,,瑜珈\n\
             4,大安區,瑜珈坊,,,,,,復興南路,121.5430,25.0260,瑜伽\n",
            HEADER
        );
        let conversion = convert_csv(&csv).unwrap();

        assert_eq!(conversion.collection.features.len(), 3);
        assert_eq!(conversion.skipped_rows, 1);
        assert_eq!(
            conversion.repaired,
            vec![RepairedLongitude {
                name: "站前健身房".to_string(),
                original: 21.5170,
                fixed: 121.5170,
            }]
        );
        assert_eq!(conversion.district_counts[0], ("中正區".to_string(), 2));
        assert_eq!(conversion.category_counts.len(), 3);

        let first = &conversion.collection.features[0];
        assert_eq!(first.geometry.coordinates, [121.5170, 25.0478]);
        assert_eq!(first.properties.landline, "23456789");
        assert_eq!(first.properties.icon, "dumbbell");

        // What the tool writes is exactly what the app reads.
        let json = conversion.to_geojson_string().unwrap();
        assert!(json.contains("站前健身房"));
        let venues = read_venues_from_geojson_str(&json).unwrap();
        assert_eq!(venues.len(), 3);
        assert_eq!(venues[1].category, "室內游泳池");
        assert_eq!(venues[1].mobile, "0912345678");
    }
}
