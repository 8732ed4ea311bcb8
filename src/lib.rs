use log::{debug, info, warn};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

pub mod config;
pub mod filter;
pub mod geojson;
pub mod geolocation;
pub mod highlight;
pub mod leaflet;
pub mod map_sync;
pub mod preprocess;
pub mod search;
pub mod store;
pub mod utils;

use geojson::{FeatureCollection, VenueProperties};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 point. Latitude first, matching how the map library takes it.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }

    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        distance_km(self.lat, self.lon, other.lat, other.lon)
    }

    /// `[lat, lon]`, the order Leaflet expects.
    pub fn lat_lng(&self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

/// A single sports facility. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub category: String,
    pub icon: String,
    pub address: String,
    pub district: String,
    pub landline: String,
    pub extension: String,
    pub mobile: String,
    pub organization: String,
    pub operator: String,
    pub coordinate: Coordinate,
}

impl Venue {
    fn from_feature(properties: VenueProperties, lon: f64, lat: f64) -> Self {
        Self {
            id: properties.id,
            name: properties.name,
            category: properties.category,
            icon: properties.icon,
            address: properties.address,
            district: properties.district,
            landline: properties.landline,
            extension: properties.extension,
            mobile: properties.mobile,
            organization: properties.organization,
            operator: properties.operator,
            coordinate: Coordinate::new(lat, lon),
        }
    }
}

/// Great-circle distance in kilometres between two points (haversine).
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[derive(Debug)]
pub enum LoadError {
    Fetch(String),
    Status { code: u16, url: String },
    Parse(serde_json::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Fetch(msg) => write!(f, "Failed to fetch venue data: {}", msg),
            LoadError::Status { code, url } => {
                write!(f, "Venue data request to {} returned HTTP {}", url, code)
            }
            LoadError::Parse(e) => write!(f, "Venue data is not a valid feature collection: {}", e),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Parse(e)
    }
}

/// Parse a GeoJSON feature collection into venues, in file order.
///
/// Features with an out-of-range coordinate or an id already seen are
/// skipped with a warning; the rest of the file still loads.
pub fn read_venues_from_geojson_str(content: &str) -> Result<Vec<Rc<Venue>>, LoadError> {
    let collection: FeatureCollection = serde_json::from_str(content)?;
    let mut seen_ids = HashSet::new();
    let mut venues = Vec::with_capacity(collection.features.len());

    for (i, feature) in collection.features.into_iter().enumerate() {
        let [lon, lat, ..] = feature.geometry.coordinates[..] else {
            warn!(
                "Feature {} ('{}') has no [lon, lat] position, skipping",
                i, feature.properties.name
            );
            continue;
        };
        let venue = Venue::from_feature(feature.properties, lon, lat);

        if venue.id.trim().is_empty() {
            warn!("Feature {} ('{}') has no id, skipping", i, venue.name);
            continue;
        }

        if !venue.coordinate.is_valid() {
            warn!(
                "Feature {} ('{}') has invalid coordinate {:?}, skipping",
                i, venue.name, venue.coordinate
            );
            continue;
        }

        if !seen_ids.insert(venue.id.clone()) {
            warn!("Duplicate venue id '{}' at feature {}, skipping", venue.id, i);
            continue;
        }

        debug!("Loaded venue {} ({})", venue.id, venue.category);
        venues.push(Rc::new(venue));
    }

    info!("Successfully loaded {} venues", venues.len());
    Ok(venues)
}

/// Fetch the static dataset once and parse it.
pub async fn fetch_venues(url: &str) -> Result<Vec<Rc<Venue>>, LoadError> {
    let response = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| LoadError::Fetch(e.to_string()))?;

    if !response.ok() {
        return Err(LoadError::Status {
            code: response.status(),
            url: url.to_string(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| LoadError::Fetch(e.to_string()))?;
    read_venues_from_geojson_str(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAIPEI_CENTER: Coordinate = Coordinate::new(25.0478, 121.5319);
    const TAIPEI_STATION: Coordinate = Coordinate::new(25.0478, 121.5170);

    #[test]
    fn distance_is_symmetric_and_zero_on_same_point() {
        let a = TAIPEI_CENTER;
        let b = Coordinate::new(25.0330, 121.5654);
        assert_eq!(a.distance_km(&b), b.distance_km(&a));
        assert_eq!(a.distance_km(&a), 0.0);
    }

    #[test]
    fn distance_between_city_center_and_station() {
        let d = TAIPEI_CENTER.distance_km(&TAIPEI_STATION);
        assert!((d - 1.5).abs() < 0.1, "got {} km", d);
    }

    #[test]
    fn distance_respects_triangle_inequality() {
        let a = TAIPEI_CENTER;
        let b = Coordinate::new(25.0330, 121.5654);
        let c = Coordinate::new(25.1330, 121.4990);
        assert!(a.distance_km(&c) <= a.distance_km(&b) + b.distance_km(&c) + 1e-9);
    }

    #[test]
    fn distance_across_antimeridian_stays_short() {
        let d = distance_km(0.0, 179.9, 0.0, -179.9);
        assert!(d < 25.0, "got {} km", d);
    }

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [121.5170, 25.0478] },
                "properties": {
                    "id": "1", "名稱": "站前健身房", "場館類型": "健身房", "icon": "dumbbell",
                    "地址": "臺北市中正區忠孝西路一段1號", "行政區": "中正區",
                    "市話": "0223456789", "分機": "12", "行動電話": "",
                    "所屬單位": "", "經營主體": "站前公司"
                }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [21.5, 25.0] },
                "properties": { "id": 2, "名稱": "bad lon", "場館類型": "瑜珈教室" }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [121.55, 95.0] },
                "properties": { "id": "3", "名稱": "bad lat" }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [121.52, 25.05] },
                "properties": { "id": "1", "名稱": "duplicate" }
            }
        ]
    }"#;

    #[test]
    fn reads_features_and_skips_invalid_ones() {
        let venues = read_venues_from_geojson_str(SAMPLE).unwrap();
        let ids: Vec<&str> = venues.iter().map(|v| v.id.as_str()).collect();
        // Feature 2 has a suspicious but in-range longitude, so it stays.
        assert_eq!(ids, vec!["1", "2"]);

        let gym = &venues[0];
        assert_eq!(gym.name, "站前健身房");
        assert_eq!(gym.coordinate, TAIPEI_STATION);
        assert_eq!(gym.extension, "12");
        assert_eq!(gym.organization, "");
        assert_eq!(venues[1].address, "");
    }

    #[test]
    fn feature_without_id_is_skipped_alone() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [121.5170, 25.0478] },
                    "properties": { "名稱": "無編號", "場館類型": "健身房" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [121.5200, 25.0400] },
                    "properties": { "id": null, "名稱": "空編號" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [121.5319, 25.0478] },
                    "properties": { "id": "7", "名稱": "有編號", "場館類型": "瑜珈教室" }
                }
            ]
        }"#;
        let venues = read_venues_from_geojson_str(content).unwrap();
        let ids: Vec<&str> = venues.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["7"]);
    }

    #[test]
    fn positions_with_altitude_load_and_short_ones_are_skipped() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [121.5170, 25.0478, 12.5] },
                    "properties": { "id": "a", "名稱": "高架場館" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [121.5170] },
                    "properties": { "id": "b", "名稱": "缺緯度" }
                }
            ]
        }"#;
        let venues = read_venues_from_geojson_str(content).unwrap();
        assert_eq!(venues.len(), 1);
        assert_eq!(venues[0].id, "a");
        assert_eq!(venues[0].coordinate, TAIPEI_STATION);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = read_venues_from_geojson_str("{\"features\": 3}").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
        assert!(err.to_string().starts_with("Venue data is not a valid"));
    }
}
