//! Application-level configuration constants.

use crate::Coordinate;

// Data
pub const DATA_URL: &str = "sports_data.geojson";
pub const LOAD_FAILED_MESSAGE: &str = "載入資料失敗，請重新整理頁面";

// UI Behavior
pub const DEBOUNCE_MS: u32 = 300;
pub const SEARCH_RESULT_LIMIT: usize = 10;
pub const LOCATED_BADGE_MS: u32 = 2_000;

// Radius filter (kilometres)
pub const DEFAULT_RADIUS_KM: f64 = 2.0;
pub const MIN_RADIUS_KM: f64 = 0.5;
pub const MAX_RADIUS_KM: f64 = 10.0;
pub const RADIUS_STEP_KM: f64 = 0.5;

// Map view
pub const MAP_CONTAINER_ID: &str = "map";
pub const MAP_CENTER: Coordinate = Coordinate::new(25.0478, 121.5319);
pub const INITIAL_ZOOM: f64 = 12.0;
pub const LOCATE_ZOOM: f64 = 14.0;
pub const MAX_ZOOM: u8 = 19;
pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
pub const CLUSTER_RADIUS_PX: u32 = 50;

// Highlight-on-select
pub const FOCUS_ZOOM: f64 = 18.0;
pub const FOCUS_DURATION_SEC: f64 = 0.8;
/// Must outlast the fly-to animation so clusters have expanded.
pub const HIGHLIGHT_SETTLE_MS: u32 = 900;
pub const HIGHLIGHT_RETRY_MS: u32 = 100;
pub const HIGHLIGHT_MAX_ATTEMPTS: u32 = 10;
pub const HIGHLIGHT_DURATION_MS: u32 = 2_000;

// Quick-locate landmark
pub const LANDMARK: Coordinate = Coordinate::new(25.0478, 121.5170);
pub const LANDMARK_LABEL: &str = "臺北車站";
