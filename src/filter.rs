//! Category and radius filtering over the loaded venues.

use crate::config::DEFAULT_RADIUS_KM;
use crate::{Coordinate, Venue};
use log::debug;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Generic swimming category. Selecting it also matches every
/// indoor/outdoor/combined pool variant by substring.
pub const SWIMMING: &str = "游泳池";

/// Categories offered as checkboxes, in display order.
pub const CATEGORIES: [&str; 7] = [
    "健身房",
    "瑜珈教室",
    SWIMMING,
    "室內游泳池",
    "室外游泳池",
    "室內外游泳池",
    "撞球場及攀岩場",
];

#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub selected: BTreeSet<String>,
    pub radius_km: f64,
    /// The radius control is only shown, and only applied, once a location is known.
    pub radius_active: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            selected: CATEGORIES.iter().map(|c| c.to_string()).collect(),
            radius_km: DEFAULT_RADIUS_KM,
            radius_active: false,
        }
    }
}

impl FilterState {
    pub fn set_category(&mut self, category: &str, checked: bool) {
        if checked {
            self.selected.insert(category.to_string());
        } else {
            self.selected.remove(category);
        }
    }

    pub fn set_all(&mut self, checked: bool) {
        if checked {
            self.selected = CATEGORIES.iter().map(|c| c.to_string()).collect();
        } else {
            self.selected.clear();
        }
    }

    pub fn is_selected(&self, category: &str) -> bool {
        self.selected.contains(category)
    }

    /// True when every checkbox is ticked; drives the "select all" box.
    pub fn all_selected(&self) -> bool {
        CATEGORIES.iter().all(|c| self.selected.contains(*c))
    }
}

/// A venue in the filtered subset, with its distance from the user when known.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueHit {
    pub venue: Rc<Venue>,
    pub distance_km: Option<f64>,
}

impl VenueHit {
    pub fn unranked(venue: Rc<Venue>) -> Self {
        Self {
            venue,
            distance_km: None,
        }
    }
}

pub fn matches_category(category: &str, selected: &BTreeSet<String>) -> bool {
    if selected.contains(category) {
        return true;
    }
    selected.contains(SWIMMING) && category.contains(SWIMMING)
}

/// Derive the filtered subset in load order.
///
/// No selected category yields nothing. With a user location every hit
/// carries its distance, and when the radius is active hits farther than
/// `radius_km` are dropped (the boundary itself is kept).
pub fn apply_filters(
    venues: &[Rc<Venue>],
    filter: &FilterState,
    user: Option<Coordinate>,
) -> Vec<VenueHit> {
    if filter.selected.is_empty() {
        debug!("No category selected, filtered subset is empty");
        return Vec::new();
    }

    let hits: Vec<VenueHit> = venues
        .iter()
        .filter(|v| matches_category(&v.category, &filter.selected))
        .filter_map(|v| {
            let distance_km = user.map(|u| u.distance_km(&v.coordinate));
            if let Some(d) = distance_km {
                if filter.radius_active && d > filter.radius_km {
                    return None;
                }
            }
            Some(VenueHit {
                venue: Rc::clone(v),
                distance_km,
            })
        })
        .collect();

    debug!(
        "Filter kept {}/{} venues ({} categories, radius {})",
        hits.len(),
        venues.len(),
        filter.selected.len(),
        if filter.radius_active && user.is_some() {
            format!("{} km", filter.radius_km)
        } else {
            "off".to_string()
        }
    );
    hits
}

/// Stable ascending sort by distance; hits without a distance keep their order at the end.
pub fn sort_by_distance(hits: &mut [VenueHit]) {
    hits.sort_by(|a, b| match (a.distance_km, b.distance_km) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn venue(id: &str, category: &str, lat: f64, lon: f64) -> Rc<Venue> {
        Rc::new(Venue {
            id: id.to_string(),
            name: format!("venue {}", id),
            category: category.to_string(),
            icon: String::new(),
            address: String::new(),
            district: String::new(),
            landline: String::new(),
            extension: String::new(),
            mobile: String::new(),
            organization: String::new(),
            operator: String::new(),
            coordinate: Coordinate::new(lat, lon),
        })
    }

    fn only(categories: &[&str]) -> FilterState {
        FilterState {
            selected: categories.iter().map(|c| c.to_string()).collect(),
            ..FilterState::default()
        }
    }

    fn ids(hits: &[VenueHit]) -> Vec<&str> {
        hits.iter().map(|h| h.venue.id.as_str()).collect()
    }

    fn sample() -> Vec<Rc<Venue>> {
        vec![
            venue("gym", "健身房", 25.0478, 121.5170),
            venue("yoga", "瑜珈教室", 25.0478, 121.5319),
            venue("pool", "室內游泳池", 25.0330, 121.5654),
            venue("outdoor", "室外游泳池", 25.0600, 121.5200),
            venue("misc", "桌球", 25.0500, 121.5100),
        ]
    }

    #[test]
    fn nothing_selected_yields_nothing_even_with_location() {
        let mut filter = only(&[]);
        filter.radius_active = true;
        filter.radius_km = 100.0;
        let hits = apply_filters(&sample(), &filter, Some(Coordinate::new(25.0478, 121.5170)));
        assert!(hits.is_empty());
    }

    #[test]
    fn generic_swimming_matches_every_pool_variant() {
        let hits = apply_filters(&sample(), &only(&[SWIMMING]), None);
        assert_eq!(ids(&hits), vec!["pool", "outdoor"]);
        assert!(hits.iter().all(|h| h.distance_km.is_none()));
    }

    #[test]
    fn specific_pool_variant_does_not_pull_in_siblings() {
        let hits = apply_filters(&sample(), &only(&["室外游泳池"]), None);
        assert_eq!(ids(&hits), vec!["outdoor"]);
    }

    #[test]
    fn free_text_categories_need_an_exact_selection() {
        assert!(apply_filters(&sample(), &FilterState::default(), None)
            .iter()
            .all(|h| h.venue.id != "misc"));
        let hits = apply_filters(&sample(), &only(&["桌球"]), None);
        assert_eq!(ids(&hits), vec!["misc"]);
    }

    #[test]
    fn radius_splits_matching_venues_by_distance() {
        let user = Coordinate::new(25.0478, 121.5170);
        let mut filter = FilterState::default();
        filter.radius_active = true;
        filter.radius_km = 2.0;

        let venues = sample();
        let hits = apply_filters(&venues, &filter, Some(user));
        for hit in &hits {
            assert!(hit.distance_km.unwrap() <= 2.0);
        }
        for v in venues.iter().filter(|v| matches_category(&v.category, &filter.selected)) {
            if !hits.iter().any(|h| h.venue.id == v.id) {
                assert!(user.distance_km(&v.coordinate) > 2.0);
            }
        }
        assert!(ids(&hits).contains(&"gym"));
        assert!(!ids(&hits).contains(&"pool"));
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let user = Coordinate::new(25.0478, 121.5170);
        let venues = sample();
        let exact = user.distance_km(&venues[1].coordinate);
        let filter = FilterState {
            radius_km: exact,
            radius_active: true,
            ..only(&["瑜珈教室"])
        };
        assert_eq!(ids(&apply_filters(&venues, &filter, Some(user))), vec!["yoga"]);
    }

    #[test]
    fn inactive_radius_only_annotates_distance() {
        let user = Coordinate::new(25.0478, 121.5170);
        let hits = apply_filters(&sample(), &FilterState::default(), Some(user));
        assert_eq!(hits.len(), 4);
        assert!(hits.iter().all(|h| h.distance_km.is_some()));
    }

    #[test]
    fn sorts_nearest_first() {
        let user = Coordinate::new(25.0330, 121.5654);
        let mut hits = apply_filters(&sample(), &FilterState::default(), Some(user));
        sort_by_distance(&mut hits);
        assert_eq!(hits[0].venue.id, "pool");
        assert!(hits
            .windows(2)
            .all(|w| w[0].distance_km.unwrap() <= w[1].distance_km.unwrap()));
    }

    #[test]
    fn select_all_tracks_every_checkbox() {
        let mut filter = FilterState::default();
        assert!(filter.all_selected());
        filter.set_category("瑜珈教室", false);
        assert!(!filter.all_selected());
        filter.set_all(false);
        assert!(filter.selected.is_empty());
        filter.set_all(true);
        assert!(filter.all_selected());
    }
}
