//! Application state: the loaded venues plus everything derived from user input.

use crate::filter::{apply_filters, sort_by_distance, FilterState, VenueHit};
use crate::geolocation::UserLocation;
use crate::search::{search, SearchOutcome};
use crate::Venue;
use log::info;
use std::rc::Rc;

/// Single owner of the venue collection, filter state, user location and
/// the current filtered subset. Every mutator recomputes the subset and
/// returns it so callers can push it to the map and list in one go.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    venues: Vec<Rc<Venue>>,
    filter: FilterState,
    user_location: Option<UserLocation>,
    filtered: Vec<VenueHit>,
}

impl AppState {
    /// Before any filter event the subset is simply the whole collection.
    pub fn new(venues: Vec<Rc<Venue>>) -> Self {
        let filtered = venues.iter().cloned().map(VenueHit::unranked).collect();
        Self {
            venues,
            filter: FilterState::default(),
            user_location: None,
            filtered,
        }
    }

    /// Swap in a freshly loaded collection. Input made while loading (a
    /// location fix, filter toggles) still applies to it.
    pub fn set_venues(&mut self, venues: Vec<Rc<Venue>>) -> &[VenueHit] {
        info!("Replacing venue collection with {} venues", venues.len());
        if self.user_location.is_none() && self.filter == FilterState::default() {
            *self = Self::new(venues);
            return &self.filtered;
        }
        self.venues = venues;
        self.recompute()
    }

    pub fn venues(&self) -> &[Rc<Venue>] {
        &self.venues
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn user_location(&self) -> Option<UserLocation> {
        self.user_location
    }

    pub fn filtered(&self) -> &[VenueHit] {
        &self.filtered
    }

    pub fn find(&self, id: &str) -> Option<Rc<Venue>> {
        self.venues.iter().find(|v| v.id == id).cloned()
    }

    pub fn set_category(&mut self, category: &str, checked: bool) -> &[VenueHit] {
        self.filter.set_category(category, checked);
        self.recompute()
    }

    pub fn set_all_categories(&mut self, checked: bool) -> &[VenueHit] {
        self.filter.set_all(checked);
        self.recompute()
    }

    pub fn set_radius(&mut self, radius_km: f64) -> &[VenueHit] {
        self.filter.radius_km = radius_km;
        self.recompute()
    }

    /// Adopt a new user location (last writer wins), reveal the radius
    /// control and re-filter nearest first.
    pub fn set_user_location(&mut self, location: UserLocation) -> &[VenueHit] {
        info!(
            "User location set to {:?} ({:?})",
            location.coordinate, location.source
        );
        self.user_location = Some(location);
        self.filter.radius_active = true;
        self.recompute()
    }

    pub fn search(&self, query: &str, limit: usize) -> SearchOutcome {
        search(&self.venues, query, limit)
    }

    fn recompute(&mut self) -> &[VenueHit] {
        let user = self.user_location.map(|l| l.coordinate);
        let mut hits = apply_filters(&self.venues, &self.filter, user);
        if user.is_some() {
            sort_by_distance(&mut hits);
        }
        self.filtered = hits;
        &self.filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::venue;
    use crate::filter::{CATEGORIES, SWIMMING};
    use crate::Coordinate;

    fn ids(hits: &[VenueHit]) -> Vec<&str> {
        hits.iter().map(|h| h.venue.id.as_str()).collect()
    }

    fn three_venues() -> AppState {
        AppState::new(vec![
            venue("gym", "健身房", 25.0478, 121.5170),
            venue("yoga", "瑜珈教室", 25.0478, 121.5319),
            venue("pool", "室內游泳池", 25.0330, 121.5654),
        ])
    }

    #[test]
    fn starts_with_everything_in_load_order() {
        let state = three_venues();
        assert_eq!(ids(state.filtered()), vec!["gym", "yoga", "pool"]);
        assert!(!state.filter().radius_active);
    }

    #[test]
    fn swimming_only_then_radius_around_the_gym() {
        let mut state = three_venues();
        state.set_all_categories(false);
        assert!(state.filtered().is_empty());

        assert_eq!(ids(state.set_category(SWIMMING, true)), vec!["pool"]);

        state.set_all_categories(true);
        state.set_user_location(UserLocation::device(Coordinate::new(25.0478, 121.5170)));
        let hits = state.set_radius(1.0);
        assert_eq!(ids(hits), vec!["gym"]);
        assert_eq!(hits[0].distance_km, Some(0.0));
    }

    #[test]
    fn location_reveals_radius_and_sorts_nearest_first() {
        let mut state = three_venues();
        state.set_radius(10.0);
        assert_eq!(ids(state.filtered()), vec!["gym", "yoga", "pool"]);

        let hits = state.set_user_location(UserLocation::device(Coordinate::new(25.0330, 121.5654)));
        assert_eq!(ids(hits), vec!["pool", "yoga", "gym"]);
        assert!(state.filter().radius_active);
    }

    #[test]
    fn later_location_replaces_earlier_one() {
        let mut state = three_venues();
        state.set_user_location(UserLocation::device(Coordinate::new(25.0330, 121.5654)));
        state.set_user_location(UserLocation::landmark());
        assert_eq!(state.user_location(), Some(UserLocation::landmark()));
        assert_eq!(state.filtered()[0].venue.id, "gym");
    }

    #[test]
    fn location_fixed_before_load_survives_it() {
        let mut state = AppState::default();
        state.set_user_location(UserLocation::device(Coordinate::new(25.0330, 121.5654)));
        state.set_radius(10.0);
        assert!(state.filtered().is_empty());

        let loaded = three_venues().venues().to_vec();
        let hits = state.set_venues(loaded);
        assert_eq!(ids(hits), vec!["pool", "yoga", "gym"]);
        assert!(hits.iter().all(|h| h.distance_km.is_some()));
        assert!(state.filter().radius_active);
        assert_eq!(state.user_location().map(|l| l.coordinate), Some(Coordinate::new(25.0330, 121.5654)));
    }

    #[test]
    fn plain_load_keeps_load_order() {
        let mut state = AppState::default();
        let hits = state.set_venues(three_venues().venues().to_vec());
        assert_eq!(ids(hits), vec!["gym", "yoga", "pool"]);
        assert!(hits.iter().all(|h| h.distance_km.is_none()));
    }

    #[test]
    fn search_covers_filtered_out_venues() {
        let mut state = three_venues();
        state.set_all_categories(false);
        match state.search("venue pool", 10) {
            SearchOutcome::Matches(found) => assert_eq!(found[0].id, "pool"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(state.find("yoga").map(|v| v.category.clone()), Some(CATEGORIES[1].to_string()));
    }
}
