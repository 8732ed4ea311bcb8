//! Keeps the map markers in step with the filtered subset and handles
//! fly-to + highlight when a venue is selected.

use crate::config::{
    FOCUS_DURATION_SEC, FOCUS_ZOOM, HIGHLIGHT_DURATION_MS, HIGHLIGHT_MAX_ATTEMPTS,
    HIGHLIGHT_RETRY_MS, HIGHLIGHT_SETTLE_MS,
};
use crate::filter::VenueHit;
use crate::geolocation::UserLocation;
use crate::highlight::{self, Generation, HighlightStatus, RetryTiming};
use crate::utils::escape_html;
use crate::{Coordinate, Venue};
use log::{debug, warn};
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

/// Marker look for a venue's icon key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconStyle {
    /// Font Awesome glyph class.
    pub glyph: &'static str,
    /// CSS class on the marker bubble.
    pub class_name: &'static str,
}

pub const DEFAULT_ICON: IconStyle = IconStyle {
    glyph: "fa-map-marker",
    class_name: "marker-default",
};

pub fn icon_for(key: &str) -> IconStyle {
    let (glyph, class_name) = match key {
        "dumbbell" => ("fa-dumbbell", "marker-dumbbell"),
        "yoga" => ("fa-spa", "marker-yoga"),
        "swimming" => ("fa-person-swimming", "marker-swimming"),
        "swimming-indoor" => ("fa-person-swimming", "marker-swimming-indoor"),
        "swimming-outdoor" => ("fa-person-swimming", "marker-swimming-outdoor"),
        "swimming-both" => ("fa-person-swimming", "marker-swimming-both"),
        "sports" => ("fa-baseball", "marker-sports"),
        _ => return DEFAULT_ICON,
    };
    IconStyle { glyph, class_name }
}

impl IconStyle {
    pub fn html(&self) -> String {
        format!(
            "<div class=\"custom-marker {}\"><i class=\"fas {}\"></i></div>",
            self.class_name, self.glyph
        )
    }
}

/// Hover label: name, category, address.
pub fn tooltip_html(venue: &Venue) -> String {
    format!(
        "<div class=\"tooltip-name\">{}</div>\
         <div class=\"tooltip-type\">{}</div>\
         <div class=\"tooltip-address\">{}</div>",
        escape_html(&venue.name),
        escape_html(&venue.category),
        escape_html(&venue.address)
    )
}

pub type SelectHandler = Rc<dyn Fn(Rc<Venue>)>;

/// What the app needs from the map widget.
pub trait MapView {
    type Marker: Clone + 'static;

    /// Drop every venue marker (the user marker stays).
    fn clear_markers(&self);
    fn add_marker(
        &self,
        venue: &Rc<Venue>,
        icon: IconStyle,
        tooltip: &str,
        on_click: SelectHandler,
    ) -> Self::Marker;
    /// Animated move; must not jump.
    fn fly_to(&self, at: Coordinate, zoom: f64, duration_sec: f64);
    fn set_view(&self, at: Coordinate, zoom: f64);
    /// Replace the user-position marker.
    fn show_user_marker(&self, location: &UserLocation);
    /// Remove any highlight and cancel its pending expiry.
    fn clear_highlight(&self);
    /// Highlight the marker's rendered element for `duration_ms`. Returns
    /// false while the marker has no element (e.g. still inside a cluster).
    /// Only the latest highlight owns an expiry.
    fn highlight(&self, marker: &Self::Marker, duration_ms: u32) -> bool;
}

pub struct MapSync<V: MapView> {
    view: Rc<V>,
    markers: HashMap<String, V::Marker>,
    generation: Generation,
}

impl<V: MapView + 'static> MapSync<V> {
    pub fn new(view: V) -> Self {
        Self {
            view: Rc::new(view),
            markers: HashMap::new(),
            generation: Generation::default(),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn has_marker(&self, venue_id: &str) -> bool {
        self.markers.contains_key(venue_id)
    }

    /// Rebuild every marker from the filtered subset.
    pub fn sync(&mut self, hits: &[VenueHit], on_select: &SelectHandler) {
        self.view.clear_markers();
        self.markers.clear();

        for hit in hits {
            let venue = &hit.venue;
            let marker = self.view.add_marker(
                venue,
                icon_for(&venue.icon),
                &tooltip_html(venue),
                Rc::clone(on_select),
            );
            self.markers.insert(venue.id.clone(), marker);
        }
        debug!("Map now shows {} markers", self.markers.len());
    }

    pub fn show_user(&self, location: &UserLocation, zoom: f64) {
        self.view.show_user_marker(location);
        self.view.set_view(location.coordinate, zoom);
    }

    /// Fly to `venue` and start the highlight retry loop.
    ///
    /// Returns `None` when the venue has no marker (filtered out); the map
    /// still moves. The returned future must be driven by the caller; `sleep`
    /// supplies the timer.
    pub fn focus<S, F>(&self, venue: &Venue, sleep: S) -> Option<impl Future<Output = HighlightStatus>>
    where
        S: Fn(u32) -> F + 'static,
        F: Future<Output = ()> + 'static,
    {
        self.generation.advance();
        self.view.clear_highlight();
        self.view.fly_to(venue.coordinate, FOCUS_ZOOM, FOCUS_DURATION_SEC);

        let Some(marker) = self.markers.get(&venue.id).cloned() else {
            warn!("No marker for venue {}", venue.id);
            return None;
        };

        let view = Rc::clone(&self.view);
        let timing = RetryTiming {
            settle_ms: HIGHLIGHT_SETTLE_MS,
            retry_ms: HIGHLIGHT_RETRY_MS,
            max_attempts: HIGHLIGHT_MAX_ATTEMPTS,
        };
        Some(highlight::run(
            venue.id.clone(),
            self.generation.clone(),
            timing,
            move || view.highlight(&marker, HIGHLIGHT_DURATION_MS),
            sleep,
        ))
    }
}
