//! JavaScript interop for Leaflet and the markercluster plugin.
//! Both are loaded as globals (`L`) from index.html.

use crate::config::{
    CLUSTER_RADIUS_PX, INITIAL_ZOOM, MAP_CENTER, MAX_ZOOM, TILE_ATTRIBUTION, TILE_URL,
};
use crate::geolocation::UserLocation;
use crate::map_sync::{IconStyle, MapView, SelectHandler};
use crate::utils::escape_html;
use crate::{Coordinate, Venue};
use gloo_timers::callback::Timeout;
use log::warn;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen]
extern "C" {
    pub type LeafletMap;
    pub type TileLayer;
    pub type ClusterGroup;
    #[derive(Clone)]
    pub type Marker;

    #[wasm_bindgen(js_namespace = L, js_name = map)]
    fn l_map(id: &str) -> LeafletMap;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    fn l_tile_layer(url: &str, options: &JsValue) -> TileLayer;

    #[wasm_bindgen(js_namespace = L, js_name = markerClusterGroup)]
    fn l_marker_cluster_group(options: &JsValue) -> ClusterGroup;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    fn l_marker(lat_lng: &JsValue, options: &JsValue) -> Marker;

    #[wasm_bindgen(js_namespace = L, js_name = divIcon)]
    fn l_div_icon(options: &JsValue) -> JsValue;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &LeafletMap, center: &JsValue, zoom: f64);

    #[wasm_bindgen(method, js_name = flyTo)]
    fn fly_to(this: &LeafletMap, center: &JsValue, zoom: f64, options: &JsValue);

    #[wasm_bindgen(method, js_name = addLayer)]
    fn add_cluster(this: &LeafletMap, layer: &ClusterGroup);

    #[wasm_bindgen(method, js_name = removeLayer)]
    fn remove_marker(this: &LeafletMap, layer: &Marker);

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_tiles_to(this: &TileLayer, map: &LeafletMap);

    #[wasm_bindgen(method, js_name = clearLayers)]
    fn clear_layers(this: &ClusterGroup);

    #[wasm_bindgen(method, js_name = addLayer)]
    fn add_marker(this: &ClusterGroup, marker: &Marker);

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &Marker, map: &LeafletMap);

    #[wasm_bindgen(method, js_name = bindTooltip)]
    fn bind_tooltip(this: &Marker, content: &str, options: &JsValue);

    #[wasm_bindgen(method)]
    fn on(this: &Marker, event: &str, handler: &js_sys::Function);

    /// `undefined` until the marker is rendered outside a cluster.
    #[wasm_bindgen(method, js_name = getElement)]
    fn get_element(this: &Marker) -> Option<web_sys::Element>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TileOptions {
    attribution: &'static str,
    max_zoom: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClusterOptions {
    max_cluster_radius: u32,
    spiderfy_on_max_zoom: bool,
    show_coverage_on_hover: bool,
    zoom_to_bounds_on_click: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DivIconOptions {
    html: String,
    class_name: &'static str,
    icon_size: [u32; 2],
    icon_anchor: [u32; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    popup_anchor: Option<[i32; 2]>,
}

impl DivIconOptions {
    fn marker(html: String) -> Self {
        Self {
            html,
            class_name: "",
            icon_size: [32, 32],
            icon_anchor: [16, 16],
            popup_anchor: None,
        }
    }
}

#[derive(Serialize)]
struct TooltipOptions {
    #[serde(rename = "className", skip_serializing_if = "Option::is_none")]
    class_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    direction: Option<&'static str>,
    permanent: bool,
}

#[derive(Serialize)]
struct FlyToOptions {
    duration: f64,
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or_else(|e| {
        warn!("Could not convert Leaflet options: {}", e);
        JsValue::UNDEFINED
    })
}

fn lat_lng(at: Coordinate) -> JsValue {
    to_js(&at.lat_lng())
}

fn marker_with_icon(at: Coordinate, icon: JsValue) -> Marker {
    // The icon is a live Leaflet object, so the options are built by hand.
    let options = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&options, &JsValue::from_str("icon"), &icon);
    l_marker(&lat_lng(at), &options)
}

/// [`MapView`] backed by a Leaflet map with one marker cluster layer.
pub struct LeafletView {
    map: LeafletMap,
    cluster: ClusterGroup,
    user_marker: RefCell<Option<Marker>>,
    // Dropping the Timeout cancels the pending un-highlight.
    highlight_expiry: RefCell<Option<Timeout>>,
    // Click closures must live as long as their markers.
    handlers: RefCell<Vec<Closure<dyn FnMut()>>>,
}

impl LeafletView {
    /// Create the map inside the element with id `container_id`.
    pub fn mount(container_id: &str) -> Self {
        let map = l_map(container_id);
        map.set_view(&lat_lng(MAP_CENTER), INITIAL_ZOOM);

        l_tile_layer(
            TILE_URL,
            &to_js(&TileOptions {
                attribution: TILE_ATTRIBUTION,
                max_zoom: MAX_ZOOM,
            }),
        )
        .add_tiles_to(&map);

        let cluster = l_marker_cluster_group(&to_js(&ClusterOptions {
            max_cluster_radius: CLUSTER_RADIUS_PX,
            spiderfy_on_max_zoom: true,
            show_coverage_on_hover: false,
            zoom_to_bounds_on_click: true,
        }));
        map.add_cluster(&cluster);

        Self {
            map,
            cluster,
            user_marker: RefCell::new(None),
            highlight_expiry: RefCell::new(None),
            handlers: RefCell::new(Vec::new()),
        }
    }
}

impl MapView for LeafletView {
    type Marker = Marker;

    fn clear_markers(&self) {
        self.cluster.clear_layers();
        self.handlers.borrow_mut().clear();
    }

    fn add_marker(
        &self,
        venue: &Rc<Venue>,
        icon: IconStyle,
        tooltip: &str,
        on_click: SelectHandler,
    ) -> Marker {
        let mut icon_options = DivIconOptions::marker(icon.html());
        icon_options.popup_anchor = Some([0, -16]);
        let marker = marker_with_icon(venue.coordinate, l_div_icon(&to_js(&icon_options)));

        marker.bind_tooltip(
            tooltip,
            &to_js(&TooltipOptions {
                class_name: Some("custom-tooltip"),
                direction: Some("top"),
                permanent: false,
            }),
        );

        let venue = Rc::clone(venue);
        let handler = Closure::<dyn FnMut()>::new(move || on_click(Rc::clone(&venue)));
        marker.on("click", handler.as_ref().unchecked_ref());
        self.handlers.borrow_mut().push(handler);

        self.cluster.add_marker(&marker);
        marker
    }

    fn fly_to(&self, at: Coordinate, zoom: f64, duration_sec: f64) {
        self.map.fly_to(
            &lat_lng(at),
            zoom,
            &to_js(&FlyToOptions {
                duration: duration_sec,
            }),
        );
    }

    fn set_view(&self, at: Coordinate, zoom: f64) {
        self.map.set_view(&lat_lng(at), zoom);
    }

    fn show_user_marker(&self, location: &UserLocation) {
        if let Some(old) = self.user_marker.borrow_mut().take() {
            self.map.remove_marker(&old);
        }

        let html = format!(
            "<div class=\"custom-marker\" style=\"background: #F44336;\"><i class=\"fas {}\"></i></div>",
            location.icon()
        );
        let marker = marker_with_icon(
            location.coordinate,
            l_div_icon(&to_js(&DivIconOptions::marker(html))),
        );
        marker.add_to(&self.map);
        marker.bind_tooltip(
            &escape_html(location.label()),
            &to_js(&TooltipOptions {
                class_name: None,
                direction: None,
                permanent: false,
            }),
        );
        *self.user_marker.borrow_mut() = Some(marker);
    }

    fn clear_highlight(&self) {
        self.highlight_expiry.borrow_mut().take();
        let Ok(lit) = gloo_utils::document().query_selector_all(".custom-marker.highlight") else {
            return;
        };
        for i in 0..lit.length() {
            if let Some(element) = lit.item(i).and_then(|n| n.dyn_into::<web_sys::Element>().ok()) {
                let _ = element.class_list().remove_1("highlight");
            }
        }
    }

    fn highlight(&self, marker: &Marker, duration_ms: u32) -> bool {
        let Some(bubble) = marker
            .get_element()
            .and_then(|el| el.query_selector(".custom-marker").ok().flatten())
        else {
            return false;
        };

        self.clear_highlight();
        let _ = bubble.class_list().add_1("highlight");
        let expiry = Timeout::new(duration_ms, move || {
            let _ = bubble.class_list().remove_1("highlight");
        });
        *self.highlight_expiry.borrow_mut() = Some(expiry);
        true
    }
}
