//! Sports venue map front-end built with Yew.
//! Wires the venue store, the Leaflet map, and the side panels.

use gloo_timers::callback::Timeout;
use gloo_timers::future::TimeoutFuture;
use log::{error, info, warn};
use sports_venue_map::config::{
    DATA_URL, LOAD_FAILED_MESSAGE, LOCATED_BADGE_MS, LOCATE_ZOOM, MAP_CONTAINER_ID,
    SEARCH_RESULT_LIMIT,
};
use sports_venue_map::filter::VenueHit;
use sports_venue_map::geolocation::{current_position, UserLocation};
use sports_venue_map::leaflet::LeafletView;
use sports_venue_map::map_sync::{MapSync, SelectHandler};
use sports_venue_map::store::AppState;
use sports_venue_map::{fetch_venues, Venue};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

mod components;
mod hooks;

use components::{
    CategoryFilter, DetailPanel, LocateButton, MapLocateButton, RadiusSlider, SearchBox, VenueList,
};
use hooks::{use_debounced_search, SearchFn};

type SharedState = Rc<RefCell<AppState>>;
type SharedMap = Rc<RefCell<Option<MapSync<LeafletView>>>>;

// ──────────────────────────────────────────────────────────────────────────────
// Helper functions

fn alert(message: &str) {
    if let Err(e) = gloo_utils::window().alert_with_message(message) {
        warn!("Could not show alert: {:?}", e);
    }
}

/// Mutate the state and push the recomputed subset to the map in the same task.
fn apply_change<F>(state: &SharedState, map: &SharedMap, on_marker: &SelectHandler, change: F)
where
    F: FnOnce(&mut AppState) -> &[VenueHit],
{
    let mut state = state.borrow_mut();
    let hits = change(&mut *state);
    if let Some(sync) = map.borrow_mut().as_mut() {
        sync.sync(hits, on_marker);
    }
}

/// Make `location` the user position: re-filter nearest first, then drop
/// the user marker and recentre.
fn adopt_location(
    state: &SharedState,
    map: &SharedMap,
    on_marker: &SelectHandler,
    location: UserLocation,
) {
    apply_change(state, map, on_marker, |s| s.set_user_location(location));
    if let Some(sync) = map.borrow().as_ref() {
        sync.show_user(&location, LOCATE_ZOOM);
    }
}

/// Primary application component wiring state, effects, and UI elements.
#[function_component(Main)]
fn main_component() -> Html {
    let state: SharedState = use_mut_ref(AppState::default);
    let map: SharedMap = use_mut_ref(|| None::<MapSync<LeafletView>>);
    let force_update = use_force_update();

    let loading = use_state(|| true);
    let detail = use_state(|| None::<Rc<Venue>>);
    let selected_id = use_state(|| None::<String>);
    let sidebar_collapsed = use_state(|| false);
    let locating = use_state(|| false);
    let map_locating = use_state(|| false);
    let map_located = use_state(|| false);

    // --- Selection: list row, search result or marker click ---
    let select_venue = {
        let detail = detail.clone();
        let selected_id = selected_id.clone();
        let map = map.clone();
        Callback::from(move |venue: Rc<Venue>| {
            info!("Selected venue {} ({})", venue.id, venue.name);
            selected_id.set(Some(venue.id.clone()));
            detail.set(Some(Rc::clone(&venue)));

            if let Some(sync) = map.borrow().as_ref() {
                if let Some(highlight) = sync.focus(&venue, TimeoutFuture::new) {
                    spawn_local(async move {
                        highlight.await;
                    });
                }
            }
        })
    };
    let on_marker: SelectHandler = {
        let select_venue = select_venue.clone();
        Rc::new(move |venue: Rc<Venue>| select_venue.emit(venue))
    };

    let search = {
        let state = state.clone();
        let run: SearchFn =
            Rc::new(move |query: &str| state.borrow().search(query, SEARCH_RESULT_LIMIT));
        use_debounced_search(run)
    };

    // Mount the map and load the dataset once
    {
        let state = state.clone();
        let map = map.clone();
        let loading = loading.clone();
        let force_update = force_update.clone();
        let on_marker = on_marker.clone();
        use_effect_with((), move |_| {
            *map.borrow_mut() = Some(MapSync::new(LeafletView::mount(MAP_CONTAINER_ID)));

            spawn_local(async move {
                match fetch_venues(DATA_URL).await {
                    Ok(venues) => {
                        apply_change(&state, &map, &on_marker, |s| s.set_venues(venues));
                        loading.set(false);
                        force_update.force_update();
                    }
                    Err(e) => {
                        error!("{}", e);
                        alert(LOAD_FAILED_MESSAGE);
                    }
                }
            });
        });
    }

    // Close the search dropdown on any click outside the search box
    {
        let dismiss = search.dismiss.clone();
        use_effect_with((), move |_| {
            let listener = Closure::<dyn Fn(web_sys::Event)>::new(move |e: web_sys::Event| {
                let inside = e
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                    .and_then(|el| el.closest(".search-input-container").ok().flatten())
                    .is_some();
                if !inside {
                    dismiss.emit(());
                }
            });
            let document = gloo_utils::document();
            let _ = document
                .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref());
            move || {
                let _ = document.remove_event_listener_with_callback(
                    "click",
                    listener.as_ref().unchecked_ref(),
                );
            }
        });
    }

    // --- Filter handlers ---
    let on_toggle = {
        let state = state.clone();
        let map = map.clone();
        let on_marker = on_marker.clone();
        let force_update = force_update.clone();
        Callback::from(move |(category, checked): (String, bool)| {
            apply_change(&state, &map, &on_marker, |s| s.set_category(&category, checked));
            force_update.force_update();
        })
    };

    let on_toggle_all = {
        let state = state.clone();
        let map = map.clone();
        let on_marker = on_marker.clone();
        let force_update = force_update.clone();
        Callback::from(move |checked: bool| {
            apply_change(&state, &map, &on_marker, |s| s.set_all_categories(checked));
            force_update.force_update();
        })
    };

    let on_radius = {
        let state = state.clone();
        let map = map.clone();
        let on_marker = on_marker.clone();
        let force_update = force_update.clone();
        Callback::from(move |radius_km: f64| {
            apply_change(&state, &map, &on_marker, |s| s.set_radius(radius_km));
            force_update.force_update();
        })
    };

    // --- Locate handlers ---
    let locate_with = {
        let state = state.clone();
        let map = map.clone();
        let on_marker = on_marker.clone();
        let force_update = force_update.clone();
        move |busy: UseStateHandle<bool>, located: Option<UseStateHandle<bool>>| {
            let state = state.clone();
            let map = map.clone();
            let on_marker = on_marker.clone();
            let force_update = force_update.clone();
            Callback::from(move |_: MouseEvent| {
                let state = state.clone();
                let map = map.clone();
                let on_marker = on_marker.clone();
                let force_update = force_update.clone();
                let busy = busy.clone();
                let located = located.clone();

                busy.set(true);
                spawn_local(async move {
                    let result = current_position().await;
                    busy.set(false);
                    match result {
                        Ok(coordinate) => {
                            adopt_location(&state, &map, &on_marker, UserLocation::device(coordinate));
                            force_update.force_update();
                            if let Some(located) = located {
                                located.set(true);
                                Timeout::new(LOCATED_BADGE_MS, move || located.set(false)).forget();
                            }
                        }
                        Err(e) => {
                            warn!("Locate failed: {}", e);
                            alert(&e.user_message());
                        }
                    }
                });
            })
        }
    };
    let on_locate = locate_with(locating.clone(), None);
    let on_map_locate = locate_with(map_locating.clone(), Some(map_located.clone()));

    let on_landmark = {
        let state = state.clone();
        let map = map.clone();
        let on_marker = on_marker.clone();
        let force_update = force_update.clone();
        Callback::from(move |_: MouseEvent| {
            adopt_location(&state, &map, &on_marker, UserLocation::landmark());
            force_update.force_update();
        })
    };

    // --- Panels ---
    let on_search_select = {
        let reset = search.reset.clone();
        let select_venue = select_venue.clone();
        Callback::from(move |venue: Rc<Venue>| {
            reset.emit(());
            select_venue.emit(venue);
        })
    };

    let on_detail_close = {
        let detail = detail.clone();
        let selected_id = selected_id.clone();
        Callback::from(move |_: MouseEvent| {
            detail.set(None);
            selected_id.set(None);
        })
    };

    let on_toggle_sidebar = {
        let sidebar_collapsed = sidebar_collapsed.clone();
        Callback::from(move |_: MouseEvent| sidebar_collapsed.set(!*sidebar_collapsed))
    };

    let (filter, hits) = {
        let state = state.borrow();
        (state.filter().clone(), Rc::new(state.filtered().to_vec()))
    };
    let chevron = if *sidebar_collapsed {
        "fas fa-chevron-left"
    } else {
        "fas fa-chevron-right"
    };

    html! {
        <div class="app">
            if *loading {
                <div class="loading">
                    <div class="spinner"></div>
                    <p>{ "載入場館資料中..." }</p>
                </div>
            }

            <aside class="sidebar-left">
                <h1 class="app-title"><i class="fas fa-dumbbell"></i>{ " 臺北市運動場館地圖" }</h1>
                <SearchBox
                    query={search.query.clone()}
                    outcome={search.outcome.clone()}
                    on_input={search.on_input.clone()}
                    on_select={on_search_select}
                />
                <div class="locate-section">
                    <LocateButton busy={*locating} onclick={on_locate} />
                    <button id="taipei-station-btn" class="btn btn-secondary" onclick={on_landmark}>
                        <i class="fas fa-train"></i>{ " 臺北車站" }
                    </button>
                </div>
                if filter.radius_active {
                    <RadiusSlider radius_km={filter.radius_km} oninput={on_radius} />
                }
                <CategoryFilter filter={filter.clone()} {on_toggle} {on_toggle_all} />
            </aside>

            <main class="map-container">
                <div id={MAP_CONTAINER_ID}></div>
                <MapLocateButton busy={*map_locating} located={*map_located} onclick={on_map_locate} />
            </main>

            <aside class={classes!("sidebar-right", sidebar_collapsed.then_some("collapsed"))}>
                <button id="toggle-sidebar" class="toggle-sidebar" onclick={on_toggle_sidebar}>
                    <i class={chevron}></i>
                </button>
                <VenueList {hits} selected_id={(*selected_id).clone()} on_select={select_venue} />
            </aside>

            <DetailPanel venue={(*detail).clone()} on_close={on_detail_close} />
        </div>
    }
}

#[function_component]
pub fn App() -> Html {
    html! { <Main /> }
}

/// Entry point: routes `log` to the browser console and renders the app.
fn main() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    wasm_logger::init(wasm_logger::Config::new(level));
    yew::Renderer::<App>::new().render();
}
