//! Yew view components for the venue map UI.
//!
//! Everything here renders from props and reports user input through
//! callbacks; state lives in `main`.

use sports_venue_map::config::{MAX_RADIUS_KM, MIN_RADIUS_KM, RADIUS_STEP_KM};
use sports_venue_map::filter::{FilterState, VenueHit, CATEGORIES};
use sports_venue_map::search::SearchOutcome;
use sports_venue_map::utils::{
    category_and_address, format_distance_km, maps_search_url, or_none, phone_display,
    results_count_label, tel_href,
};
use sports_venue_map::Venue;
use std::rc::Rc;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct CategoryFilterProps {
    pub filter: FilterState,
    /// (category, checked)
    pub on_toggle: Callback<(String, bool)>,
    pub on_toggle_all: Callback<bool>,
}

/// "Select all" plus one checkbox per category. The "select all" box
/// follows the children.
#[function_component(CategoryFilter)]
pub fn category_filter(props: &CategoryFilterProps) -> Html {
    let on_all = {
        let on_toggle_all = props.on_toggle_all.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_toggle_all.emit(input.checked());
        })
    };

    html! {
        <div class="filter-section">
            <h3>{ "場館類型" }</h3>
            <label class="filter-item filter-all">
                <input type="checkbox" id="filter-all"
                    checked={props.filter.all_selected()}
                    onchange={on_all}
                />
                { "全選" }
            </label>
            { CATEGORIES.iter().map(|&category| {
                let on_toggle = props.on_toggle.clone();
                let onchange = Callback::from(move |e: Event| {
                    let input: HtmlInputElement = e.target_unchecked_into();
                    on_toggle.emit((category.to_string(), input.checked()));
                });
                html! {
                    <label class="filter-item" key={category}>
                        <input type="checkbox" class="venue-filter"
                            value={category}
                            checked={props.filter.is_selected(category)}
                            {onchange}
                        />
                        { category }
                    </label>
                }
            }).collect::<Html>() }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct RadiusSliderProps {
    pub radius_km: f64,
    pub oninput: Callback<f64>,
}

#[function_component(RadiusSlider)]
pub fn radius_slider(props: &RadiusSliderProps) -> Html {
    let oninput = {
        let cb = props.oninput.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Ok(km) = input.value().parse::<f64>() {
                cb.emit(km);
            }
        })
    };

    html! {
        <div class="filter-section" id="radius-section">
            <h3>{ "搜尋半徑" }</h3>
            <div class="slider-with-value">
                <input type="range" id="radius-slider"
                    min={MIN_RADIUS_KM.to_string()}
                    max={MAX_RADIUS_KM.to_string()}
                    step={RADIUS_STEP_KM.to_string()}
                    value={props.radius_km.to_string()}
                    {oninput}
                />
                <span class="slider-value">
                    <span id="radius-value">{ props.radius_km }</span>{ " 公里" }
                </span>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct LocateButtonProps {
    pub busy: bool,
    pub onclick: Callback<MouseEvent>,
}

/// Sidebar "locate me" button with a text label.
#[function_component(LocateButton)]
pub fn locate_button(props: &LocateButtonProps) -> Html {
    html! {
        <button id="locate-btn" class={classes!("btn", "btn-primary", props.busy.then_some("locating"))}
            disabled={props.busy}
            onclick={props.onclick.clone()}>
            if props.busy {
                <i class="fas fa-spinner fa-spin"></i>{ " 定位中..." }
            } else {
                <i class="fas fa-location-arrow"></i>{ " 定位我" }
            }
        </button>
    }
}

#[derive(Properties, PartialEq)]
pub struct MapLocateButtonProps {
    pub busy: bool,
    /// Briefly true after a successful fix.
    pub located: bool,
    pub onclick: Callback<MouseEvent>,
}

/// Icon-only locate button floating over the map.
#[function_component(MapLocateButton)]
pub fn map_locate_button(props: &MapLocateButtonProps) -> Html {
    let icon = if props.busy {
        "fas fa-spinner fa-spin"
    } else {
        "fas fa-location-crosshairs"
    };
    html! {
        <button id="map-locate-btn"
            class={classes!(
                "map-locate-btn",
                props.busy.then_some("locating"),
                props.located.then_some("located"),
            )}
            title="定位我"
            disabled={props.busy}
            onclick={props.onclick.clone()}>
            <i class={icon}></i>
        </button>
    }
}

#[derive(Properties, PartialEq)]
pub struct SearchBoxProps {
    pub query: String,
    pub outcome: SearchOutcome,
    pub on_input: Callback<InputEvent>,
    pub on_select: Callback<Rc<Venue>>,
}

#[function_component(SearchBox)]
pub fn search_box(props: &SearchBoxProps) -> Html {
    let results = match &props.outcome {
        SearchOutcome::Hidden => html! {},
        SearchOutcome::NoMatch => html! {
            <div class="search-result-item">{ "找不到符合的場館" }</div>
        },
        SearchOutcome::Matches(venues) => venues.iter().map(|venue| {
            let on_select = props.on_select.clone();
            let picked = Rc::clone(venue);
            html! {
                <div class="search-result-item" key={venue.id.clone()}
                    onclick={Callback::from(move |_: MouseEvent| on_select.emit(Rc::clone(&picked)))}>
                    <div class="search-result-name">{ &venue.name }</div>
                    <div class="search-result-address">{ category_and_address(venue) }</div>
                </div>
            }
        }).collect::<Html>(),
    };

    html! {
        <div class="search-input-container">
            <i class="fas fa-search"></i>
            <input type="text" id="search-input"
                placeholder="搜尋場館名稱、地址或行政區"
                value={props.query.clone()}
                oninput={props.on_input.clone()}
            />
            <div id="search-results"
                class={classes!("search-results", props.outcome.is_visible().then_some("show"))}>
                { results }
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct VenueListProps {
    pub hits: Rc<Vec<VenueHit>>,
    pub selected_id: Option<String>,
    pub on_select: Callback<Rc<Venue>>,
}

#[function_component(VenueList)]
pub fn venue_list(props: &VenueListProps) -> Html {
    html! {
        <>
            <div id="results-count" class="results-count">
                { results_count_label(props.hits.len()) }
            </div>
            <div id="venue-list" class="venue-list">
                if props.hits.is_empty() {
                    <div class="venue-list-empty">{ "沒有符合條件的場館" }</div>
                } else {
                    { props.hits.iter().map(|hit| {
                        let selected = props.selected_id.as_deref() == Some(hit.venue.id.as_str());
                        render_venue_row(hit, selected, props.on_select.clone())
                    }).collect::<Html>() }
                }
            </div>
        </>
    }
}

fn render_venue_row(hit: &VenueHit, selected: bool, on_select: Callback<Rc<Venue>>) -> Html {
    let venue = Rc::clone(&hit.venue);
    let onclick = {
        let venue = Rc::clone(&venue);
        Callback::from(move |_: MouseEvent| on_select.emit(Rc::clone(&venue)))
    };

    html! {
        <div class={classes!("venue-item", selected.then_some("selected"))}
            key={venue.id.clone()}
            data-id={venue.id.clone()}
            {onclick}>
            <div class="venue-name">{ &venue.name }</div>
            <div class="venue-type">{ &venue.category }</div>
            <div class="venue-address">{ &venue.address }</div>
            if let Some(km) = hit.distance_km {
                <div class="venue-distance">{ format_distance_km(km) }</div>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct DetailPanelProps {
    pub venue: Option<Rc<Venue>>,
    pub on_close: Callback<MouseEvent>,
}

#[function_component(DetailPanel)]
pub fn detail_panel(props: &DetailPanelProps) -> Html {
    let Some(venue) = &props.venue else {
        return html! { <div id="detail-panel" class="detail-panel"></div> };
    };

    html! {
        <div id="detail-panel" class="detail-panel show">
            <div class="detail-header">
                <div>
                    <h2 id="detail-title">{ &venue.name }</h2>
                    <span id="detail-type" class="detail-type">{ &venue.category }</span>
                </div>
                <button id="detail-close" class="detail-close" onclick={props.on_close.clone()}>
                    <i class="fas fa-times"></i>
                </button>
            </div>
            <div id="detail-body" class="detail-body">
                <div class="detail-item">
                    <div class="detail-label">{ "地址" }</div>
                    <div class="detail-value">{ &venue.address }</div>
                    <div class="detail-action">
                        <a href={maps_search_url(&venue.address)} target="_blank" rel="noopener">
                            <i class="fas fa-directions"></i>{ " 在 Google Maps 開啟" }
                        </a>
                    </div>
                </div>
                <div class="detail-item">
                    <div class="detail-label">{ "電話" }</div>
                    <div class="detail-value">{ phone_display(venue) }</div>
                    if let Some(href) = tel_href(venue) {
                        <div class="detail-action">
                            <a {href}><i class="fas fa-phone"></i>{ " 撥打電話" }</a>
                        </div>
                    }
                </div>
                { detail_item("行政區", &venue.district) }
                { detail_item("所屬單位", or_none(&venue.organization)) }
                { detail_item("經營主體", or_none(&venue.operator)) }
            </div>
        </div>
    }
}

fn detail_item(label: &'static str, value: &str) -> Html {
    html! {
        <div class="detail-item">
            <div class="detail-label">{ label }</div>
            <div class="detail-value">{ value.to_string() }</div>
        </div>
    }
}
