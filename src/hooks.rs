use gloo_timers::callback::Timeout;
use sports_venue_map::config::DEBOUNCE_MS;
use sports_venue_map::search::SearchOutcome;
use std::rc::Rc;
use web_sys::HtmlInputElement;
use yew::prelude::*;

pub type SearchFn = Rc<dyn Fn(&str) -> SearchOutcome>;

/// State and callbacks for the debounced search box.
#[derive(Clone)]
pub struct DebouncedSearch {
    /// Text currently in the input.
    pub query: String,
    /// What the dropdown shows; `Hidden` keeps it closed.
    pub outcome: SearchOutcome,
    /// `oninput` for the text field. Restarts the debounce timer.
    pub on_input: Callback<InputEvent>,
    /// Clear the query and close the dropdown (after picking a result).
    pub reset: Callback<()>,
    /// Close the dropdown but keep the query (click outside).
    pub dismiss: Callback<()>,
}

/// Run `search` once typing pauses for [`DEBOUNCE_MS`]. A keystroke drops the
/// pending run; a blank query closes the dropdown immediately.
#[hook]
pub fn use_debounced_search(search: SearchFn) -> DebouncedSearch {
    let query = use_state(String::new);
    let outcome = use_state_eq(|| SearchOutcome::Hidden);
    // Dropping the Timeout cancels it.
    let pending = use_mut_ref(|| None::<Timeout>);

    let on_input = {
        let query = query.clone();
        let outcome = outcome.clone();
        let pending = pending.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let text = input.value();
            query.set(text.clone());
            pending.borrow_mut().take();

            if text.trim().is_empty() {
                outcome.set(SearchOutcome::Hidden);
                return;
            }

            let outcome = outcome.clone();
            let search = search.clone();
            let timer = Timeout::new(DEBOUNCE_MS, move || outcome.set(search(&text)));
            *pending.borrow_mut() = Some(timer);
        })
    };

    let reset = {
        let query = query.clone();
        let outcome = outcome.clone();
        let pending = pending.clone();
        Callback::from(move |_| {
            pending.borrow_mut().take();
            query.set(String::new());
            outcome.set(SearchOutcome::Hidden);
        })
    };

    let dismiss = {
        let outcome = outcome.clone();
        let pending = pending.clone();
        Callback::from(move |_| {
            pending.borrow_mut().take();
            outcome.set(SearchOutcome::Hidden);
        })
    };

    DebouncedSearch {
        query: (*query).clone(),
        outcome: (*outcome).clone(),
        on_input,
        reset,
        dismiss,
    }
}
