//! Linear name/address/district search.

use crate::Venue;
use std::rc::Rc;

/// What the search dropdown should show for a query.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Blank query: the dropdown stays closed.
    Hidden,
    NoMatch,
    Matches(Vec<Rc<Venue>>),
}

impl SearchOutcome {
    pub fn is_visible(&self) -> bool {
        !matches!(self, SearchOutcome::Hidden)
    }
}

/// Case-insensitive substring match over the whole collection, at most `limit` hits in load order.
pub fn search(venues: &[Rc<Venue>], query: &str, limit: usize) -> SearchOutcome {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return SearchOutcome::Hidden;
    }

    let matches: Vec<Rc<Venue>> = venues
        .iter()
        .filter(|v| {
            v.name.to_lowercase().contains(&needle)
                || v.address.to_lowercase().contains(&needle)
                || v.district.to_lowercase().contains(&needle)
        })
        .take(limit)
        .cloned()
        .collect();

    if matches.is_empty() {
        SearchOutcome::NoMatch
    } else {
        SearchOutcome::Matches(matches)
    }
}
