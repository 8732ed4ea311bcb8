//! Bounded retry for highlighting a marker that may still be clustered.
//!
//! After the map flies to a venue its marker only gets a DOM element once the
//! cluster holding it has expanded. [`HighlightRetry`] polls for that element
//! a bounded number of times and gives up quietly. Each selection carries a
//! generation number; a newer selection makes older loops stop at their next
//! poll instead of highlighting a marker the user has moved away from.

use log::{debug, warn};
use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightStatus {
    Pending,
    Found,
    Abandoned,
    /// A newer selection took over before this one finished.
    Superseded,
}

#[derive(Debug, Clone)]
pub struct HighlightRetry {
    attempts: u32,
    max_attempts: u32,
    generation: u64,
    status: HighlightStatus,
}

impl HighlightRetry {
    pub fn new(max_attempts: u32, generation: u64) -> Self {
        Self {
            attempts: 0,
            max_attempts: max_attempts.max(1),
            generation,
            status: HighlightStatus::Pending,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn status(&self) -> HighlightStatus {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record one lookup. Terminal states are sticky.
    pub fn record(&mut self, found: bool) -> HighlightStatus {
        if self.status != HighlightStatus::Pending {
            return self.status;
        }
        self.attempts += 1;
        self.status = if found {
            HighlightStatus::Found
        } else if self.attempts >= self.max_attempts {
            HighlightStatus::Abandoned
        } else {
            HighlightStatus::Pending
        };
        self.status
    }

    /// Stop if `current` is no longer this loop's generation.
    pub fn check_generation(&mut self, current: u64) -> HighlightStatus {
        if self.status == HighlightStatus::Pending && current != self.generation {
            self.status = HighlightStatus::Superseded;
        }
        self.status
    }
}

/// Hands out selection generations shared by every in-flight highlight loop.
#[derive(Debug, Clone, Default)]
pub struct Generation(Rc<Cell<u64>>);

impl Generation {
    /// Start a new selection, invalidating every older loop.
    pub fn advance(&self) -> u64 {
        let next = self.0.get().wrapping_add(1);
        self.0.set(next);
        next
    }

    pub fn current(&self) -> u64 {
        self.0.get()
    }
}

/// Timings of one highlight attempt sequence, in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct RetryTiming {
    pub settle_ms: u32,
    pub retry_ms: u32,
    pub max_attempts: u32,
}

/// Wait for the map to settle, then poll `lookup` until it reports the marker
/// highlighted, attempts run out, or a newer selection supersedes this one.
///
/// The generation is read when this is called, not when the future is first
/// polled. `sleep` is the only suspension point, so tests can drive the loop
/// with an immediately-ready future.
pub fn run<L, S, F>(
    venue_id: String,
    generation: Generation,
    timing: RetryTiming,
    mut lookup: L,
    sleep: S,
) -> impl Future<Output = HighlightStatus>
where
    L: FnMut() -> bool,
    S: Fn(u32) -> F,
    F: Future<Output = ()>,
{
    let mut retry = HighlightRetry::new(timing.max_attempts, generation.current());

    async move {
        sleep(timing.settle_ms).await;

        loop {
            if retry.check_generation(generation.current()) == HighlightStatus::Superseded {
                debug!("Highlight for {} superseded by a newer selection", venue_id);
                return HighlightStatus::Superseded;
            }

            match retry.record(lookup()) {
                HighlightStatus::Pending => sleep(timing.retry_ms).await,
                HighlightStatus::Found => {
                    debug!("Highlighted {} after {} attempt(s)", venue_id, retry.attempts());
                    return HighlightStatus::Found;
                }
                status => {
                    warn!(
                        "Could not highlight marker {} after {} attempts (still clustered?)",
                        venue_id,
                        retry.attempts()
                    );
                    return status;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::future::{ready, Ready};
    use std::cell::RefCell;

    const TIMING: RetryTiming = RetryTiming {
        settle_ms: 900,
        retry_ms: 100,
        max_attempts: 10,
    };

    fn no_wait(_ms: u32) -> Ready<()> {
        ready(())
    }

    #[test]
    fn found_on_fourth_poll_is_still_highlighted() {
        let mut polls = 0;
        let status = block_on(run(
            "a".into(),
            Generation::default(),
            TIMING,
            || {
                polls += 1;
                polls == 4
            },
            no_wait,
        ));
        assert_eq!(status, HighlightStatus::Found);
        assert_eq!(polls, 4);
    }

    #[test]
    fn never_found_is_abandoned_after_the_bound() {
        let mut polls = 0;
        let status = block_on(run(
            "a".into(),
            Generation::default(),
            TIMING,
            || {
                polls += 1;
                false
            },
            no_wait,
        ));
        assert_eq!(status, HighlightStatus::Abandoned);
        assert_eq!(polls, 10);
    }

    #[test]
    fn waits_settle_delay_then_retry_interval() {
        let waits = RefCell::new(Vec::new());
        let mut polls = 0;
        block_on(run(
            "a".into(),
            Generation::default(),
            TIMING,
            || {
                polls += 1;
                polls == 3
            },
            |ms| {
                waits.borrow_mut().push(ms);
                ready(())
            },
        ));
        assert_eq!(*waits.borrow(), vec![900, 100, 100]);
    }

    #[test]
    fn newer_selection_stops_older_loop() {
        let generation = Generation::default();
        generation.advance();
        let bump = generation.clone();
        let mut polls = 0;
        let status = block_on(run(
            "a".into(),
            generation.clone(),
            TIMING,
            || {
                polls += 1;
                if polls == 2 {
                    bump.advance();
                }
                false
            },
            no_wait,
        ));
        assert_eq!(status, HighlightStatus::Superseded);
        assert_eq!(polls, 2);
    }

    #[test]
    fn terminal_states_are_sticky() {
        let mut retry = HighlightRetry::new(2, 7);
        assert_eq!(retry.record(false), HighlightStatus::Pending);
        assert_eq!(retry.record(true), HighlightStatus::Found);
        assert_eq!(retry.record(false), HighlightStatus::Found);
        assert_eq!(retry.check_generation(8), HighlightStatus::Found);
        assert_eq!(retry.attempts(), 2);
        assert_eq!(retry.generation(), 7);
    }
}
