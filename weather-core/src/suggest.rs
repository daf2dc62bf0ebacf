//! Debounced city autocomplete.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use crate::{backend::WeatherBackend, model::Location};

/// Quiet period after the last keystroke before suggestions are fetched.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(250);

pub const MAX_SUGGESTIONS: usize = 7;

/// Cloneable handle; every clone shares the same pending-request ticket.
#[derive(Debug, Clone)]
pub struct Autocomplete {
    backend: Arc<dyn WeatherBackend>,
    window: Duration,
    latest: Arc<AtomicU64>,
}

impl Autocomplete {
    pub fn new(backend: Arc<dyn WeatherBackend>) -> Self {
        Self::with_window(backend, DEBOUNCE_WINDOW)
    }

    pub fn with_window(backend: Arc<dyn WeatherBackend>, window: Duration) -> Self {
        Self {
            backend,
            window,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Suggestions for `input` once typing has paused.
    ///
    /// Returns `None` when a newer call superseded this one during the wait.
    /// An empty input cancels anything pending and yields no suggestions.
    pub async fn suggest(&self, input: &str) -> Option<Vec<Location>> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        let query = input.trim();
        if query.is_empty() {
            return Some(Vec::new());
        }

        tokio::time::sleep(self.window).await;

        if self.latest.load(Ordering::SeqCst) != ticket {
            tracing::trace!(query, "suggestion request superseded");
            return None;
        }

        let result = self.backend.geocode(query).await;

        if self.latest.load(Ordering::SeqCst) != ticket {
            tracing::trace!(query, "suggestion response superseded");
            return None;
        }

        match result {
            Ok(mut locations) => {
                locations.truncate(MAX_SUGGESTIONS);
                Some(locations)
            }
            Err(err) => {
                tracing::debug!(query, "suggestion lookup failed: {err}");
                Some(Vec::new())
            }
        }
    }
}

/// Rendered suggestion list with a keyboard highlight.
#[derive(Debug, Clone, Default)]
pub struct Suggestions {
    items: Vec<Location>,
    highlighted: Option<usize>,
}

impl Suggestions {
    /// Replace the list; the highlight resets.
    pub fn set(&mut self, mut items: Vec<Location>) {
        items.truncate(MAX_SUGGESTIONS);
        self.items = items;
        self.highlighted = None;
    }

    pub fn clear(&mut self) {
        self.set(Vec::new());
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Location] {
        &self.items
    }

    pub fn labels(&self) -> Vec<String> {
        self.items.iter().map(Location::suggestion_label).collect()
    }

    pub fn highlighted_index(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn highlighted(&self) -> Option<&Location> {
        self.highlighted.and_then(|i| self.items.get(i))
    }

    pub fn get(&self, index: usize) -> Option<&Location> {
        self.items.get(index)
    }

    /// Move down, wrapping from the last item to the first.
    pub fn highlight_next(&mut self) -> Option<usize> {
        let len = self.items.len();
        if len == 0 {
            return None;
        }
        let next = self.highlighted.map_or(0, |i| (i + 1) % len);
        self.highlighted = Some(next);
        self.highlighted
    }

    /// Move up, wrapping from the first item to the last.
    pub fn highlight_previous(&mut self) -> Option<usize> {
        let len = self.items.len();
        if len == 0 {
            return None;
        }
        let prev = self.highlighted.map_or(len - 1, |i| (i + len - 1) % len);
        self.highlighted = Some(prev);
        self.highlighted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(name: &str) -> Location {
        Location {
            name: name.to_string(),
            country: "GB".to_string(),
            state: None,
            lat: 0.0,
            lon: 0.0,
        }
    }

    #[test]
    fn highlight_wraps_both_ways() {
        let mut s = Suggestions::default();
        s.set(vec![loc("A"), loc("B"), loc("C")]);

        assert_eq!(s.highlighted_index(), None);
        assert_eq!(s.highlight_next(), Some(0));
        assert_eq!(s.highlight_next(), Some(1));
        assert_eq!(s.highlight_next(), Some(2));
        assert_eq!(s.highlight_next(), Some(0));
        assert_eq!(s.highlight_previous(), Some(2));
        assert_eq!(s.highlighted().map(|l| l.name.as_str()), Some("C"));
    }

    #[test]
    fn highlight_previous_from_nothing_selects_last() {
        let mut s = Suggestions::default();
        s.set(vec![loc("A"), loc("B")]);
        assert_eq!(s.highlight_previous(), Some(1));
    }

    #[test]
    fn empty_list_has_no_highlight() {
        let mut s = Suggestions::default();
        assert_eq!(s.highlight_next(), None);
        assert_eq!(s.highlight_previous(), None);
    }

    #[test]
    fn set_caps_and_resets_highlight() {
        let mut s = Suggestions::default();
        s.set((0..10).map(|i| loc(&format!("City{i}"))).collect());
        s.highlight_next();
        s.set((0..10).map(|i| loc(&format!("Town{i}"))).collect());

        assert_eq!(s.items().len(), MAX_SUGGESTIONS);
        assert_eq!(s.highlighted_index(), None);
        assert_eq!(s.labels()[0], "Town0, GB");
    }
}
