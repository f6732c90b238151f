//! Application state for the terminal reader.
//!
//! [`App`] is a pure consumer of [`Snapshot`]s: every snapshot the coordinator
//! broadcasts replaces the visible list and the status line.  Nothing here
//! knows whether the items came from the cache or the network.

use std::collections::HashSet;

use ratatui::widgets::ListState;

use freshfeed::{FeedItem, Snapshot};

pub struct App {
    /// Name of the feed, shown in the list border.
    pub feed_name: String,
    /// De-duplicated, reverse-chronological items from the latest snapshot.
    pub items: Vec<FeedItem>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Set by the `r` key; the main loop starts a fetch and clears it.
    pub refresh_requested: bool,
    /// True while the authoritative fetch of the latest cycle is running.
    pub fetching: bool,
    /// Source error of the last finished cycle, if it failed.
    pub error: Option<String>,
    /// Status line text derived from the latest snapshot.
    pub status: String,
}

impl App {
    pub fn new() -> Self {
        Self {
            feed_name: "Feed".into(),
            items: Vec::new(),
            list_state: ListState::default(),
            quit: false,
            refresh_requested: false,
            fetching: false,
            error: None,
            status: "Starting…".into(),
        }
    }

    pub fn with_feed_name(mut self, name: impl Into<String>) -> Self {
        self.feed_name = name.into();
        self
    }

    /// Show a snapshot.
    ///
    /// An absent data list leaves the current items alone; a present one
    /// replaces them.
    pub fn apply(&mut self, snapshot: &Snapshot<FeedItem>) {
        if let Some(data) = snapshot.data() {
            self.set_items(data);
        }
        self.fetching = snapshot.is_fetching();
        self.error = snapshot.error().map(|e| format!("{e:#}"));

        self.status = match (&self.error, self.fetching) {
            (Some(err), _) if self.items.is_empty() => format!("Error: {err}"),
            (Some(err), _) => format!("Error: {err} (showing {} saved items)", self.items.len()),
            (None, true) => "Refreshing…".into(),
            (None, false) => format!("Updated {} items", self.items.len()),
        };
    }

    /// Replace the list, dropping duplicate ids (first occurrence wins).
    fn set_items(&mut self, data: &[FeedItem]) {
        let mut seen = HashSet::with_capacity(data.len());
        self.items = data
            .iter()
            .filter(|&item| seen.insert(item.id.as_str()))
            .cloned()
            .collect();
        self.items.sort(); // uses Ord impl (reverse-chronological)

        match self.list_state.selected() {
            _ if self.items.is_empty() => self.list_state.select(None),
            Some(i) if i >= self.items.len() => {
                self.list_state.select(Some(self.items.len() - 1));
            }
            _ => {}
        }
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.items.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.items.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.items.is_empty() {
            self.list_state.select(Some(self.items.len() - 1));
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;

    use anyhow::anyhow;
    use chrono::{TimeZone, Utc};

    pub(crate) fn make_item(
        id: &str,
        title: &str,
        published: Option<chrono::DateTime<Utc>>,
    ) -> FeedItem {
        FeedItem {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            link: None,
            published,
            source_name: "test".to_string(),
        }
    }

    pub(crate) fn sample_items() -> Vec<FeedItem> {
        vec![
            make_item("1", "Old", Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())),
            make_item("2", "Mid", Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())),
            make_item("3", "New", Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())),
        ]
    }

    fn done(items: Vec<FeedItem>) -> Snapshot<FeedItem> {
        Snapshot::done(Some(Arc::from(items)))
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn new_app_starts_empty() {
        let app = App::new();
        assert!(app.items.is_empty());
        assert!(!app.quit);
        assert!(!app.fetching);
        assert!(app.list_state.selected().is_none());
    }

    // -- apply ---------------------------------------------------------------

    #[test]
    fn apply_sorts_reverse_chronological() {
        let mut app = App::new();
        app.apply(&done(sample_items()));

        assert_eq!(app.items.len(), 3);
        assert_eq!(app.items[0].id, "3", "newest first");
        assert_eq!(app.items[1].id, "2");
        assert_eq!(app.items[2].id, "1", "oldest last");
        assert_eq!(app.status, "Updated 3 items");
    }

    #[test]
    fn apply_drops_duplicate_ids() {
        let mut app = App::new();
        app.apply(&done(vec![
            make_item("dup", "First", Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())),
            make_item("dup", "Second copy", Some(Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap())),
            make_item("new", "New item", Some(Utc.with_ymd_and_hms(2025, 1, 3, 0, 0, 0).unwrap())),
        ]));

        assert_eq!(app.items.len(), 2);
        assert!(app.items.iter().any(|i| i.id == "dup" && i.title == "First"));
    }

    #[test]
    fn apply_replaces_previous_items() {
        let mut app = App::new();
        app.apply(&done(vec![make_item("a", "A", None)]));
        app.apply(&done(vec![make_item("b", "B", None)]));

        assert_eq!(app.items.len(), 1);
        assert_eq!(app.items[0].id, "b");
    }

    #[test]
    fn fetching_without_data_keeps_current_items() {
        let mut app = App::new();
        app.apply(&done(sample_items()));
        app.apply(&Snapshot::fetching(None));

        assert_eq!(app.items.len(), 3);
        assert!(app.fetching);
        assert_eq!(app.status, "Refreshing…");
    }

    #[test]
    fn error_with_stale_items_keeps_them() {
        let mut app = App::new();
        let snapshot = Snapshot::failed(
            Some(Arc::from(sample_items())),
            Arc::new(anyhow!("connection refused")),
        );
        app.apply(&snapshot);

        assert_eq!(app.items.len(), 3);
        assert!(!app.fetching);
        assert_eq!(app.error.as_deref(), Some("connection refused"));
        assert_eq!(app.status, "Error: connection refused (showing 3 saved items)");
    }

    #[test]
    fn error_without_items() {
        let mut app = App::new();
        app.apply(&Snapshot::failed(None, Arc::new(anyhow!("dns failure"))));

        assert!(app.items.is_empty());
        assert_eq!(app.status, "Error: dns failure");
    }

    #[test]
    fn successful_cycle_clears_previous_error() {
        let mut app = App::new();
        app.apply(&Snapshot::failed(None, Arc::new(anyhow!("offline"))));
        app.apply(&done(sample_items()));

        assert!(app.error.is_none());
    }

    #[test]
    fn shrinking_list_clamps_selection() {
        let mut app = App::new();
        app.apply(&done(sample_items()));
        app.select_last();

        app.apply(&done(vec![make_item("only", "Only", None)]));
        assert_eq!(app.list_state.selected(), Some(0));

        app.apply(&done(vec![]));
        assert_eq!(app.list_state.selected(), None);
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn navigation_on_empty_is_noop() {
        let mut app = App::new();
        app.select_next();
        app.select_previous();
        app.select_first();
        app.select_last();
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn select_next_starts_at_zero_then_advances() {
        let mut app = App::new();
        app.apply(&done(sample_items()));

        app.select_next();
        assert_eq!(app.list_state.selected(), Some(0));

        app.select_next();
        assert_eq!(app.list_state.selected(), Some(1));

        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn select_next_clamps_at_last_item() {
        let mut app = App::new();
        app.apply(&done(sample_items()));

        app.select_last();
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn select_previous_clamps_at_zero() {
        let mut app = App::new();
        app.apply(&done(sample_items()));

        app.select_first();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn select_previous_moves_up() {
        let mut app = App::new();
        app.apply(&done(sample_items()));

        app.select_last(); // index 2
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(1));
    }
}
