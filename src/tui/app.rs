use crate::handler::QueryHandler;
use crate::output::{Action, DisplayItem};
use crate::prefs::RawPreferences;
use crate::utils::open::perform;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

/// Search execution state for non-blocking search
pub enum SearchState {
    /// No search in progress
    Idle,
    /// Search is running in background
    Searching {
        query: String,
        receiver: Receiver<SearchResult>,
        start_time: Instant,
    },
}

/// Result from a background search
pub struct SearchResult {
    pub items: Vec<DisplayItem>,
    pub query: String,
}

/// Which of an item's actions to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Primary,
    Alternate,
}

/// Application state
pub struct App {
    handler: Arc<QueryHandler>,
    preferences: Arc<RawPreferences>,
    pub query: String,
    pub items: Vec<DisplayItem>,
    pub selected: usize,
    pub status_message: String,
    /// Set once an item was opened; the main loop exits
    pub finished: bool,
    search_state: SearchState,
}

impl App {
    pub fn new(handler: QueryHandler, preferences: RawPreferences) -> Self {
        Self {
            handler: Arc::new(handler),
            preferences: Arc::new(preferences),
            query: String::new(),
            items: Vec::new(),
            selected: 0,
            status_message: "Type to search (Enter: open, Alt+Enter: open folder, Esc: quit)"
                .to_string(),
            finished: false,
            search_state: SearchState::Idle,
        }
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.execute_search();
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.execute_search();
    }

    pub fn pop_char(&mut self) {
        if self.query.pop().is_some() {
            self.execute_search();
        }
    }

    /// Delete word backward (Ctrl+W)
    pub fn delete_word(&mut self) {
        let trimmed = self.query.trim_end();
        let cut = trimmed
            .rfind(|c: char| c.is_whitespace() || c == '/')
            .map(|i| i + 1)
            .unwrap_or(0);
        self.query.truncate(cut);
        self.execute_search();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
        self.execute_search();
    }

    /// Start a search for the current query on a background thread.
    ///
    /// A search still running for an older query is left to finish; its
    /// result is discarded because its receiver is dropped here.
    pub fn execute_search(&mut self) {
        let (tx, rx) = mpsc::channel();
        let handler = Arc::clone(&self.handler);
        let preferences = Arc::clone(&self.preferences);
        let query = self.query.clone();

        thread::spawn(move || {
            let items = handler.handle(&query, &preferences);
            let _ = tx.send(SearchResult { items, query });
        });

        self.search_state = SearchState::Searching {
            query: self.query.clone(),
            receiver: rx,
            start_time: Instant::now(),
        };
    }

    /// Check if search is in progress
    pub fn is_searching(&self) -> bool {
        matches!(self.search_state, SearchState::Searching { .. })
    }

    /// Poll for background search completion (call this in event loop)
    pub fn poll_search(&mut self) {
        // Take ownership of the state temporarily
        let current_state = std::mem::replace(&mut self.search_state, SearchState::Idle);

        match current_state {
            SearchState::Searching {
                query,
                receiver,
                start_time,
            } => match receiver.try_recv() {
                Ok(result) => {
                    if result.query == self.query {
                        let matches = result.items.iter().filter(|i| i.is_match()).count();
                        self.status_message = if matches > 0 {
                            format!(
                                "{} matches ({:.1}ms)",
                                matches,
                                start_time.elapsed().as_secs_f64() * 1000.0
                            )
                        } else {
                            String::new()
                        };
                        self.items = result.items;
                        self.selected = 0;
                    }
                }
                Err(TryRecvError::Empty) => {
                    self.search_state = SearchState::Searching {
                        query,
                        receiver,
                        start_time,
                    };
                }
                Err(TryRecvError::Disconnected) => {
                    self.status_message = "Search thread terminated unexpectedly".to_string();
                }
            },
            SearchState::Idle => {}
        }
    }

    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1).min(self.items.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }

    pub fn selected_item(&self) -> Option<&DisplayItem> {
        self.items.get(self.selected)
    }

    /// Run the selected item's action; opening a path ends the session
    pub fn activate(&mut self, which: Activation) {
        let action = match (self.selected_item(), which) {
            (Some(item), Activation::Primary) => item.on_enter.clone(),
            (Some(item), Activation::Alternate) => match &item.on_alt_enter {
                Some(action) => action.clone(),
                None => return,
            },
            (None, _) => return,
        };

        if action == Action::DoNothing {
            return;
        }

        match perform(&action) {
            Ok(()) => self.finished = true,
            Err(e) => self.status_message = format!("Error: {e:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Icon;
    use crate::prefs::keys;

    /// Preferences that never validate, so no search processes are spawned
    fn app_with_items(names: &[&str]) -> App {
        let preferences =
            RawPreferences::defaults().with(keys::BASE_DIR, "/nonexistent/fuzzfind-tui-test");
        let mut app = App::new(QueryHandler::new(), preferences);
        app.items = names.iter().map(|n| DisplayItem::path_match(n)).collect();
        app
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut app = app_with_items(&["/a", "/b", "/c"]);

        app.select_prev();
        assert_eq!(app.selected, 0);

        app.select_next();
        app.select_next();
        app.select_next();
        assert_eq!(app.selected, 2);

        app.select_first();
        assert_eq!(app.selected, 0);
        app.select_last();
        assert_eq!(app.selected_item().map(|i| i.name.as_str()), Some("/c"));
    }

    #[test]
    fn test_selection_on_empty_list() {
        let mut app = app_with_items(&[]);
        app.select_next();
        app.select_last();
        assert_eq!(app.selected, 0);
        assert!(app.selected_item().is_none());
    }

    #[test]
    fn test_activating_message_does_nothing() {
        let mut app = app_with_items(&[]);
        app.items = vec![DisplayItem::message("No results found.", Icon::Info)];
        app.activate(Activation::Primary);
        app.activate(Activation::Alternate);
        assert!(!app.finished);
    }

    #[test]
    fn test_delete_word() {
        let mut app = app_with_items(&[]);
        app.query = "src/main rs".to_string();
        app.delete_word();
        assert_eq!(app.query, "src/main ");
        app.query = "src/main".to_string();
        app.delete_word();
        assert_eq!(app.query, "src/");
    }
}
