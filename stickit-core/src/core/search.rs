//! Debounced search over the board.
//!
//! Keystrokes schedule a search [`SEARCH_DEBOUNCE_MS`] out; each keystroke
//! replaces the pending one, so only the last query of a burst runs. Running a
//! search only changes what is shown, never the stored notes.

use crate::core::effect::{Effect, Visibility};
use crate::core::storage::KeyValueStore;
use crate::core::timer::{Deadline, Millis};
use crate::Board;

/// Quiet period after the last keystroke before a search runs.
pub const SEARCH_DEBOUNCE_MS: Millis = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Inactive,
    Active,
}

#[derive(Debug, Default)]
pub struct SearchCoordinator {
    state: SearchState,
    query: String,
    matches: Vec<String>,
    pending: Deadline<String>,
}

impl SearchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SearchState::Active
    }

    /// The effective (trimmed, lowercased) query of the active search.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Ids of the notes matching the active search.
    pub fn matches(&self) -> &[String] {
        &self.matches
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.pending.due_at()
    }

    pub fn visibility(&self, id: &str) -> Visibility {
        match self.state {
            SearchState::Inactive => Visibility::Normal,
            SearchState::Active if self.matches.iter().any(|m| m == id) => Visibility::Match,
            SearchState::Active => Visibility::Hidden,
        }
    }

    /// The search box text changed.
    ///
    /// Blank text clears the search at once; anything else is scheduled.
    pub fn input<S: KeyValueStore>(&mut self, board: &Board<S>, text: &str, now: Millis) -> Vec<Effect> {
        if text.trim().is_empty() {
            return self.clear(board);
        }
        self.pending.schedule(now, SEARCH_DEBOUNCE_MS, text.to_string());
        Vec::new()
    }

    /// Runs the pending search if its quiet period has passed.
    pub fn poll<S: KeyValueStore>(&mut self, board: &Board<S>, now: Millis) -> Vec<Effect> {
        match self.pending.fire(now) {
            Some(query) => self.run(board, &query),
            None => Vec::new(),
        }
    }

    /// Runs `query` immediately, bypassing the debounce.
    pub fn run<S: KeyValueStore>(&mut self, board: &Board<S>, query: &str) -> Vec<Effect> {
        let effective = query.trim().to_lowercase();
        if effective.is_empty() {
            return self.clear(board);
        }

        self.matches = board.search(&effective).into_iter().map(|n| n.id).collect();
        self.query = effective;
        self.state = SearchState::Active;
        log::debug!("search {:?} matched {} notes", self.query, self.matches.len());
        self.view(board)
    }

    /// Re-runs the active search, e.g. after notes were added or removed.
    pub fn refresh<S: KeyValueStore>(&mut self, board: &Board<S>) -> Vec<Effect> {
        if !self.is_active() {
            return Vec::new();
        }
        let query = self.query.clone();
        self.run(board, &query)
    }

    /// Escape in the search box: clears synchronously.
    pub fn escape<S: KeyValueStore>(&mut self, board: &Board<S>) -> Vec<Effect> {
        self.clear(board)
    }

    /// Shows every note again and drops all search state, pending runs included.
    pub fn clear<S: KeyValueStore>(&mut self, board: &Board<S>) -> Vec<Effect> {
        self.pending.cancel();
        self.state = SearchState::Inactive;
        self.query.clear();
        self.matches.clear();

        let mut effects: Vec<Effect> = board
            .notes()
            .iter()
            .map(|n| Effect::SetVisibility {
                id: n.id.clone(),
                visibility: Visibility::Normal,
            })
            .collect();
        effects.push(Effect::SearchStats { label: None });
        effects.push(Effect::NoResults { visible: false });
        effects
    }

    fn view<S: KeyValueStore>(&self, board: &Board<S>) -> Vec<Effect> {
        let mut effects: Vec<Effect> = board
            .notes()
            .iter()
            .map(|n| Effect::SetVisibility {
                id: n.id.clone(),
                visibility: self.visibility(&n.id),
            })
            .collect();
        effects.push(Effect::SearchStats {
            label: Some(format!("{} of {} notes", self.matches.len(), board.len())),
        });
        effects.push(Effect::NoResults {
            visible: self.matches.is_empty(),
        });
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Viewport;
    use crate::core::storage::MemoryStore;
    use crate::NotePatch;

    fn board_with(titles: &[&str]) -> (Board<MemoryStore>, Vec<String>) {
        let mut board = Board::new(MemoryStore::new(), Viewport::default());
        let ids = titles
            .iter()
            .map(|t| {
                let id = board.create(None).unwrap().id;
                board.update(&id, NotePatch::text(*t, "")).unwrap();
                id
            })
            .collect();
        (board, ids)
    }

    #[test]
    fn test_debounce_runs_only_last_query() {
        let (board, ids) = board_with(&["Apple pie", "Banana bread"]);
        let mut search = SearchCoordinator::new();

        assert!(search.input(&board, "app", 0).is_empty());
        assert!(search.input(&board, "ban", 200).is_empty());
        assert!(search.poll(&board, 300).is_empty());
        assert!(!search.is_active());

        let effects = search.poll(&board, 500);
        assert!(search.is_active());
        assert_eq!(search.query(), "ban");
        assert_eq!(search.matches(), &[ids[1].clone()]);
        assert!(effects.contains(&Effect::SetVisibility {
            id: ids[0].clone(),
            visibility: Visibility::Hidden,
        }));
        assert!(effects.contains(&Effect::SetVisibility {
            id: ids[1].clone(),
            visibility: Visibility::Match,
        }));
        assert!(effects.contains(&Effect::SearchStats {
            label: Some("1 of 2 notes".to_string())
        }));
        assert!(effects.contains(&Effect::NoResults { visible: false }));
        assert!(!search.has_pending());
    }

    #[test]
    fn test_no_results_indicator() {
        let (board, _) = board_with(&["Apple"]);
        let mut search = SearchCoordinator::new();
        let effects = search.run(&board, "zebra");
        assert!(effects.contains(&Effect::NoResults { visible: true }));
        assert!(effects.contains(&Effect::SearchStats {
            label: Some("0 of 1 notes".to_string())
        }));
    }

    #[test]
    fn test_blank_input_clears_immediately() {
        let (board, ids) = board_with(&["Apple", "Pear"]);
        let mut search = SearchCoordinator::new();
        search.run(&board, "apple");
        search.input(&board, "appl", 10);

        let effects = search.input(&board, "   ", 20);
        assert!(!search.is_active());
        assert!(!search.has_pending());
        assert!(effects.contains(&Effect::SetVisibility {
            id: ids[1].clone(),
            visibility: Visibility::Normal,
        }));
        assert!(effects.contains(&Effect::SearchStats { label: None }));
        assert!(search.poll(&board, 10_000).is_empty());
    }

    #[test]
    fn test_escape_bypasses_debounce() {
        let (board, ids) = board_with(&["Apple"]);
        let mut search = SearchCoordinator::new();
        search.run(&board, "pear");
        search.input(&board, "apple", 0);

        search.escape(&board);
        assert_eq!(search.state(), SearchState::Inactive);
        assert_eq!(search.visibility(&ids[0]), Visibility::Normal);
        assert!(search.poll(&board, 1_000).is_empty());
    }

    #[test]
    fn test_refresh_picks_up_new_notes() {
        let (mut board, _) = board_with(&["Apple"]);
        let mut search = SearchCoordinator::new();
        assert!(search.refresh(&board).is_empty());

        search.run(&board, "APPLE");
        let id = board.create(None).unwrap().id;
        board.update(&id, NotePatch::text("apple tart", "")).unwrap();

        search.refresh(&board);
        assert_eq!(search.matches().len(), 2);
        assert_eq!(search.visibility(&id), Visibility::Match);
    }

    #[test]
    fn test_matches_content_case_insensitively() {
        let mut board = Board::new(MemoryStore::new(), Viewport::default());
        let id = board.create(None).unwrap().id;
        board
            .update(&id, NotePatch::text("Errands", "Pick up DRY cleaning"))
            .unwrap();

        let mut search = SearchCoordinator::new();
        search.run(&board, "dry");
        assert_eq!(search.visibility(&id), Visibility::Match);
    }
}
