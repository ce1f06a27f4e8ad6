use crate::result::{NodeIndex, SearchResult};

/// Outcome of a completed network request, as seen by the page.
pub type FetchOutcome = Result<Vec<SearchResult>, String>;

/// All UI state for the search page.
///
/// Transitions: `idle -> searching -> (results | error)`, then independently
/// per click `idle -> selecting -> loadingSimilar -> (similarResults | error)`.
///
/// Every `begin_*` hands back a sequence number; a completion carrying an
/// older number than the latest issued is stale and gets discarded, so
/// out-of-order responses can never clobber newer state.
#[derive(Debug, Default)]
pub struct SearchPage {
    query: String,
    search_results: Vec<SearchResult>,
    searching: bool,
    search_error: Option<String>,
    selected: Option<SearchResult>,
    similar_results: Vec<SearchResult>,
    loading_similar: bool,
    similar_error: Option<String>,
    index: NodeIndex,
    search_seq: u64,
    similar_seq: u64,
}

impl SearchPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit a new search. Blank queries are refused.
    ///
    /// Clears the previous selection and all similarity state regardless of
    /// what was in flight.
    pub fn begin_search(&mut self, query: &str) -> Option<u64> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return None;
        }

        self.query = trimmed.to_string();
        self.searching = true;
        self.search_error = None;
        self.selected = None;
        self.similar_results.clear();
        self.similar_error = None;
        self.rebuild_index();

        self.search_seq += 1;
        Some(self.search_seq)
    }

    /// Apply a finished search. Returns false if the completion was stale.
    pub fn complete_search(&mut self, seq: u64, outcome: FetchOutcome) -> bool {
        if seq != self.search_seq {
            return false;
        }
        self.searching = false;
        match outcome {
            Ok(results) => {
                self.search_results = results;
                self.search_error = None;
            }
            Err(message) => {
                self.search_error = Some(message);
            }
        }
        self.rebuild_index();
        true
    }

    /// Select a result and request its similar content.
    ///
    /// Returns `None` when a similarity request is already in flight, or
    /// when the result is already the current selection (a re-click is a
    /// no-op and must not issue a network call).
    pub fn begin_similar(&mut self, result: &SearchResult) -> Option<u64> {
        if self.loading_similar {
            return None;
        }
        if let Some(current) = &self.selected
            && current.id == result.id
        {
            return None;
        }

        self.selected = Some(result.clone());
        self.loading_similar = true;
        self.similar_results.clear();
        self.similar_error = None;
        self.rebuild_index();

        self.similar_seq += 1;
        Some(self.similar_seq)
    }

    /// Apply a finished similarity fetch. Returns false if stale.
    ///
    /// A failed fetch leaves the selection intact; only the inline error
    /// changes.
    pub fn complete_similar(&mut self, seq: u64, outcome: FetchOutcome) -> bool {
        if seq != self.similar_seq {
            return false;
        }
        self.loading_similar = false;
        match outcome {
            Ok(results) => {
                self.similar_results = results;
                self.similar_error = None;
            }
            Err(message) => {
                self.similar_error = Some(message);
            }
        }
        self.rebuild_index();
        true
    }

    /// Resolve a clicked graph node against the merged index, synthesizing
    /// a placeholder for ids the page has not hydrated.
    pub fn resolve_node(&self, node_id: &str) -> SearchResult {
        self.index.resolve(node_id)
    }

    fn rebuild_index(&mut self) {
        self.index
            .rebuild(&self.search_results, &self.similar_results);
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn search_results(&self) -> &[SearchResult] {
        &self.search_results
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn search_error(&self) -> Option<&str> {
        self.search_error.as_deref()
    }

    pub fn selected(&self) -> Option<&SearchResult> {
        self.selected.as_ref()
    }

    pub fn similar_results(&self) -> &[SearchResult] {
        &self.similar_results
    }

    pub fn is_loading_similar(&self) -> bool {
        self.loading_similar
    }

    pub fn similar_error(&self) -> Option<&str> {
        self.similar_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str) -> SearchResult {
        SearchResult::new(id, format!("Title {id}"), 0.9)
    }

    #[test]
    fn blank_query_is_refused() {
        let mut page = SearchPage::new();
        assert_eq!(page.begin_search(""), None);
        assert_eq!(page.begin_search("   "), None);
        assert!(!page.is_searching());
    }

    #[test]
    fn search_flow_reaches_results() {
        let mut page = SearchPage::new();
        let seq = page.begin_search("rust borrow checker").unwrap();
        assert!(page.is_searching());

        let applied = page.complete_search(seq, Ok(vec![result("a"), result("b"), result("c")]));
        assert!(applied);
        assert!(!page.is_searching());
        assert_eq!(page.search_results().len(), 3);
        assert_eq!(page.search_error(), None);
        // No selection yet, so no similarity state either.
        assert!(page.selected().is_none());
        assert!(page.similar_results().is_empty());
    }

    #[test]
    fn search_failure_surfaces_inline_error() {
        let mut page = SearchPage::new();
        let seq = page.begin_search("topic").unwrap();
        page.complete_search(seq, Err("Failed to perform search".into()));

        assert!(!page.is_searching());
        assert_eq!(page.search_error(), Some("Failed to perform search"));
        assert!(page.search_results().is_empty());
    }

    #[test]
    fn new_search_clears_selection_and_similar_state() {
        let mut page = SearchPage::new();
        let seq = page.begin_search("first").unwrap();
        page.complete_search(seq, Ok(vec![result("a")]));

        let selected = page.search_results()[0].clone();
        let sim_seq = page.begin_similar(&selected).unwrap();
        page.complete_similar(sim_seq, Ok(vec![result("x"), result("y")]));
        assert!(page.selected().is_some());
        assert_eq!(page.similar_results().len(), 2);

        page.begin_search("second").unwrap();
        assert!(page.selected().is_none());
        assert!(page.similar_results().is_empty());
        assert_eq!(page.similar_error(), None);
    }

    #[test]
    fn reselecting_current_result_is_a_noop() {
        let mut page = SearchPage::new();
        let seq = page.begin_search("topic").unwrap();
        page.complete_search(seq, Ok(vec![result("a")]));

        let selected = page.search_results()[0].clone();
        let sim_seq = page.begin_similar(&selected).unwrap();
        page.complete_similar(sim_seq, Ok(vec![result("x")]));

        assert_eq!(page.begin_similar(&selected), None);
        assert_eq!(page.similar_results().len(), 1);
    }

    #[test]
    fn similar_request_ignored_while_one_is_in_flight() {
        let mut page = SearchPage::new();
        let seq = page.begin_search("topic").unwrap();
        page.complete_search(seq, Ok(vec![result("a"), result("b")]));

        let first = page.search_results()[0].clone();
        let second = page.search_results()[1].clone();

        assert!(page.begin_similar(&first).is_some());
        assert_eq!(page.begin_similar(&second), None);
        assert_eq!(page.selected().unwrap().id, "a");
    }

    #[test]
    fn selecting_a_new_result_clears_previous_similar_results() {
        let mut page = SearchPage::new();
        let seq = page.begin_search("topic").unwrap();
        page.complete_search(seq, Ok(vec![result("a"), result("b")]));

        let first = page.search_results()[0].clone();
        let sim_seq = page.begin_similar(&first).unwrap();
        page.complete_similar(sim_seq, Ok(vec![result("x")]));

        let second = page.search_results()[1].clone();
        page.begin_similar(&second).unwrap();
        assert!(page.similar_results().is_empty());
        assert!(page.is_loading_similar());
    }

    #[test]
    fn stale_search_completion_is_discarded() {
        let mut page = SearchPage::new();
        let old_seq = page.begin_search("first").unwrap();
        let new_seq = page.begin_search("second").unwrap();

        assert!(!page.complete_search(old_seq, Ok(vec![result("stale")])));
        assert!(page.is_searching());

        assert!(page.complete_search(new_seq, Ok(vec![result("fresh")])));
        assert_eq!(page.search_results()[0].id, "fresh");
    }

    #[test]
    fn stale_similar_completion_is_discarded() {
        let mut page = SearchPage::new();
        let seq = page.begin_search("topic").unwrap();
        page.complete_search(seq, Ok(vec![result("a"), result("b")]));

        let first = page.search_results()[0].clone();
        let old_seq = page.begin_similar(&first).unwrap();
        // The in-flight request resolves with an error first...
        page.complete_similar(old_seq, Err("timeout".into()));

        let second = page.search_results()[1].clone();
        let new_seq = page.begin_similar(&second).unwrap();

        // ...then a duplicate of the old completion arrives late.
        assert!(!page.complete_similar(old_seq, Ok(vec![result("stale")])));
        assert!(page.is_loading_similar());

        assert!(page.complete_similar(new_seq, Ok(vec![result("fresh")])));
        assert_eq!(page.similar_results()[0].id, "fresh");
    }

    #[test]
    fn failed_similar_fetch_keeps_selection() {
        let mut page = SearchPage::new();
        let seq = page.begin_search("topic").unwrap();
        page.complete_search(seq, Ok(vec![result("a")]));

        let selected = page.search_results()[0].clone();
        let sim_seq = page.begin_similar(&selected).unwrap();
        page.complete_similar(sim_seq, Err("Failed to find similar content".into()));

        assert_eq!(page.selected().unwrap().id, "a");
        assert!(page.similar_results().is_empty());
        assert_eq!(page.similar_error(), Some("Failed to find similar content"));
    }

    #[test]
    fn node_resolution_prefers_search_list_then_similar_then_placeholder() {
        let mut page = SearchPage::new();
        let seq = page.begin_search("topic").unwrap();
        page.complete_search(seq, Ok(vec![result("a")]));

        let selected = page.search_results()[0].clone();
        let sim_seq = page.begin_similar(&selected).unwrap();
        page.complete_similar(sim_seq, Ok(vec![result("x")]));

        assert_eq!(page.resolve_node("a").title, "Title a");
        assert_eq!(page.resolve_node("x").title, "Title x");
        assert_eq!(page.resolve_node("unknown").title, "Loading content...");
    }
}
