//! Debounced tag autocomplete.
//!
//! Each keystroke supersedes whatever the previous one scheduled: its timer is
//! cancelled before it fires, or its fetch is cancelled and, should the reply
//! still slip through, discarded by the generation check.

use docsearch_async_utils::Generation;
use docsearch_async_utils::LatestRequest;
use docsearch_async_utils::OrCancelExt;
use docsearch_async_utils::Ticket;
use docsearch_protocol::Tag;
use docsearch_protocol::TagSearchService;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use tracing::warn;

use crate::config::SearchConfig;
use crate::criteria::FilterCriteria;
use crate::fetch::bounded;

/// Snapshot of the suggestion panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuggestionState {
    pub input: String,
    /// Term the current candidates were fetched for.
    pub query_term: String,
    pub candidates: Vec<Tag>,
    pub visible: bool,
    pub generation: Generation,
}

/// A candidate as the panel should render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionItem {
    pub tag: Tag,
    /// Already among the selected tags; selecting it does nothing.
    pub disabled: bool,
}

struct Inner {
    input: String,
    query_term: String,
    candidates: Vec<Tag>,
    visible: bool,
    requests: LatestRequest,
}

impl Inner {
    fn hide(&mut self) {
        self.requests.supersede();
        self.candidates.clear();
        self.query_term.clear();
        self.visible = false;
    }
}

struct Shared {
    service: Arc<dyn TagSearchService>,
    debounce: Duration,
    min_chars: usize,
    timeout: Duration,
    inner: Mutex<Inner>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn debounced_fetch(&self, term: String, ticket: Ticket) {
        let generation = ticket.generation;
        if sleep(self.debounce).or_cancel(&ticket.cancel).await.is_err() {
            return;
        }

        debug!(%generation, term = %term, "fetching tag suggestions");
        let fetched = bounded(self.service.search_tags(&term), self.timeout, &ticket.cancel).await;
        match fetched {
            None => debug!(%generation, "tag suggestion fetch cancelled"),
            Some(Err(err)) => warn!(%generation, "tag suggestion fetch failed: {err}"),
            Some(Ok(page)) => {
                let mut inner = self.lock();
                if !inner.requests.is_current(generation) {
                    debug!(%generation, "discarding stale tag suggestions");
                    return;
                }
                debug!(%generation, count = page.items.len(), "tag suggestions applied");
                inner.candidates = page.items;
                inner.query_term = term;
                inner.visible = true;
            }
        }
    }
}

/// Looks up tag candidates while the user types into the tag input.
#[derive(Clone)]
pub struct TagSuggestionEngine {
    shared: Arc<Shared>,
}

impl TagSuggestionEngine {
    pub fn new(service: Arc<dyn TagSearchService>, config: &SearchConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                service,
                debounce: config.suggestion_debounce(),
                min_chars: config.min_suggestion_chars,
                timeout: config.request_timeout(),
                inner: Mutex::new(Inner {
                    input: String::new(),
                    query_term: String::new(),
                    candidates: Vec::new(),
                    visible: false,
                    requests: LatestRequest::new(),
                }),
            }),
        }
    }

    /// Call on every keystroke. Must run inside a Tokio runtime: the lookup is
    /// scheduled as a background task.
    pub fn on_input_changed(&self, text: &str) {
        let mut inner = self.shared.lock();
        inner.input = text.to_string();
        if text.chars().count() < self.shared.min_chars {
            inner.hide();
            return;
        }
        let ticket = inner.requests.begin();
        drop(inner);

        let shared = Arc::clone(&self.shared);
        let term = text.to_string();
        tokio::spawn(async move { shared.debounced_fetch(term, ticket).await });
    }

    pub fn state(&self) -> SuggestionState {
        let inner = self.shared.lock();
        SuggestionState {
            input: inner.input.clone(),
            query_term: inner.query_term.clone(),
            candidates: inner.candidates.clone(),
            visible: inner.visible,
            generation: inner.requests.current(),
        }
    }

    pub fn input(&self) -> String {
        self.shared.lock().input.clone()
    }

    pub fn is_visible(&self) -> bool {
        let inner = self.shared.lock();
        inner.visible && !inner.candidates.is_empty()
    }

    /// Candidates with those already in `criteria` marked disabled.
    pub fn items(&self, criteria: &FilterCriteria) -> Vec<SuggestionItem> {
        self.shared
            .lock()
            .candidates
            .iter()
            .map(|tag| SuggestionItem {
                disabled: criteria.tags().contains_label(&tag.label),
                tag: tag.clone(),
            })
            .collect()
    }

    /// Pick the candidate at `index`. Returns false for disabled or missing
    /// candidates, which leave everything untouched.
    pub fn select(&self, index: usize, criteria: &mut FilterCriteria) -> bool {
        let mut inner = self.shared.lock();
        let Some(tag) = inner.candidates.get(index) else {
            return false;
        };
        if !criteria.add_tag_with_id(tag.clone()) {
            return false;
        }
        inner.input.clear();
        inner.hide();
        true
    }

    /// Adds the typed text itself as a tag (the "submit" key on the input).
    pub fn submit_input(&self, criteria: &mut FilterCriteria) -> bool {
        let mut inner = self.shared.lock();
        let label = inner.input.trim().to_string();
        if label.is_empty() {
            return false;
        }
        let added = criteria.add_tag(&label);
        inner.input.clear();
        inner.hide();
        added
    }

    /// Forget the input and cancel anything pending.
    pub fn reset(&self) {
        let mut inner = self.shared.lock();
        inner.input.clear();
        inner.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docsearch_protocol::ServiceError;
    use docsearch_protocol::TagPage;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicBool;
    use std::sync::atomic::Ordering;

    #[derive(Default)]
    struct StubTags {
        delays: HashMap<String, Duration>,
        fail: AtomicBool,
        calls: Mutex<Vec<String>>,
    }

    impl StubTags {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TagSearchService for StubTags {
        async fn search_tags(&self, term: &str) -> Result<TagPage, ServiceError> {
            self.calls.lock().unwrap().push(term.to_string());
            if let Some(delay) = self.delays.get(term) {
                sleep(*delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(ServiceError::Transport("offline".to_string()));
            }
            Ok(TagPage {
                items: vec![
                    Tag::with_id(format!("{term}-tag"), "1"),
                    Tag::with_id("Urgent", "2"),
                ],
            })
        }
    }

    fn engine(stub: Arc<StubTags>) -> TagSuggestionEngine {
        TagSuggestionEngine::new(stub, &SearchConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn keystroke_burst_issues_one_fetch_for_final_term() {
        let stub = Arc::new(StubTags::default());
        let engine = engine(stub.clone());

        engine.on_input_changed("a");
        sleep(Duration::from_millis(100)).await;
        engine.on_input_changed("ac");
        sleep(Duration::from_millis(100)).await;
        engine.on_input_changed("acc");
        sleep(Duration::from_millis(600)).await;

        assert_eq!(stub.calls(), vec!["acc".to_string()]);
        let state = engine.state();
        assert_eq!(state.query_term, "acc");
        assert!(state.visible);
        assert_eq!(state.candidates[0].label, "acc-tag");
    }

    #[tokio::test(start_paused = true)]
    async fn single_character_never_fetches() {
        let stub = Arc::new(StubTags::default());
        let engine = engine(stub.clone());

        engine.on_input_changed("a");
        sleep(Duration::from_millis(600)).await;

        assert!(stub.calls().is_empty());
        assert!(!engine.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn two_characters_fetch_after_quiescence() {
        let stub = Arc::new(StubTags::default());
        let engine = engine(stub.clone());

        engine.on_input_changed("ac");
        sleep(Duration::from_millis(499)).await;
        assert!(stub.calls().is_empty());
        sleep(Duration::from_millis(2)).await;
        assert_eq!(stub.calls(), vec!["ac".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn shrinking_to_one_character_hides_and_drops_pending_result() {
        let stub = Arc::new(StubTags {
            delays: HashMap::from([("inv".to_string(), Duration::from_millis(300))]),
            ..Default::default()
        });
        let engine = engine(stub.clone());

        engine.on_input_changed("inv");
        // Timer fired, fetch is now in flight.
        sleep(Duration::from_millis(550)).await;
        assert_eq!(stub.calls().len(), 1);

        engine.on_input_changed("i");
        sleep(Duration::from_millis(500)).await;

        let state = engine.state();
        assert!(!state.visible);
        assert!(state.candidates.is_empty());
        assert_eq!(state.input, "i");
    }

    #[tokio::test(start_paused = true)]
    async fn late_reply_for_older_term_is_discarded() {
        let stub = Arc::new(StubTags {
            delays: HashMap::from([("ta".to_string(), Duration::from_millis(1_000))]),
            ..Default::default()
        });
        let engine = engine(stub.clone());

        engine.on_input_changed("ta");
        sleep(Duration::from_millis(600)).await;
        engine.on_input_changed("tax");
        sleep(Duration::from_millis(2_000)).await;

        assert_eq!(stub.calls(), vec!["ta".to_string(), "tax".to_string()]);
        assert_eq!(engine.state().query_term, "tax");
        assert_eq!(engine.state().candidates[0].label, "tax-tag");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_keeps_previous_candidates() {
        let stub = Arc::new(StubTags::default());
        let engine = engine(stub.clone());
        engine.on_input_changed("ur");
        sleep(Duration::from_millis(600)).await;
        let before = engine.state().candidates;
        assert_eq!(before.len(), 2);

        stub.fail.store(true, Ordering::SeqCst);
        engine.on_input_changed("urg");
        sleep(Duration::from_millis(600)).await;

        assert_eq!(stub.calls().len(), 2);
        assert_eq!(engine.state().candidates, before);
        assert_eq!(engine.state().query_term, "ur");
        assert!(engine.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn selecting_marks_and_rejects_duplicates() {
        let engine = engine(Arc::new(StubTags::default()));
        let mut criteria = FilterCriteria::new();
        criteria.add_tag("urgent");

        engine.on_input_changed("in");
        sleep(Duration::from_millis(600)).await;

        let items = engine.items(&criteria);
        assert_eq!(
            items.iter().map(|item| item.disabled).collect::<Vec<_>>(),
            vec![false, true]
        );

        // Disabled candidate: nothing changes, panel stays open.
        assert!(!engine.select(1, &mut criteria));
        assert!(engine.is_visible());
        assert_eq!(engine.input(), "in");

        assert!(engine.select(0, &mut criteria));
        assert!(criteria.tags().contains_label("in-tag"));
        assert_eq!(engine.input(), "");
        assert!(!engine.is_visible());
        assert!(!engine.select(7, &mut criteria));
    }

    #[tokio::test]
    async fn submit_adds_freehand_tag() {
        let engine = engine(Arc::new(StubTags::default()));
        let mut criteria = FilterCriteria::new();

        engine.on_input_changed(" ");
        assert!(!engine.submit_input(&mut criteria));

        engine.on_input_changed("  receipts ");
        assert!(engine.submit_input(&mut criteria));
        assert!(criteria.tags().contains_label("Receipts"));
        assert_eq!(engine.input(), "");
    }
}
