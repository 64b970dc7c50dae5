//! The search screen: filter criteria, tag suggestions and the paged result
//! set, bound to one signed-in session.

use docsearch_async_utils::OrCancelExt;
use docsearch_login::AuthSession;
use docsearch_protocol::CategoryTable;
use docsearch_protocol::DocumentSearchService;
use docsearch_protocol::Tag;
use docsearch_protocol::TagSearchService;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::Weak;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;

use crate::config::SearchConfig;
use crate::criteria::FilterCriteria;
use crate::error::FetchError;
use crate::notification::Notifier;
use crate::results::LoadMoreOutcome;
use crate::results::PaginatedResultSet;
use crate::results::SearchOutcome;
use crate::suggestions::SuggestionItem;
use crate::suggestions::TagSuggestionEngine;

struct Screen {
    criteria: Mutex<FilterCriteria>,
    suggestions: TagSuggestionEngine,
    results: PaginatedResultSet,
}

impl Screen {
    fn criteria(&self) -> MutexGuard<'_, FilterCriteria> {
        self.criteria.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn teardown(&self) {
        self.criteria().clear();
        self.suggestions.reset();
        self.results.reset();
    }
}

/// Owns everything the search screen shows.
///
/// Construct one per signed-in session. When the session signs out the
/// criteria, suggestions and results are dropped automatically.
pub struct DocumentSearch {
    screen: Arc<Screen>,
    categories: CategoryTable,
    session: AuthSession,
    watcher: CancellationToken,
}

impl DocumentSearch {
    /// Must be called from within a Tokio runtime.
    pub fn new(
        session: AuthSession,
        config: &SearchConfig,
        documents: Arc<dyn DocumentSearchService>,
        tags: Arc<dyn TagSearchService>,
        notifier: Notifier,
    ) -> Self {
        let screen = Arc::new(Screen {
            criteria: Mutex::new(FilterCriteria::new()),
            suggestions: TagSuggestionEngine::new(tags, config),
            results: PaginatedResultSet::new(documents, config, notifier),
        });
        let watcher = CancellationToken::new();
        tokio::spawn(watch_session(
            session.subscribe(),
            Arc::downgrade(&screen),
            watcher.clone(),
        ));
        Self {
            screen,
            categories: config.categories.clone(),
            session,
            watcher,
        }
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Snapshot of the current criteria.
    pub fn criteria(&self) -> FilterCriteria {
        self.screen.criteria().clone()
    }

    /// Edit the criteria in place. Nothing is searched until [`Self::search`].
    pub fn update_criteria<R>(&self, edit: impl FnOnce(&mut FilterCriteria) -> R) -> R {
        edit(&mut self.screen.criteria())
    }

    /// Subcategories valid for the selected category; empty when none is
    /// selected.
    pub fn subcategory_options(&self) -> Vec<String> {
        let category = self.screen.criteria().category();
        self.categories.subcategories(category).to_vec()
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    pub fn on_tag_input(&self, text: &str) {
        self.screen.suggestions.on_input_changed(text);
    }

    pub fn tag_input(&self) -> String {
        self.screen.suggestions.input()
    }

    pub fn suggestions_visible(&self) -> bool {
        self.screen.suggestions.is_visible()
    }

    pub fn suggestions(&self) -> Vec<SuggestionItem> {
        let criteria = self.screen.criteria();
        self.screen.suggestions.items(&criteria)
    }

    pub fn select_suggestion(&self, index: usize) -> bool {
        let mut criteria = self.screen.criteria();
        self.screen.suggestions.select(index, &mut criteria)
    }

    pub fn submit_tag_input(&self) -> bool {
        let mut criteria = self.screen.criteria();
        self.screen.suggestions.submit_input(&mut criteria)
    }

    pub fn remove_tag(&self, index: usize) -> Option<Tag> {
        self.screen.criteria().remove_tag(index)
    }

    /// Read side of the result list: projections and a watch subscription.
    pub fn results(&self) -> &PaginatedResultSet {
        &self.screen.results
    }

    /// Search with a snapshot of the current criteria.
    pub async fn search(&self) -> Result<SearchOutcome, FetchError> {
        let (query, free_text) = {
            let criteria = self.screen.criteria();
            (criteria.to_query(), criteria.free_text().to_string())
        };
        self.screen.results.search(query, free_text).await
    }

    pub async fn load_more(&self) -> Result<LoadMoreOutcome, FetchError> {
        self.screen.results.load_more().await
    }

    /// Reset every filter and run the unfiltered search.
    pub async fn clear_filters(&self) -> Result<SearchOutcome, FetchError> {
        self.screen.criteria().clear();
        self.screen.suggestions.reset();
        self.search().await
    }

    /// Drop all screen state and cancel outstanding requests.
    pub fn teardown(&self) {
        self.screen.teardown();
    }
}

impl Drop for DocumentSearch {
    fn drop(&mut self) {
        self.watcher.cancel();
    }
}

async fn watch_session(
    mut token: watch::Receiver<Option<String>>,
    screen: Weak<Screen>,
    stop: CancellationToken,
) {
    loop {
        match token.changed().or_cancel(&stop).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) | Err(_) => {
                debug!("session watcher stopped");
                return;
            }
        }
        if token.borrow_and_update().is_some() {
            continue;
        }
        let Some(screen) = screen.upgrade() else {
            return;
        };
        info!("signed out; clearing search screen");
        screen.teardown();
    }
}
