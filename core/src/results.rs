//! Paged search results under overlapping fetches.
//!
//! Every fetch is tagged with the generation of the search that started it.
//! A response is applied only while that generation is still current, and the
//! comparison happens under the same lock as the mutation. Starting a search
//! also cancels the previous generation's token, which takes any trailing
//! load-more down with it.

use docsearch_async_utils::Generation;
use docsearch_async_utils::LatestRequest;
use docsearch_protocol::CriteriaQuery;
use docsearch_protocol::Document;
use docsearch_protocol::DocumentPage;
use docsearch_protocol::DocumentSearchService;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::SearchConfig;
use crate::error::FetchError;
use crate::fetch::bounded;
use crate::notification::Notifier;
use crate::notification::Severity;
use crate::pagination::page_exhausted;

const SEARCH_FAILED_MESSAGE: &str = "Failed to fetch documents";
const LOAD_MORE_FAILED_MESSAGE: &str = "Couldn't load more documents";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultState {
    Idle,
    Searching,
    Ready,
    LoadingMore,
    Exhausted,
}

impl ResultState {
    fn is_stable(self) -> bool {
        matches!(
            self,
            ResultState::Idle | ResultState::Ready | ResultState::Exhausted
        )
    }
}

/// The query a search was started with, plus how far it has been paged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSession {
    pub criteria: CriteriaQuery,
    pub free_text: String,
    pub offset: usize,
    pub has_more: bool,
    pub generation: Generation,
}

/// Read-only projection for the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSetView {
    pub state: ResultState,
    pub results: Arc<Vec<Document>>,
    pub searched: bool,
}

impl ResultSetView {
    pub fn loading(&self) -> bool {
        self.state == ResultState::Searching
    }

    pub fn loading_more(&self) -> bool {
        self.state == ResultState::LoadingMore
    }

    pub fn has_more(&self) -> bool {
        matches!(self.state, ResultState::Ready | ResultState::LoadingMore)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Applied { count: usize, has_more: bool },
    /// A newer search started before this one resolved.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMoreOutcome {
    Appended { count: usize, has_more: bool },
    /// Not in `Ready`: nothing to load, or a fetch is already running.
    Skipped,
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    Search,
    LoadMore,
}

struct Inner {
    state: ResultState,
    /// Last state that had no fetch attached; failures fall back to it.
    stable: ResultState,
    items: Arc<Vec<Document>>,
    session: Option<SearchSession>,
    searched: bool,
    requests: LatestRequest,
}

impl Inner {
    fn new() -> Self {
        Self {
            state: ResultState::Idle,
            stable: ResultState::Idle,
            items: Arc::new(Vec::new()),
            session: None,
            searched: false,
            requests: LatestRequest::new(),
        }
    }

    fn enter(&mut self, state: ResultState) {
        self.state = state;
        if state.is_stable() {
            self.stable = state;
        }
    }

    fn view(&self) -> ResultSetView {
        ResultSetView {
            state: self.state,
            results: self.items.clone(),
            searched: self.searched,
        }
    }

    /// Undo the transition a failed or abandoned fetch made. Buffer contents
    /// are kept. The surviving session is re-issued under the current
    /// generation so paging can resume where it stopped.
    fn revert(&mut self, kind: FetchKind) {
        match kind {
            FetchKind::Search => {
                let current = self.requests.current();
                self.session = self.session.take().map(|session| SearchSession {
                    generation: current,
                    ..session
                });
                let stable = self.stable;
                self.enter(stable);
            }
            FetchKind::LoadMore => self.enter(ResultState::Ready),
        }
    }

    fn in_flight(&self, generation: Generation, kind: FetchKind) -> bool {
        let expected = match kind {
            FetchKind::Search => ResultState::Searching,
            FetchKind::LoadMore => ResultState::LoadingMore,
        };
        self.requests.is_current(generation) && self.state == expected
    }
}

struct Shared {
    service: Arc<dyn DocumentSearchService>,
    page_size: usize,
    timeout: Duration,
    notifier: Notifier,
    inner: Mutex<Inner>,
    view: watch::Sender<ResultSetView>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        self.view.send_replace(inner.view());
    }

    async fn fetch(
        &self,
        criteria: &CriteriaQuery,
        offset: usize,
        free_text: &str,
        cancel: &CancellationToken,
    ) -> Option<Result<DocumentPage, FetchError>> {
        bounded(
            self.service
                .search_documents(criteria, offset, self.page_size, free_text),
            self.timeout,
            cancel,
        )
        .await
    }

    /// Handle a fetch that ended without a usable page.
    fn fail(&self, generation: Generation, kind: FetchKind, err: &FetchError) -> bool {
        let mut inner = self.lock();
        if !inner.in_flight(generation, kind) {
            debug!(%generation, ?kind, "ignoring failure of superseded fetch: {err}");
            return false;
        }
        inner.revert(kind);
        self.publish(&inner);
        drop(inner);

        warn!(%generation, ?kind, "document fetch failed: {err}");
        match kind {
            FetchKind::Search => self.notifier.notify(Severity::Blocking, SEARCH_FAILED_MESSAGE),
            FetchKind::LoadMore => self.notifier.notify(Severity::Light, LOAD_MORE_FAILED_MESSAGE),
        }
        true
    }
}

/// Clears the loading state if the awaiting future is dropped mid-fetch.
struct InFlight<'a> {
    shared: &'a Shared,
    generation: Generation,
    kind: FetchKind,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(shared: &'a Shared, generation: Generation, kind: FetchKind) -> Self {
        Self {
            shared,
            generation,
            kind,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.shared.lock();
        if inner.in_flight(self.generation, self.kind) {
            debug!(generation = %self.generation, kind = ?self.kind, "fetch abandoned");
            inner.revert(self.kind);
            self.shared.publish(&inner);
        }
    }
}

/// Drives the document search service and owns the visible result buffer.
///
/// Cheap to clone; clones share state, so a search and a load-more may be
/// awaited from different tasks.
#[derive(Clone)]
pub struct PaginatedResultSet {
    shared: Arc<Shared>,
}

impl PaginatedResultSet {
    pub fn new(
        service: Arc<dyn DocumentSearchService>,
        config: &SearchConfig,
        notifier: Notifier,
    ) -> Self {
        let inner = Inner::new();
        let (view, _) = watch::channel(inner.view());
        Self {
            shared: Arc::new(Shared {
                service,
                page_size: config.page_size,
                timeout: config.request_timeout(),
                notifier,
                inner: Mutex::new(inner),
                view,
            }),
        }
    }

    pub fn view(&self) -> ResultSetView {
        self.shared.lock().view()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResultSetView> {
        self.shared.view.subscribe()
    }

    pub fn state(&self) -> ResultState {
        self.shared.lock().state
    }

    pub fn results(&self) -> Arc<Vec<Document>> {
        self.shared.lock().items.clone()
    }

    pub fn loading(&self) -> bool {
        self.view().loading()
    }

    pub fn loading_more(&self) -> bool {
        self.view().loading_more()
    }

    pub fn has_more(&self) -> bool {
        self.view().has_more()
    }

    pub fn searched(&self) -> bool {
        self.shared.lock().searched
    }

    pub fn session(&self) -> Option<SearchSession> {
        self.shared.lock().session.clone()
    }

    /// Start a fresh search from page 0. Allowed in any state; whatever was in
    /// flight before is superseded.
    pub async fn search(
        &self,
        criteria: CriteriaQuery,
        free_text: String,
    ) -> Result<SearchOutcome, FetchError> {
        let ticket = {
            let mut inner = self.shared.lock();
            let ticket = inner.requests.begin();
            inner.searched = true;
            inner.enter(ResultState::Searching);
            self.shared.publish(&inner);
            ticket
        };
        let generation = ticket.generation;
        info!(%generation, "searching documents");

        let mut guard = InFlight::new(&self.shared, generation, FetchKind::Search);
        let fetched = self
            .shared
            .fetch(&criteria, 0, &free_text, &ticket.cancel)
            .await;
        guard.disarm();

        let page = match fetched {
            None => {
                debug!(%generation, "search cancelled");
                return Ok(SearchOutcome::Superseded);
            }
            Some(Err(err)) => {
                return if self.shared.fail(generation, FetchKind::Search, &err) {
                    Err(err)
                } else {
                    Ok(SearchOutcome::Superseded)
                };
            }
            Some(Ok(page)) => page,
        };

        let mut inner = self.shared.lock();
        if !inner.in_flight(generation, FetchKind::Search) {
            debug!(%generation, "discarding stale search response");
            return Ok(SearchOutcome::Superseded);
        }
        let count = page.items.len();
        let has_more = !page_exhausted(count, self.shared.page_size);
        inner.items = Arc::new(page.items);
        inner.session = Some(SearchSession {
            criteria,
            free_text,
            offset: self.shared.page_size,
            has_more,
            generation,
        });
        inner.enter(if has_more {
            ResultState::Ready
        } else {
            ResultState::Exhausted
        });
        self.shared.publish(&inner);
        info!(%generation, count, has_more, "search applied");
        Ok(SearchOutcome::Applied { count, has_more })
    }

    /// Fetch the next page of the active session. A no-op unless the set is
    /// `Ready`, which also rules out a second concurrent load-more.
    pub async fn load_more(&self) -> Result<LoadMoreOutcome, FetchError> {
        let (session, cancel) = {
            let mut inner = self.shared.lock();
            if inner.state != ResultState::Ready {
                debug!(state = ?inner.state, "load more skipped");
                return Ok(LoadMoreOutcome::Skipped);
            }
            let session = inner
                .session
                .clone()
                .filter(|session| session.has_more && inner.requests.is_current(session.generation));
            let cancel = inner.requests.token().map(CancellationToken::child_token);
            let (Some(session), Some(cancel)) = (session, cancel) else {
                debug!("load more skipped: no pageable session");
                return Ok(LoadMoreOutcome::Skipped);
            };
            inner.enter(ResultState::LoadingMore);
            self.shared.publish(&inner);
            (session, cancel)
        };
        let generation = session.generation;
        debug!(%generation, offset = session.offset, "loading more documents");

        let mut guard = InFlight::new(&self.shared, generation, FetchKind::LoadMore);
        let fetched = self
            .shared
            .fetch(&session.criteria, session.offset, &session.free_text, &cancel)
            .await;
        guard.disarm();

        let page = match fetched {
            None => {
                debug!(%generation, "load more cancelled");
                return Ok(LoadMoreOutcome::Superseded);
            }
            Some(Err(err)) => {
                return if self.shared.fail(generation, FetchKind::LoadMore, &err) {
                    Err(err)
                } else {
                    Ok(LoadMoreOutcome::Superseded)
                };
            }
            Some(Ok(page)) => page,
        };

        let mut inner = self.shared.lock();
        if !inner.in_flight(generation, FetchKind::LoadMore) {
            debug!(%generation, "discarding stale load-more response");
            return Ok(LoadMoreOutcome::Superseded);
        }
        let count = page.items.len();
        let has_more = !page_exhausted(count, self.shared.page_size);
        Arc::make_mut(&mut inner.items).extend(page.items);
        inner.session = Some(SearchSession {
            offset: session.offset + count,
            has_more,
            ..session
        });
        inner.enter(if has_more {
            ResultState::Ready
        } else {
            ResultState::Exhausted
        });
        self.shared.publish(&inner);
        debug!(%generation, count, has_more, "page appended");
        Ok(LoadMoreOutcome::Appended { count, has_more })
    }

    /// Drop everything and return to `Idle`, cancelling outstanding fetches.
    pub fn reset(&self) {
        let mut inner = self.shared.lock();
        inner.requests.supersede();
        inner.items = Arc::new(Vec::new());
        inner.session = None;
        inner.searched = false;
        inner.enter(ResultState::Idle);
        self.shared.publish(&inner);
    }
}
