/*!
# Document search core

Client-side state for searching a remote document repository:

- **Filter criteria** with the category/subcategory reset rule and
  case-insensitive tag deduplication
- **Tag suggestions** debounced on keystrokes, with stale replies discarded
- **Paged results** where every fetch carries a generation id, so a slow
  response can never overwrite a newer search

## Architecture

```text
DocumentSearch (one per signed-in AuthSession)
  ├─> FilterCriteria ──to_query()──┐
  ├─> TagSuggestionEngine          │
  │     └─> TagSearchService       │
  └─> PaginatedResultSet <─────────┘
        └─> DocumentSearchService
```

Results are published on a `tokio::sync::watch` channel; failures that the user
should see are pushed through a [`Notifier`].
*/

mod config;
mod controller;
mod criteria;
mod error;
mod fetch;
mod notification;
mod pagination;
mod results;
mod suggestions;
mod upload;

pub use config::CONFIG_FILE_NAME;
pub use config::SearchConfig;
pub use config::find_docsearch_home;
pub use config::load_config_file;
pub use controller::DocumentSearch;
pub use criteria::FilterCriteria;
pub use criteria::TagSet;
pub use error::ConfigError;
pub use error::FetchError;
pub use error::Result;
pub use notification::Notification;
pub use notification::Notifier;
pub use notification::Severity;
pub use pagination::DEFAULT_PAGE_SIZE;
pub use pagination::page_exhausted;
pub use results::LoadMoreOutcome;
pub use results::PaginatedResultSet;
pub use results::ResultSetView;
pub use results::ResultState;
pub use results::SearchOutcome;
pub use results::SearchSession;
pub use suggestions::SuggestionItem;
pub use suggestions::SuggestionState;
pub use suggestions::TagSuggestionEngine;
pub use upload::UploadDraft;
pub use upload::UploadError;
