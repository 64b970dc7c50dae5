use anyhow::Context as _;
use anyhow::Result;
use anyhow::bail;
use docsearch_backend_client::BackendClient;
use docsearch_backend_client::BackendConfig;
use docsearch_core::CONFIG_FILE_NAME;
use docsearch_core::SearchConfig;
use docsearch_core::find_docsearch_home;
use docsearch_core::load_config_file;
use docsearch_login::AuthSession;
use docsearch_login::FileTokenStore;
use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Everything a subcommand needs: resolved config, the restored session and an
/// HTTP client bound to it.
#[derive(Debug)]
pub struct Context {
    pub home: PathBuf,
    pub config: CliConfig,
    pub session: AuthSession,
    pub client: Arc<BackendClient>,
}

impl Context {
    pub fn load() -> Result<Self> {
        let home = find_docsearch_home()?;
        let config_path = home.join(CONFIG_FILE_NAME);
        let config: CliConfig = load_config_file(&config_path)?;
        config
            .search
            .validate()
            .with_context(|| format!("in {}", config_path.display()))?;
        debug!(home = %home.display(), "loaded configuration");

        let store = Arc::new(FileTokenStore::new(&home));
        let session = AuthSession::restore(store).context("failed to restore session")?;
        let client = BackendClient::new(config.backend.clone(), session.clone())
            .context("failed to build HTTP client")?;
        Ok(Self {
            home,
            config,
            session,
            client: Arc::new(client),
        })
    }

    pub fn require_session(&self) -> Result<()> {
        if !self.session.is_signed_in() {
            bail!("not signed in; run `docsearch login --mobile <number>` first");
        }
        Ok(())
    }
}
