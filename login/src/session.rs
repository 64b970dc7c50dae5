use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing::warn;

use crate::storage::StoredToken;
use crate::storage::TokenStore;
use crate::storage::TokenStoreError;

/// The signed-in state of the client.
///
/// Cloning is cheap; every clone observes the same token. Consumers that must
/// react to sign-out (for example to drop search results) subscribe to the
/// token channel.
#[derive(Debug, Clone)]
pub struct AuthSession {
    store: Arc<dyn TokenStore>,
    token: Arc<watch::Sender<Option<String>>>,
}

impl AuthSession {
    /// A signed-out session backed by `store`.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let (token, _) = watch::channel(None);
        Self {
            store,
            token: Arc::new(token),
        }
    }

    /// Start-up initialisation: adopt whatever token `store` holds.
    pub fn restore(store: Arc<dyn TokenStore>) -> Result<Self, TokenStoreError> {
        let session = Self::new(store);
        if let Some(stored) = session.store.load()? {
            info!("restored persisted session");
            session.token.send_replace(Some(stored.token));
        }
        Ok(session)
    }

    pub fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.borrow().is_some()
    }

    pub fn sign_in(&self, token: String) -> Result<(), TokenStoreError> {
        self.store.store(&StoredToken {
            token: token.clone(),
        })?;
        self.token.send_replace(Some(token));
        info!("signed in");
        Ok(())
    }

    /// Teardown. The in-memory token is dropped even when the store cannot be
    /// cleared, so the session never outlives an explicit sign-out.
    pub fn sign_out(&self) -> Result<(), TokenStoreError> {
        self.token.send_replace(None);
        let cleared = self.store.clear();
        match &cleared {
            Ok(_) => info!("signed out"),
            Err(err) => warn!("signed out but failed to clear persisted token: {err}"),
        }
        cleared.map(|_| ())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.token.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryTokenStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn restore_adopts_persisted_token() -> anyhow::Result<()> {
        let store = Arc::new(InMemoryTokenStore::default());
        store.store(&StoredToken {
            token: "persisted".to_string(),
        })?;

        let session = AuthSession::restore(store)?;
        assert_eq!(session.token().as_deref(), Some("persisted"));
        Ok(())
    }

    #[test]
    fn sign_in_and_out_round_trip_through_store() -> anyhow::Result<()> {
        let store = Arc::new(InMemoryTokenStore::default());
        let session = AuthSession::new(store.clone());
        assert!(!session.is_signed_in());

        session.sign_in("fresh".to_string())?;
        assert_eq!(store.load()?.map(|stored| stored.token).as_deref(), Some("fresh"));
        assert!(session.clone().is_signed_in());

        session.sign_out()?;
        assert!(!session.is_signed_in());
        assert_eq!(store.load()?, None);
        Ok(())
    }

    #[tokio::test]
    async fn subscribers_observe_sign_out() -> anyhow::Result<()> {
        let session = AuthSession::new(Arc::new(InMemoryTokenStore::default()));
        session.sign_in("t".to_string())?;
        let mut rx = session.subscribe();

        session.sign_out()?;
        rx.changed().await?;
        assert_eq!(*rx.borrow(), None);
        Ok(())
    }
}
