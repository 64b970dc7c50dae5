use tokio::sync::mpsc;
use tracing::debug;

/// How prominently a failure should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Modal alert; the primary action failed.
    Blocking,
    /// Toast or inline hint; the screen stays usable as is.
    Light,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

/// Sink for user-facing notifications. A silent notifier drops everything.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    tx: Option<mpsc::UnboundedSender<Notification>>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub(crate) fn notify(&self, severity: Severity, message: impl Into<String>) {
        let notification = Notification {
            severity,
            message: message.into(),
        };
        match &self.tx {
            Some(tx) => {
                if tx.send(notification).is_err() {
                    debug!("notification receiver dropped");
                }
            }
            None => debug!(?notification, "notification discarded"),
        }
    }
}
