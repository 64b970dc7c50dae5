use std::fmt;
use tokio_util::sync::CancellationToken;

/// Monotonic id attached to an asynchronous request.
///
/// A response is applied only while its generation is still the latest one
/// issued; anything older arrived late and is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle for one issued request.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub generation: Generation,
    pub cancel: CancellationToken,
}

/// Tracks the most recent request of one kind.
///
/// Starting a request cancels the token of the one it supersedes, so
/// transports that honour cancellation stop early; the generation check is
/// still what decides whether a result gets applied.
#[derive(Debug, Default)]
pub struct LatestRequest {
    current: Generation,
    cancel: Option<CancellationToken>,
}

impl LatestRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> Ticket {
        self.supersede();
        let cancel = CancellationToken::new();
        self.cancel = Some(cancel.clone());
        Ticket {
            generation: self.current,
            cancel,
        }
    }

    /// Invalidate whatever is outstanding without starting anything new.
    pub fn supersede(&mut self) -> Generation {
        if let Some(previous) = self.cancel.take() {
            previous.cancel();
        }
        self.current = Generation(self.current.0 + 1);
        self.current
    }

    pub fn current(&self) -> Generation {
        self.current
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.current == generation
    }

    /// Token of the request that is currently live, if any.
    pub fn token(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }
}
