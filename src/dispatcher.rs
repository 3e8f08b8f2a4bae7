use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::conversation::{Conversation, Outcome, SubmitError};
use crate::recommend::{DispatchError, RecommendClient};
use crate::tui::AppEvent;

/// Sends queries to the recommendation service one at a time.
///
/// Each request runs on its own task and reports back as
/// [`AppEvent::Settled`]. Dropping the dispatcher cancels its token, after
/// which in-flight requests are abandoned and late outcomes discarded.
pub struct Dispatcher {
    client: RecommendClient,
    tx: mpsc::UnboundedSender<AppEvent>,
    token: CancellationToken,
}

impl Dispatcher {
    pub fn new(client: RecommendClient, tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            client,
            tx,
            token: CancellationToken::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    /// False once the owning view has gone away
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Record the user's turn and start the request for it.
    pub fn submit(
        &self,
        conversation: &mut Conversation,
        query: String,
    ) -> Result<JoinHandle<()>, SubmitError> {
        conversation.begin(&query)?;
        info!(endpoint = %self.client.endpoint(), chars = query.chars().count(), "dispatching query");

        let client = self.client.clone();
        let token = self.token.clone();
        let guard = SettleGuard::new(self.tx.clone(), token.clone());

        Ok(tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                outcome = client.recommend(&query) => guard.settle(outcome),
            }
        }))
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Delivers exactly one settlement per request, on every exit path of the
/// request task. Dropped while still armed, it reports `Aborted`.
struct SettleGuard {
    tx: mpsc::UnboundedSender<AppEvent>,
    token: CancellationToken,
    armed: bool,
}

impl SettleGuard {
    fn new(tx: mpsc::UnboundedSender<AppEvent>, token: CancellationToken) -> Self {
        Self {
            tx,
            token,
            armed: true,
        }
    }

    /// Deliver the request's outcome and disarm.
    fn settle(mut self, outcome: Outcome) {
        self.armed = false;
        self.send(outcome);
    }

    fn send(&self, outcome: Outcome) {
        if self.token.is_cancelled() {
            debug!("view closed, discarding response");
            return;
        }
        let _ = self.tx.send(AppEvent::Settled(outcome));
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        if self.armed {
            self.send(Err(DispatchError::Aborted));
        }
    }
}
