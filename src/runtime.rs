//! Runtime for executing search sessions
//!
//! One task per session owns the [`SessionView`] and applies events through
//! the pure transition function. Callers talk to it through a cloneable
//! [`SessionHandle`].

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;

use crate::session_id::SessionId;
use crate::state_machine::{Event, Presentation, SessionView, TransitionError};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// Events sent to presenters
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// An exchange resolved, successfully or with the fallback reply
    Presented(Presentation),
    /// Conversation was cleared
    Cleared,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("Session runtime has stopped")]
    Closed,
}

/// An event plus the channel its outcome is reported on
#[derive(Debug)]
pub(crate) struct Command {
    pub event: Event,
    pub reply: oneshot::Sender<Result<(), TransitionError>>,
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    command_tx: mpsc::Sender<Command>,
    view_rx: watch::Receiver<SessionView>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    async fn send(&self, event: Event) -> Result<(), SessionError> {
        let (reply, outcome) = oneshot::channel();
        self.command_tx
            .send(Command { event, reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        outcome.await.map_err(|_| SessionError::Closed)??;
        Ok(())
    }

    /// Submit a query. Empty queries and submissions while a search is in
    /// flight are dropped without touching the session.
    pub async fn submit_query(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.send(Event::submit(text)).await
    }

    /// Submit the staged input
    pub async fn submit_input(&self) -> Result<(), SessionError> {
        self.send(Event::SubmitInput).await
    }

    pub async fn set_input(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.send(Event::InputChanged { text: text.into() }).await
    }

    /// Stage the pending follow-up question as the next query
    pub async fn select_follow_up(&self) -> Result<(), SessionError> {
        self.send(Event::SelectFollowUp).await
    }

    pub async fn clear(&self) -> Result<(), SessionError> {
        self.send(Event::Clear).await
    }

    /// Current view
    pub fn view(&self) -> SessionView {
        self.view_rx.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionView> {
        self.view_rx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Wait until no search is in flight
    pub async fn wait_until_idle(&self) -> Result<SessionView, SessionError> {
        let mut rx = self.view_rx.clone();
        let view = rx
            .wait_for(SessionView::is_idle)
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(view.clone())
    }
}
