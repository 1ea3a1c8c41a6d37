//! Session runtime executor

use super::{Command, SessionEvent, SessionHandle};
use crate::state_machine::{transition, Effect, Event, TransitionError};
use crate::state_machine::{SessionContext, SessionView};
use crate::transport::{SearchTransport, TransportError};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Generic session runtime that can work with any transport implementation
pub struct SessionRuntime<T>
where
    T: SearchTransport + 'static,
{
    context: SessionContext,
    view: SessionView,
    transport: Arc<T>,
    command_rx: mpsc::Receiver<Command>,
    /// Results of spawned searches come back on this channel
    completion_tx: mpsc::Sender<Event>,
    completion_rx: mpsc::Receiver<Event>,
    view_tx: watch::Sender<SessionView>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    in_flight: bool,
}

impl<T> SessionRuntime<T>
where
    T: SearchTransport + 'static,
{
    pub fn new(context: SessionContext, transport: T) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (completion_tx, completion_rx) = mpsc::channel(4);
        let (view_tx, view_rx) = watch::channel(SessionView::default());
        let (broadcast_tx, _) = broadcast::channel(64);

        let handle = SessionHandle {
            session_id: context.session_id.clone(),
            command_tx,
            view_rx,
            broadcast_tx: broadcast_tx.clone(),
        };

        let runtime = Self {
            context,
            view: SessionView::default(),
            transport: Arc::new(transport),
            command_rx,
            completion_tx,
            completion_rx,
            view_tx,
            broadcast_tx,
            in_flight: false,
        };

        (runtime, handle)
    }

    /// Start the runtime on the current tokio runtime
    pub fn spawn(context: SessionContext, transport: T) -> SessionHandle {
        let (runtime, handle) = Self::new(context, transport);
        tokio::spawn(runtime.run());
        handle
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "Starting search session");

        let mut commands_open = true;
        loop {
            tokio::select! {
                Some(event) = self.completion_rx.recv() => {
                    self.in_flight = false;
                    if let Err(e) = self.process_event(event) {
                        tracing::error!(error = %e, "Dropped search completion");
                    }
                }
                command = self.command_rx.recv(), if commands_open => {
                    match command {
                        Some(Command { event, reply }) => {
                            let outcome = self.process_event(event);
                            let _ = reply.send(outcome);
                        }
                        None => commands_open = false,
                    }
                }
                else => break,
            }

            // Let an in-flight search land before stopping
            if !commands_open && !self.in_flight {
                break;
            }
        }

        tracing::info!(session_id = %self.context.session_id, "Search session stopped");
    }

    fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let name = event.name();
        let result = match transition(&self.view, &self.context, event) {
            Ok(result) => result,
            Err(e) => {
                match &e {
                    TransitionError::InvalidTransition(_) => {
                        tracing::warn!(
                            session_id = %self.context.session_id,
                            event = name,
                            error = %e,
                            "Rejected event"
                        );
                    }
                    _ => {
                        tracing::debug!(
                            session_id = %self.context.session_id,
                            event = name,
                            error = %e,
                            "Ignored event"
                        );
                    }
                }
                return Err(e);
            }
        };

        self.view = result.new_view;
        self.view_tx.send_replace(self.view.clone());

        for effect in result.effects {
            self.execute_effect(effect);
        }

        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::SendSearch { request } => {
                tracing::debug!(
                    session_id = %self.context.session_id,
                    query = %request.query,
                    history_len = request.conversation_history.len(),
                    "Dispatching search"
                );
                self.in_flight = true;

                let transport = self.transport.clone();
                let completion_tx = self.completion_tx.clone();
                let search = tokio::spawn(async move { transport.search(&request).await });
                // Awaiting the join handle turns a panicked search into a failure
                tokio::spawn(async move {
                    let outcome = search.await.unwrap_or_else(|e| {
                        Err(TransportError::network(format!("Search task aborted: {e}")))
                    });
                    let event = match outcome {
                        Ok(response) => Event::SearchCompleted {
                            response,
                            at: Utc::now(),
                        },
                        Err(error) => {
                            tracing::warn!(
                                kind = error.kind(),
                                error = %error,
                                "Search failed, falling back"
                            );
                            Event::SearchFailed {
                                error,
                                at: Utc::now(),
                            }
                        }
                    };
                    let _ = completion_tx.send(event).await;
                });
            }

            Effect::Present(presentation) => {
                let _ = self.broadcast_tx.send(SessionEvent::Presented(presentation));
            }

            Effect::NotifyCleared => {
                tracing::info!(session_id = %self.context.session_id, "Conversation cleared");
                let _ = self.broadcast_tx.send(SessionEvent::Cleared);
            }
        }
    }
}
