//! Storefront conversational search
//!
//! Client-side session protocol for multi-turn product search: a pure state
//! machine over an append-only conversation ledger, driven by a runtime that
//! talks to the recommendation backend through a replaceable transport.

pub mod config;
pub mod ledger;
pub mod presenter;
pub mod runtime;
pub mod session_id;
pub mod state_machine;
pub mod transport;

pub use config::StorefrontConfig;
pub use ledger::{ConversationLedger, ConversationTurn, Role};
pub use runtime::{SessionError, SessionEvent, SessionHandle, SessionRuntime};
pub use session_id::SessionId;
pub use state_machine::{Presentation, SessionContext, SessionView};
pub use transport::{LoggingTransport, SearchTransport, StorefrontClient, TransportError};
