//! Conversational search state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions: the
//! runtime feeds [`Event`]s through [`transition`] and executes the returned
//! [`Effect`]s.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::{Effect, Presentation};
pub use event::Event;
pub use state::{SearchPhase, SessionContext, SessionView, APOLOGY_MESSAGE};
pub use transition::{transition, TransitionError, TransitionResult};
