//! Delivery lifecycle
//!
//! The courier's state machine: `READY -> ON_THE_WAY -> DELIVERED`, plus
//! cancel back to `READY`. Which transitions wait for the order service is
//! data in the [`TRANSITIONS`] table, not logic in the engine.

mod engine;
mod transition;

pub use engine::{DeliveryLifecycle, SessionSource};
pub use transition::{FailurePolicy, TRANSITIONS, Transition, TransitionKind, TransitionOutcome};
