//! Bridge from store notifications to an `event_emitter_rs::EventEmitter`.
//!
//! For UI layers that already route everything through an event emitter:
//! each store change becomes an `"update"` event whose payload names the
//! store that changed (`"documents"` or `"requests"`).

mod bridge;

pub use bridge::{EmitterBridge, UPDATE_EVENT};
