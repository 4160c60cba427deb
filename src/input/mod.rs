//! # Touch Input
//!
//! Raw multi-touch contacts in, translate/rotate/scale deltas out.
//!
//! - [`GestureRecognizer`] - contact lists to [`GestureEvent`]s
//! - [`TouchTracker`] - adapts winit touch events to contact lists
//! - [`GestureHandler`] - callback-style consumer of gesture effects

pub mod gesture;
pub mod touch;

pub use gesture::{GestureEvent, GestureHandler, GestureRecognizer, GestureState, TouchPoint};
pub use touch::TouchTracker;
