//! # weft-telemetry
//!
//! Event bus for simulation telemetry. The CLI emits structured events
//! (timing, system size, energy, failures) that pluggable sinks consume.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
