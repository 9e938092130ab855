//! Continuous value change engine
//!
//! Smoothly ramps a numeric ZCL attribute (light level, hue, saturation,
//! color temperature) from its current value to a target over a requested
//! transition time. Ramps are planned with fixed-point step arithmetic,
//! paced by timer tasks in 100 ms units, corrected for scheduling drift
//! against a monotonic clock, and tracked in a fixed-capacity slot pool
//! partitioned per endpoint.
//!
//! Wiring: build a [`zcl_core::DeviceContext`] with the device's endpoints,
//! construct a [`SlotRegistry`] over it, and hand that to [`CvcEngine`].
//! Cluster command handlers then call [`CvcEngine::start_transition`] with a
//! [`TransitionInput`] describing the ramp.

pub mod clock;
pub mod engine;
pub mod error;
pub mod model;
pub mod registry;

pub(crate) mod calc;
pub(crate) mod driver;

pub use clock::{Clock, MonotonicClock, QUANTA_PER_UNIT, TIME_UNIT_MS};
pub use engine::{CvcEngine, Started, TransitionEvent};
pub use error::StartError;
pub use model::{
    CompletionHandler, TransitionInput, ValueSetter, TRANSITION_TIME_AS_FAST_AS_ABLE,
    TRANSITION_TIME_MINIMAL,
};
pub use registry::{SlotId, SlotRegistry, SLOTS_PER_ENDPOINT, SLOT_CAPACITY};
