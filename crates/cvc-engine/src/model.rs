//! Transition descriptions and live per-slot ramp state

use crate::clock::QUANTA_PER_UNIT;
use std::fmt;
use zcl_core::ZclStatus;

/// Transition time sentinel: move as fast as the device is able
pub const TRANSITION_TIME_AS_FAST_AS_ABLE: u16 = 0xFFFF;

/// Transition time sentinel: a single minimal-delay step
pub const TRANSITION_TIME_MINIMAL: u16 = 0x0001;

/// Callback that applies an updated attribute value
///
/// Invoked with the endpoint id, the new value, and the remaining transition
/// time in 100 ms units (0 on the final step). Runs on the driver's timer
/// task with engine state locked and must not call back into the engine.
pub type ValueSetter = Box<dyn FnMut(u8, u16, u16) -> ZclStatus + Send>;

/// Callback invoked exactly once when a ramp reaches its target
///
/// Runs after the slot is released and may start a new transition.
pub type CompletionHandler = Box<dyn FnOnce(u8) + Send>;

/// Caller-supplied description of one value ramp
///
/// `end_value` is clamped into `[min_value, max_value]` before the ramp is
/// planned; `min_value` must not exceed `max_value`. The correlation handle
/// is an opaque caller token, handed back unchanged when the ramp is stopped
/// or preempted.
pub struct TransitionInput<H> {
    /// Endpoint the attribute lives on
    pub endpoint: u8,
    /// Cluster id of the attribute
    pub cluster: u16,
    /// Attribute id being ramped
    pub attribute: u16,
    /// Value the ramp starts from
    pub current_value: u16,
    /// Target value
    pub end_value: u16,
    /// Lower bound of the controlled quantity
    pub min_value: u16,
    /// Upper bound of the controlled quantity
    pub max_value: u16,
    /// Allow wrapping past the max/min boundary (circular quantities)
    pub overlap: bool,
    /// Requested duration in 100 ms units; 0 is invalid
    pub transition_time: u16,
    /// Applies each computed value
    pub value_setter: ValueSetter,
    /// Opaque caller token returned on stop
    pub correlation: H,
    /// Invoked once when the ramp finishes
    pub on_complete: Option<CompletionHandler>,
}

impl<H> TransitionInput<H> {
    /// Whether the requested time is one of the single-step sentinels
    #[must_use]
    pub fn is_single_step(&self) -> bool {
        matches!(
            self.transition_time,
            TRANSITION_TIME_AS_FAST_AS_ABLE | TRANSITION_TIME_MINIMAL
        )
    }
}

impl<H> fmt::Debug for TransitionInput<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionInput")
            .field("endpoint", &self.endpoint)
            .field("cluster", &self.cluster)
            .field("attribute", &self.attribute)
            .field("current_value", &self.current_value)
            .field("end_value", &self.end_value)
            .field("min_value", &self.min_value)
            .field("max_value", &self.max_value)
            .field("overlap", &self.overlap)
            .field("transition_time", &self.transition_time)
            .finish_non_exhaustive()
    }
}

/// Live state of one active ramp, owned exclusively by its slot
pub(crate) struct TransitionPlan<H> {
    pub(crate) endpoint: u8,
    pub(crate) cluster: u16,
    pub(crate) attribute: u16,
    pub(crate) current_value: u16,
    pub(crate) end_value: u16,
    pub(crate) min_value: u16,
    pub(crate) max_value: u16,
    pub(crate) overlap: bool,
    /// Requested duration, kept verbatim for sentinel checks
    pub(crate) transition_time: u16,
    /// Steps left; 1 means snap to the target, 0 means completion-only
    pub(crate) steps_remaining: u32,
    /// Quanta between steps
    pub(crate) delta_time: u32,
    /// Division remainder, re-fed one quantum per step
    pub(crate) extra_quanta: u32,
    /// Signed per-step value increment
    pub(crate) delta_value: i32,
    /// Live countdown to the planned end, in quanta
    pub(crate) time_remaining: u32,
    /// Absolute deadline in time units
    pub(crate) planned_end: u64,
    pub(crate) value_setter: ValueSetter,
    pub(crate) correlation: H,
    pub(crate) on_complete: Option<CompletionHandler>,
}

impl<H> fmt::Debug for TransitionPlan<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionPlan")
            .field("endpoint", &self.endpoint)
            .field("cluster", &self.cluster)
            .field("attribute", &self.attribute)
            .field("current_value", &self.current_value)
            .field("end_value", &self.end_value)
            .field("steps_remaining", &self.steps_remaining)
            .field("delta_time", &self.delta_time)
            .field("delta_value", &self.delta_value)
            .field("time_remaining", &self.time_remaining)
            .field("planned_end", &self.planned_end)
            .finish_non_exhaustive()
    }
}

impl<H> TransitionPlan<H> {
    /// Whether this ramp was requested with a single-step sentinel
    pub(crate) fn is_single_step(&self) -> bool {
        matches!(
            self.transition_time,
            TRANSITION_TIME_AS_FAST_AS_ABLE | TRANSITION_TIME_MINIMAL
        )
    }

    /// Remaining transition time in whole units, rounded up
    pub(crate) fn remaining_units(&self) -> u16 {
        self.time_remaining.div_ceil(QUANTA_PER_UNIT) as u16
    }

    /// Spacing to the next step, consuming one leftover quantum if any
    pub(crate) fn take_spacing(&mut self) -> u32 {
        let mut spacing = self.delta_time;
        if self.extra_quanta > 0 {
            self.extra_quanta -= 1;
            spacing += 1;
        }
        spacing
    }

    /// Rebuild the input this plan was made from
    pub(crate) fn into_input(self) -> TransitionInput<H> {
        TransitionInput {
            endpoint: self.endpoint,
            cluster: self.cluster,
            attribute: self.attribute,
            current_value: self.current_value,
            end_value: self.end_value,
            min_value: self.min_value,
            max_value: self.max_value,
            overlap: self.overlap,
            transition_time: self.transition_time,
            value_setter: self.value_setter,
            correlation: self.correlation,
            on_complete: self.on_complete,
        }
    }
}
