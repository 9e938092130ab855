//! Step-advance driver for active transitions
//!
//! Each armed step is a spawned task that sleeps for the step spacing and
//! then advances the slot's ramp under the registry lock. A step either
//! re-arms itself or finalizes the ramp; stale fires (the slot was stopped
//! or reused meanwhile) are detected by generation mismatch and ignored.

use crate::calc;
use crate::clock::{quanta_to_duration, QUANTA_PER_UNIT};
use crate::engine::{Shared, TransitionEvent};
use crate::model::TransitionPlan;
use crate::registry::{SlotId, SlotRegistry};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Allowed scheduling drift, in time units, before the ramp is recomputed
pub(crate) const DRIFT_TOLERANCE_UNITS: u64 = 1;

enum StepOutcome {
    /// The slot no longer belongs to this timer
    Stale,
    /// More steps left; re-arm after this many quanta
    Rearm(u32),
    /// Ramp finished; release the slot
    Finished,
}

/// Arm the next step of a slot's ramp after the given spacing
pub(crate) fn arm<H: Send + 'static>(
    shared: Arc<Shared<H>>,
    slot: SlotId,
    generation: u64,
    delay_quanta: u32,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if delay_quanta > 0 {
            tokio::time::sleep(quanta_to_duration(delay_quanta)).await;
        }
        advance(&shared, slot, generation);
    })
}

/// Run one step of the slot's ramp
fn advance<H: Send + 'static>(shared: &Arc<Shared<H>>, slot: SlotId, generation: u64) {
    let finished = {
        let mut registry = shared.registry.lock().expect("slot registry lock poisoned");
        let now = shared.clock.now_units();

        match step_slot(&mut registry, now, slot, generation) {
            StepOutcome::Stale => None,
            StepOutcome::Rearm(spacing) => {
                let timer = arm(Arc::clone(shared), slot, generation, spacing);
                if let Some(entry) = registry.slot_mut(slot) {
                    entry.set_timer(timer);
                }
                None
            }
            StepOutcome::Finished => registry.release(slot),
        }
    };

    // The completion handler runs with the lock released so it may start a
    // follow-up transition.
    if let Some(mut plan) = finished {
        tracing::debug!("Transition complete on endpoint {}", plan.endpoint);
        let _ = shared.events.send(TransitionEvent::Completed {
            slot,
            endpoint: plan.endpoint,
        });
        if let Some(complete) = plan.on_complete.take() {
            complete(plan.endpoint);
        }
    }
}

fn step_slot<H>(
    registry: &mut SlotRegistry<H>,
    now: u64,
    slot: SlotId,
    generation: u64,
) -> StepOutcome {
    let Some(entry) = registry.slot_mut(slot) else {
        return StepOutcome::Stale;
    };
    if entry.generation() != generation {
        return StepOutcome::Stale;
    }
    let Some(plan) = entry.plan_mut() else {
        return StepOutcome::Stale;
    };

    reconcile_pacing(plan, now);

    match plan.steps_remaining {
        // Zero-distance ramp: nothing to write, the fire only delivers
        // completion.
        0 => {}
        1 => {
            // Snap exactly to the target, clearing accumulated rounding.
            plan.current_value = plan.end_value;
            apply_value(plan, 0);
        }
        _ => {
            step_value(plan);
            let remaining = plan.remaining_units();
            apply_value(plan, remaining);
        }
    }

    if plan.steps_remaining > 1 {
        plan.steps_remaining -= 1;
        let spacing = plan.take_spacing();
        plan.time_remaining = plan.time_remaining.saturating_sub(spacing);
        StepOutcome::Rearm(spacing)
    } else {
        StepOutcome::Finished
    }
}

/// Compare the clock against the plan's pacing and correct for drift
fn reconcile_pacing<H>(plan: &mut TransitionPlan<H>, now: u64) {
    if plan.is_single_step() || plan.steps_remaining <= 1 {
        return;
    }
    if now >= plan.planned_end {
        // Too far behind to catch up stepwise: jump to the target.
        tracing::debug!(
            "Transition on endpoint {} passed its deadline, snapping to target",
            plan.endpoint
        );
        plan.steps_remaining = 1;
        return;
    }

    let to_end = plan.planned_end - now;
    let nominal = u64::from(plan.time_remaining / QUANTA_PER_UNIT);
    if to_end.abs_diff(nominal) > DRIFT_TOLERANCE_UNITS {
        tracing::debug!(
            "Transition on endpoint {} drifted ({} units planned, {} to deadline), recalculating",
            plan.endpoint,
            nominal,
            to_end
        );
        calc::recalculate(plan, to_end as u16);
    }
}

/// Advance one intermediate step, wrapping or clamping at the bounds
fn step_value<H>(plan: &mut TransitionPlan<H>) {
    let low = i32::from(plan.min_value);
    let high = i32::from(plan.max_value);
    let next = i32::from(plan.current_value) + plan.delta_value;

    let value = if next > high {
        if plan.overlap {
            low + (next - high) - 1
        } else {
            // A paced step must never leave the range when overlap is off;
            // reaching this means the step math upstream is inconsistent.
            debug_assert!(false, "step overshot the value range without overlap");
            tracing::warn!(
                "Transition on endpoint {} stepped past {}, clamping",
                plan.endpoint,
                high
            );
            high
        }
    } else if next < low {
        if plan.overlap {
            high - (low - next) + 1
        } else {
            debug_assert!(false, "step undershot the value range without overlap");
            tracing::warn!(
                "Transition on endpoint {} stepped below {}, clamping",
                plan.endpoint,
                low
            );
            low
        }
    } else {
        next
    };

    plan.current_value = value as u16;
}

fn apply_value<H>(plan: &mut TransitionPlan<H>, remaining: u16) {
    let status = (plan.value_setter)(plan.endpoint, plan.current_value, remaining);
    if !status.is_success() {
        tracing::warn!(
            "Value setter on endpoint {} returned {:?}",
            plan.endpoint,
            status
        );
    }
}
