//! Transition planning arithmetic
//!
//! Pure functions that turn a transition request into per-step deltas. The
//! same routine plans a fresh ramp and reshapes an in-flight one when the
//! driver detects scheduling drift.

use crate::clock::QUANTA_PER_UNIT;
use crate::model::{TransitionInput, TransitionPlan};

/// Step layout for a ramp over a known quanta budget
struct RampShape {
    steps: u32,
    delta_time: u32,
    extra_quanta: u32,
    delta_value: i32,
}

/// Build the plan for a new ramp
///
/// Returns the input unchanged as the error when `transition_time` is zero.
pub(crate) fn build_plan<H>(
    input: TransitionInput<H>,
    now_units: u64,
) -> Result<TransitionPlan<H>, TransitionInput<H>> {
    if input.transition_time == 0 {
        return Err(input);
    }

    let end_value = input.end_value.clamp(input.min_value, input.max_value);
    let single_step = input.is_single_step();

    let total_quanta = if single_step {
        1
    } else {
        u32::from(input.transition_time) * QUANTA_PER_UNIT
    };
    let shape = shape(
        input.current_value,
        end_value,
        input.min_value,
        input.max_value,
        input.overlap,
        total_quanta,
    );

    let planned_end = if single_step {
        now_units
    } else {
        now_units + u64::from(input.transition_time)
    };

    Ok(TransitionPlan {
        endpoint: input.endpoint,
        cluster: input.cluster,
        attribute: input.attribute,
        current_value: input.current_value,
        end_value,
        min_value: input.min_value,
        max_value: input.max_value,
        overlap: input.overlap,
        transition_time: input.transition_time,
        steps_remaining: shape.steps,
        delta_time: shape.delta_time,
        extra_quanta: shape.extra_quanta,
        delta_value: shape.delta_value,
        time_remaining: total_quanta,
        planned_end,
        value_setter: input.value_setter,
        correlation: input.correlation,
        on_complete: input.on_complete,
    })
}

/// Reshape an in-flight ramp over the exact time left to its deadline
///
/// Fed the plan's live current value, so the remaining steps shrink or
/// stretch to land on the target at the original planned end.
pub(crate) fn recalculate<H>(plan: &mut TransitionPlan<H>, remaining_units: u16) {
    let total_quanta = u32::from(remaining_units) * QUANTA_PER_UNIT;
    let mut shape = shape(
        plan.current_value,
        plan.end_value,
        plan.min_value,
        plan.max_value,
        plan.overlap,
        total_quanta,
    );
    if shape.steps == 0 {
        // Already at the target mid-ramp; one more step delivers completion.
        shape.steps = 1;
    }
    plan.steps_remaining = shape.steps;
    plan.delta_time = shape.delta_time;
    plan.extra_quanta = shape.extra_quanta;
    plan.delta_value = shape.delta_value;
    plan.time_remaining = total_quanta;
}

fn shape(
    current: u16,
    end: u16,
    min: u16,
    max: u16,
    overlap: bool,
    total_quanta: u32,
) -> RampShape {
    let (distance, rising) = travel(current, end, min, max, overlap);
    if distance == 0 {
        return RampShape {
            steps: 0,
            delta_time: 1,
            extra_quanta: 0,
            delta_value: 0,
        };
    }

    let steps = u32::from(distance).min(total_quanta);
    let magnitude = i32::from(distance) / steps as i32;
    RampShape {
        steps,
        delta_time: total_quanta / steps,
        extra_quanta: total_quanta % steps,
        delta_value: if rising { magnitude } else { -magnitude },
    }
}

/// Distance to travel and its direction
///
/// With overlap the shorter of the direct and wrapped paths wins; a tie goes
/// to the direct path. The wrapped distance runs through the max/min
/// boundary, so the direction is the opposite of the direct one.
fn travel(current: u16, end: u16, min: u16, max: u16, overlap: bool) -> (u16, bool) {
    let direct = current.abs_diff(end);
    let rising = end >= current;
    if !overlap {
        return (direct, rising);
    }

    let span = u32::from(max - min) + 1;
    let wrapped = span - u32::from(direct);
    if wrapped < u32::from(direct) {
        (wrapped as u16, !rising)
    } else {
        (direct, rising)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TRANSITION_TIME_AS_FAST_AS_ABLE, TRANSITION_TIME_MINIMAL};
    use zcl_core::ZclStatus;

    fn input(
        current: u16,
        end: u16,
        min: u16,
        max: u16,
        overlap: bool,
        transition_time: u16,
    ) -> TransitionInput<u8> {
        TransitionInput {
            endpoint: 1,
            cluster: zcl_core::cluster::id::LEVEL_CONTROL,
            attribute: zcl_core::cluster::level_attr::CURRENT_LEVEL,
            current_value: current,
            end_value: end,
            min_value: min,
            max_value: max,
            overlap,
            transition_time,
            value_setter: Box::new(|_, _, _| ZclStatus::Success),
            correlation: 0,
            on_complete: None,
        }
    }

    #[test]
    fn test_zero_time_refused() {
        let rejected = build_plan(input(0, 100, 0, 254, false, 0), 0).err();
        // input comes back intact
        assert_eq!(rejected.map(|i| i.end_value), Some(100));
    }

    #[test]
    fn test_steps_bounded_by_distance_and_time() {
        // 100 value steps over 100 quanta: one value per quantum
        let plan = build_plan(input(0, 100, 0, 254, false, 10), 0).unwrap();
        assert_eq!(plan.steps_remaining, 100);
        assert_eq!(plan.delta_time, 1);
        assert_eq!(plan.delta_value, 1);
        assert_eq!(plan.planned_end, 10);

        // distance smaller than the quanta budget
        let plan = build_plan(input(0, 5, 0, 254, false, 10), 0).unwrap();
        assert_eq!(plan.steps_remaining, 5);
        assert_eq!(plan.delta_time, 20);
        assert_eq!(plan.delta_value, 1);

        // distance larger than the quanta budget
        let plan = build_plan(input(0, 200, 0, 254, false, 2), 0).unwrap();
        assert_eq!(plan.steps_remaining, 20);
        assert_eq!(plan.delta_time, 1);
        assert_eq!(plan.delta_value, 10);
    }

    #[test]
    fn test_spacing_remainder_reaccumulates() {
        // 30 quanta over 7 steps: 4 per step plus 2 leftovers
        let mut plan = build_plan(input(0, 7, 0, 254, false, 3), 0).unwrap();
        assert_eq!(plan.delta_time, 4);
        assert_eq!(plan.extra_quanta, 2);

        let total: u32 = (0..plan.steps_remaining).map(|_| plan.take_spacing()).sum();
        assert_eq!(total, 30);
    }

    #[test]
    fn test_sentinels_plan_single_step() {
        for time in [TRANSITION_TIME_AS_FAST_AS_ABLE, TRANSITION_TIME_MINIMAL] {
            let plan = build_plan(input(3, 200, 0, 254, false, time), 5).unwrap();
            assert_eq!(plan.steps_remaining, 1);
            assert_eq!(plan.delta_time, 1);
            assert_eq!(plan.planned_end, 5);
        }
    }

    #[test]
    fn test_end_value_clamped_into_bounds() {
        let plan = build_plan(input(10, 400, 0, 254, false, 4), 0).unwrap();
        assert_eq!(plan.end_value, 254);

        let plan = build_plan(input(200, 3, 100, 254, false, 4), 0).unwrap();
        assert_eq!(plan.end_value, 100);
    }

    #[test]
    fn test_zero_distance_plans_zero_steps() {
        let plan = build_plan(input(42, 42, 0, 254, false, 5), 0).unwrap();
        assert_eq!(plan.steps_remaining, 0);
        assert_eq!(plan.delta_value, 0);
    }

    #[test]
    fn test_falling_ramp_has_negative_delta() {
        let plan = build_plan(input(100, 0, 0, 254, false, 10), 0).unwrap();
        assert_eq!(plan.delta_value, -1);
        assert_eq!(plan.steps_remaining, 100);
    }

    #[test]
    fn test_overlap_picks_shorter_wrap_path() {
        // hue-like range: 350 -> 10 is 20 upward through the wrap, not 340 down
        let plan = build_plan(input(350, 10, 0, 359, true, 2), 0).unwrap();
        assert_eq!(plan.steps_remaining, 20);
        assert_eq!(plan.delta_value, 1);

        // and the mirror image ramps downward through the wrap
        let plan = build_plan(input(10, 350, 0, 359, true, 2), 0).unwrap();
        assert_eq!(plan.steps_remaining, 20);
        assert_eq!(plan.delta_value, -1);
    }

    #[test]
    fn test_overlap_tie_goes_direct() {
        // both paths are 180: keep the direct direction
        let plan = build_plan(input(0, 180, 0, 359, true, 2), 0).unwrap();
        assert_eq!(plan.steps_remaining, 20);
        assert!(plan.delta_value > 0);
    }

    #[test]
    fn test_recalculate_reshapes_remaining_ramp() {
        let mut plan = build_plan(input(0, 100, 0, 254, false, 10), 0).unwrap();
        plan.current_value = 20;
        recalculate(&mut plan, 7);

        assert_eq!(plan.steps_remaining, 70);
        assert_eq!(plan.delta_value, 1);
        assert_eq!(plan.time_remaining, 70);
        // the deadline itself is untouched
        assert_eq!(plan.planned_end, 10);
    }

    #[test]
    fn test_recalculate_at_target_forces_final_step() {
        let mut plan = build_plan(input(0, 100, 0, 254, false, 10), 0).unwrap();
        plan.current_value = 100;
        recalculate(&mut plan, 3);
        assert_eq!(plan.steps_remaining, 1);
    }
}
