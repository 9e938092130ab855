//! Fixed-capacity transition slot registry
//!
//! Slots are statically partitioned per endpoint: an endpoint's position in
//! the device context's registration order fixes its partition, so the same
//! (endpoint, cluster, attribute) triple always resolves to the same slot id
//! for the life of the process.

use crate::model::TransitionPlan;
use tokio::task::JoinHandle;
use zcl_core::{DeviceContext, MAX_ENDPOINTS};

/// Concurrent transitions allowed per endpoint
pub const SLOTS_PER_ENDPOINT: usize = 4;

/// Total slot capacity across all endpoints
pub const SLOT_CAPACITY: usize = MAX_ENDPOINTS * SLOTS_PER_ENDPOINT;

/// Stable identity of one transition slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl SlotId {
    /// Position of this slot in the registry
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One registry entry
pub(crate) struct AlarmSlot<H> {
    cluster: u16,
    attribute: u16,
    plan: Option<TransitionPlan<H>>,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every claim and release; a timer fire carrying a stale
    /// generation is ignored by the driver.
    generation: u64,
}

impl<H> AlarmSlot<H> {
    fn empty() -> Self {
        Self {
            cluster: 0,
            attribute: 0,
            plan: None,
            timer: None,
            generation: 0,
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn plan(&self) -> Option<&TransitionPlan<H>> {
        self.plan.as_ref()
    }

    pub(crate) fn plan_mut(&mut self) -> Option<&mut TransitionPlan<H>> {
        self.plan.as_mut()
    }

    pub(crate) fn set_timer(&mut self, timer: JoinHandle<()>) {
        self.timer = Some(timer);
    }

    pub(crate) fn take_timer(&mut self) -> Option<JoinHandle<()>> {
        self.timer.take()
    }
}

/// The per-device pool of transition slots
///
/// Constructed once from a [`DeviceContext`] at wiring time and injected
/// into the engine; there is no process-global registry.
pub struct SlotRegistry<H> {
    /// Endpoint ids in descriptor order; index fixes the slot partition
    endpoints: Vec<u8>,
    slots: Vec<AlarmSlot<H>>,
}

impl<H> SlotRegistry<H> {
    /// Build a registry over the context's endpoints
    #[must_use]
    pub fn new(ctx: &DeviceContext) -> Self {
        let endpoints = ctx.endpoints().iter().map(|e| e.id).collect();
        let slots = (0..SLOT_CAPACITY).map(|_| AlarmSlot::empty()).collect();
        Self { endpoints, slots }
    }

    /// Total number of slots
    #[must_use]
    pub fn capacity(&self) -> usize {
        SLOT_CAPACITY
    }

    /// Slot index range owned by an endpoint
    pub(crate) fn partition(&self, endpoint: u8) -> Option<std::ops::Range<usize>> {
        let position = self.endpoints.iter().position(|&id| id == endpoint)?;
        let base = position * SLOTS_PER_ENDPOINT;
        Some(base..base + SLOTS_PER_ENDPOINT)
    }

    /// Find the active slot for a triple, if any
    pub(crate) fn find_active(&self, endpoint: u8, cluster: u16, attribute: u16) -> Option<SlotId> {
        let range = self.partition(endpoint)?;
        for index in range {
            let slot = &self.slots[index];
            if slot.plan.is_some() && slot.cluster == cluster && slot.attribute == attribute {
                return Some(SlotId(index));
            }
        }
        None
    }

    /// Take the first free slot in the plan's endpoint partition
    ///
    /// Returns the plan unchanged when the partition is exhausted or the
    /// endpoint is unknown, so no resource leaks on refusal.
    pub(crate) fn claim(&mut self, plan: TransitionPlan<H>) -> Result<SlotId, TransitionPlan<H>> {
        let Some(range) = self.partition(plan.endpoint) else {
            return Err(plan);
        };
        for index in range {
            let slot = &mut self.slots[index];
            if slot.plan.is_none() {
                slot.cluster = plan.cluster;
                slot.attribute = plan.attribute;
                slot.plan = Some(plan);
                slot.generation += 1;
                return Ok(SlotId(index));
            }
        }
        Err(plan)
    }

    /// Free a slot and hand its plan back
    ///
    /// Releasing an idle or out-of-range slot is a benign no-op.
    pub(crate) fn release(&mut self, slot: SlotId) -> Option<TransitionPlan<H>> {
        let entry = self.slots.get_mut(slot.0)?;
        let plan = entry.plan.take()?;
        entry.timer = None;
        entry.generation += 1;
        Some(plan)
    }

    pub(crate) fn slot(&self, slot: SlotId) -> Option<&AlarmSlot<H>> {
        self.slots.get(slot.0)
    }

    pub(crate) fn slot_mut(&mut self, slot: SlotId) -> Option<&mut AlarmSlot<H>> {
        self.slots.get_mut(slot.0)
    }

    /// Abort every pending timer
    pub(crate) fn abort_all(&mut self) {
        for slot in &mut self.slots {
            if let Some(timer) = slot.timer.take() {
                timer.abort();
            }
        }
    }
}
