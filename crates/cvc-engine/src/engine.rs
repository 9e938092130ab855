//! Public control surface for value transitions

use crate::calc;
use crate::clock::{Clock, MonotonicClock};
use crate::driver;
use crate::error::StartError;
use crate::model::TransitionInput;
use crate::registry::{SlotId, SlotRegistry};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Notifications about transition lifecycle
#[derive(Debug, Clone)]
pub enum TransitionEvent {
    /// A ramp claimed a slot and armed its first step
    Started {
        slot: SlotId,
        endpoint: u8,
        cluster: u16,
        attribute: u16,
    },
    /// A ramp reached its target and released its slot
    Completed { slot: SlotId, endpoint: u8 },
    /// A ramp was stopped before completing
    Stopped { slot: SlotId, endpoint: u8 },
}

/// Successful start: the claimed slot plus any preempted ramp's handle
#[derive(Debug)]
pub struct Started<H> {
    /// Slot now driving the ramp
    pub slot: SlotId,
    /// Correlation handle of a ramp on the same triple that was stopped to
    /// make room, for the caller to recycle
    pub preempted: Option<H>,
}

/// State shared between the engine handle and its timer tasks
pub(crate) struct Shared<H> {
    pub(crate) registry: Mutex<SlotRegistry<H>>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) events: broadcast::Sender<TransitionEvent>,
}

/// The continuous value change engine
///
/// Ramps a numeric cluster attribute from its current value to a target over
/// a requested transition time, stepping on a timer with drift correction.
/// Must live on a tokio runtime; `start_transition` spawns the step timers.
pub struct CvcEngine<H> {
    shared: Arc<Shared<H>>,
}

impl<H: Send + 'static> CvcEngine<H> {
    /// Create an engine over a slot registry, using the monotonic clock
    #[must_use]
    pub fn new(registry: SlotRegistry<H>) -> Self {
        Self::with_clock(registry, Arc::new(MonotonicClock::new()))
    }

    /// Create an engine with an explicit time source
    #[must_use]
    pub fn with_clock(registry: SlotRegistry<H>, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(registry),
                clock,
                events,
            }),
        }
    }

    /// Subscribe to transition lifecycle events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.shared.events.subscribe()
    }

    /// Plan a ramp, claim a slot for it, and arm its first step
    ///
    /// A ramp already active on the same (endpoint, cluster, attribute)
    /// triple is stopped first; its correlation handle comes back in
    /// [`Started::preempted`]. On error the input is handed back untouched
    /// and nothing was scheduled.
    pub fn start_transition(&self, input: TransitionInput<H>) -> Result<Started<H>, StartError<H>> {
        let now = self.shared.clock.now_units();
        let plan = match calc::build_plan(input, now) {
            Ok(plan) => plan,
            Err(input) => return Err(StartError::InvalidTransitionTime(input)),
        };

        let mut registry = self.shared.registry.lock().expect("slot registry lock poisoned");
        if registry.partition(plan.endpoint).is_none() {
            return Err(StartError::UnknownEndpoint(plan.into_input()));
        }

        let preempted = match registry.find_active(plan.endpoint, plan.cluster, plan.attribute) {
            Some(active) => {
                if let Some(entry) = registry.slot_mut(active) {
                    if let Some(timer) = entry.take_timer() {
                        timer.abort();
                    }
                }
                registry.release(active).map(|old| old.correlation)
            }
            None => None,
        };

        let (endpoint, cluster, attribute) = (plan.endpoint, plan.cluster, plan.attribute);
        let slot = match registry.claim(plan) {
            Ok(slot) => slot,
            Err(plan) => return Err(StartError::NoFreeSlot(plan.into_input())),
        };
        let generation = registry
            .slot(slot)
            .expect("claimed slot exists")
            .generation();

        let timer = driver::arm(Arc::clone(&self.shared), slot, generation, 0);
        if let Some(entry) = registry.slot_mut(slot) {
            entry.set_timer(timer);
        }
        drop(registry);

        tracing::info!(
            "Started transition on endpoint {} cluster {:#06x} attribute {:#06x} (slot {})",
            endpoint,
            cluster,
            attribute,
            slot.index()
        );
        let _ = self.shared.events.send(TransitionEvent::Started {
            slot,
            endpoint,
            cluster,
            attribute,
        });

        Ok(Started { slot, preempted })
    }

    /// Stop a ramp and reclaim its correlation handle
    ///
    /// Cancels the pending step timer before freeing the slot; the
    /// completion handler does not fire. Stopping an idle slot is a benign
    /// no-op returning `None`.
    pub fn stop_transition(&self, slot: SlotId) -> Option<H> {
        let mut registry = self.shared.registry.lock().expect("slot registry lock poisoned");
        if let Some(entry) = registry.slot_mut(slot) {
            if let Some(timer) = entry.take_timer() {
                timer.abort();
            }
        }
        let plan = registry.release(slot)?;
        drop(registry);

        tracing::info!(
            "Stopped transition on endpoint {} (slot {})",
            plan.endpoint,
            slot.index()
        );
        let _ = self.shared.events.send(TransitionEvent::Stopped {
            slot,
            endpoint: plan.endpoint,
        });
        Some(plan.correlation)
    }

    /// Look up the active slot for a triple, if any
    #[must_use]
    pub fn is_transition_running(
        &self,
        endpoint: u8,
        cluster: u16,
        attribute: u16,
    ) -> Option<SlotId> {
        self.shared
            .registry
            .lock()
            .expect("slot registry lock poisoned")
            .find_active(endpoint, cluster, attribute)
    }

    /// Remaining transition time of a slot, in 100 ms units
    #[must_use]
    pub fn remaining_time(&self, slot: SlotId) -> Option<u16> {
        let registry = self.shared.registry.lock().expect("slot registry lock poisoned");
        let remaining = registry.slot(slot)?.plan()?.remaining_units();
        Some(remaining)
    }
}

impl<H> Drop for CvcEngine<H> {
    fn drop(&mut self) {
        // Timer tasks hold their own handle to the shared state; abort them
        // so no ramp keeps stepping past the engine's lifetime.
        if let Ok(mut registry) = self.shared.registry.lock() {
            registry.abort_all();
        }
    }
}
