//! TickScheduler - whole-tick delivery to registered consumers

use std::time::Duration;

use tempo_core::{SessionInstant, TempoResult};

use crate::TickClock;

/// Upper bound on catch-up work per update after a stall.
pub const MAX_CATCHUP: u64 = 100;

/// A simulation step driven once per whole tick.
pub trait TickConsumer {
    /// Advance the consumer by one tick. `dt` is always one tick's worth
    /// of time; `tick` is the absolute tick number being simulated.
    fn step(&mut self, dt: Duration, tick: u64) -> TempoResult<()>;
}

/// Handle for removing a registered consumer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ConsumerId(u64);

enum RegistryEdit {
    Add(ConsumerId, Box<dyn TickConsumer>),
    Remove(ConsumerId),
}

/// Drives registered consumers once per whole tick elapsed since the
/// previous update, in registration order.
pub struct TickScheduler {
    clock: TickClock,
    consumers: Vec<(ConsumerId, Box<dyn TickConsumer>)>,
    pending: Vec<RegistryEdit>,
    next_id: u64,
}

impl TickScheduler {
    pub fn new(clock: TickClock) -> Self {
        TickScheduler {
            clock,
            consumers: Vec::new(),
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a consumer. Takes effect at the start of the next
    /// `update`, never mid-iteration.
    pub fn add(&mut self, consumer: Box<dyn TickConsumer>) -> ConsumerId {
        let id = ConsumerId(self.next_id);
        self.next_id += 1;
        self.pending.push(RegistryEdit::Add(id, consumer));
        id
    }

    /// Deregister a consumer. Takes effect at the start of the next
    /// `update`.
    pub fn remove(&mut self, id: ConsumerId) {
        self.pending.push(RegistryEdit::Remove(id));
    }

    /// Run every consumer once per due tick, bounded by [`MAX_CATCHUP`]
    /// ticks per call. Returns the number of ticks delivered.
    ///
    /// The first consumer fault propagates immediately and abandons the
    /// remainder of the pass; ticks fully simulated before the fault
    /// stay delivered, the faulting tick does not.
    pub fn update(&mut self, now: SessionInstant) -> TempoResult<u64> {
        self.apply_pending();

        let ticks_to_run = self.clock.due_ticks(now).min(MAX_CATCHUP);
        let dt = self.clock.config().tick_interval();
        let first = self.clock.last_tick() + 1;

        for i in 0..ticks_to_run {
            for (_, consumer) in self.consumers.iter_mut() {
                if let Err(fault) = consumer.step(dt, first + i) {
                    self.clock.advance(i);
                    return Err(fault);
                }
            }
        }

        self.clock.advance(ticks_to_run);
        Ok(ticks_to_run)
    }

    /// Consumers currently in the registry (pending edits excluded).
    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut TickClock {
        &mut self.clock
    }

    fn apply_pending(&mut self) {
        for edit in self.pending.drain(..) {
            match edit {
                RegistryEdit::Add(id, consumer) => self.consumers.push((id, consumer)),
                RegistryEdit::Remove(id) => self.consumers.retain(|(cid, _)| *cid != id),
            }
        }
    }
}
