//! Ordered, latent message link
//!
//! Models the delivery contract the sync protocol assumes: in order, at
//! most once, after a base latency plus seeded jitter. Jittered delivery
//! times are monotonized so a late sample can never reorder the queue.

use std::collections::VecDeque;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tempo_core::SessionInstant;

/// One direction of a simulated connection.
pub struct OrderedLink<T> {
    base_latency: Duration,
    jitter: Duration,
    rng: StdRng,
    queue: VecDeque<(SessionInstant, T)>,
    last_delivery: SessionInstant,
}

impl<T> OrderedLink<T> {
    pub fn new(base_latency: Duration, jitter: Duration, seed: u64) -> Self {
        OrderedLink {
            base_latency,
            jitter,
            rng: StdRng::seed_from_u64(seed),
            queue: VecDeque::new(),
            last_delivery: SessionInstant::ZERO,
        }
    }

    /// Fixed-latency link without jitter.
    pub fn fixed(latency: Duration) -> Self {
        Self::new(latency, Duration::ZERO, 0)
    }

    /// Enqueue a message sent at `now`.
    pub fn send(&mut self, now: SessionInstant, message: T) {
        let jitter_ms = if self.jitter.is_zero() {
            0
        } else {
            self.rng.gen_range(0..=self.jitter.as_millis() as u64)
        };

        let mut delivery = now + self.base_latency + Duration::from_millis(jitter_ms);
        if delivery < self.last_delivery {
            delivery = self.last_delivery;
        }
        self.last_delivery = delivery;
        self.queue.push_back((delivery, message));
    }

    /// Remove and return every message due by `now`, in send order.
    pub fn drain_ready(&mut self, now: SessionInstant) -> Vec<T> {
        let mut ready = Vec::new();
        while self.queue.front().map_or(false, |(due, _)| *due <= now) {
            if let Some((_, message)) = self.queue.pop_front() {
                ready.push(message);
            }
        }
        ready
    }

    /// Messages sent but not yet delivered.
    pub fn in_flight(&self) -> usize {
        self.queue.len()
    }
}
