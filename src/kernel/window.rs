use crate::kernel::types::Timestamp;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SlotCounters {
    violations: u64,
    requests: u64,
    retries: u64,
}

/// Trailing-window sums read by formula evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowTotals {
    pub violations: u64,
    pub requests: u64,
    pub retries: u64,
}

/// Rotating per-tick counters covering `slot_count * tick_seconds` of history.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    slots: Vec<SlotCounters>,
    current: usize,
    tick_seconds: f64,
    last_rotation: Timestamp,
}

impl SlidingWindow {
    pub fn new(window_seconds: u64, tick_seconds: u64, now: Timestamp) -> Self {
        let tick_seconds = tick_seconds.max(1);
        let slot_count = (window_seconds / tick_seconds).max(1) as usize;
        Self {
            slots: vec![SlotCounters::default(); slot_count],
            current: 0,
            tick_seconds: tick_seconds as f64,
            last_rotation: now,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn last_rotation(&self) -> Timestamp {
        self.last_rotation
    }

    pub fn record_violation(&mut self, count: u64) {
        let slot = &mut self.slots[self.current];
        slot.violations = slot.violations.saturating_add(count);
    }

    pub fn record_request(&mut self, retries: u64) {
        let slot = &mut self.slots[self.current];
        slot.requests = slot.requests.saturating_add(1);
        slot.retries = slot.retries.saturating_add(retries);
    }

    /// Rotates forward by the whole ticks elapsed since the last rotation.
    ///
    /// The rotation timestamp moves by whole ticks rather than to `now`, so
    /// slot boundaries keep their phase. Returns the number of ticks applied.
    pub fn advance(&mut self, now: Timestamp) -> u64 {
        let elapsed = now - self.last_rotation;
        if !elapsed.is_finite() || elapsed < self.tick_seconds {
            return 0;
        }

        let ticks = (elapsed / self.tick_seconds).floor() as u64;
        let slot_count = self.slots.len();
        let to_clear = ticks.min(slot_count as u64) as usize;
        let skipped = ((ticks - to_clear as u64) % slot_count as u64) as usize;

        // Ticks beyond one full lap only move the index.
        self.current = (self.current + skipped) % slot_count;
        for _ in 0..to_clear {
            self.current = (self.current + 1) % slot_count;
            self.slots[self.current] = SlotCounters::default();
        }

        self.last_rotation += ticks as f64 * self.tick_seconds;
        ticks
    }

    pub fn totals(&self) -> WindowTotals {
        self.slots
            .iter()
            .fold(WindowTotals::default(), |acc, slot| WindowTotals {
                violations: acc.violations.saturating_add(slot.violations),
                requests: acc.requests.saturating_add(slot.requests),
                retries: acc.retries.saturating_add(slot.retries),
            })
    }
}
