use crate::kernel::{formulas::DIVISOR_FLOOR, types::Timestamp};

const MIN_HISTORY_CAPACITY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskSample {
    pub timestamp: Timestamp,
    pub risk: f64,
}

/// Fixed-capacity ring of recent risk samples; the oldest is overwritten.
#[derive(Debug, Clone)]
pub struct RiskHistory {
    samples: Vec<RiskSample>,
    capacity: usize,
    next: usize,
}

impl RiskHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            next: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a sample. Timestamps older than the newest sample, or NaN,
    /// are raised to it so the sequence stays non-decreasing.
    pub fn push(&mut self, timestamp: Timestamp, risk: f64) {
        let timestamp = match self.newest() {
            Some(newest) if timestamp.is_nan() || timestamp < newest.timestamp => {
                newest.timestamp
            }
            _ => timestamp,
        };
        let sample = RiskSample { timestamp, risk };

        if self.samples.len() < self.capacity {
            self.samples.push(sample);
        } else {
            self.samples[self.next] = sample;
        }
        self.next = (self.next + 1) % self.capacity;
    }

    pub fn newest(&self) -> Option<RiskSample> {
        self.back(0)
    }

    /// Sample `steps_back` positions before the newest one.
    pub fn back(&self, steps_back: usize) -> Option<RiskSample> {
        if steps_back >= self.samples.len() {
            return None;
        }
        let newest = (self.next + self.capacity - 1) % self.capacity;
        let index = (newest + self.capacity - steps_back) % self.capacity;
        self.samples.get(index).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Escalation {
    pub rate: f64,
    pub breaker_capacity: f64,
    pub emergency_index: f64,
}

#[derive(Debug, Clone)]
pub struct EscalationDetector {
    history: RiskHistory,
    lookback: usize,
    stabilizer: f64,
}

impl EscalationDetector {
    pub fn new(lookback_ticks: usize, stabilizer: f64) -> Self {
        let lookback = lookback_ticks.max(1);
        Self {
            history: RiskHistory::with_capacity(MIN_HISTORY_CAPACITY.max(lookback + 2)),
            lookback,
            stabilizer,
        }
    }

    pub fn history(&self) -> &RiskHistory {
        &self.history
    }

    /// Records `(now, risk)` and derives the escalation figures.
    ///
    /// The rate is the non-negative slope between the newest sample and the
    /// one `lookback` samples earlier; it stays at zero until enough samples
    /// exist. `instability` is phi3, so breaker capacity is `1 - phi3`.
    pub fn observe(&mut self, now: Timestamp, risk: f64, instability: f64) -> Escalation {
        self.history.push(now, risk);

        let rate = match (self.history.newest(), self.history.back(self.lookback)) {
            (Some(current), Some(past)) => {
                let dt = (current.timestamp - past.timestamp).max(DIVISOR_FLOOR);
                ((current.risk - past.risk) / dt).max(0.0)
            }
            _ => 0.0,
        };

        let breaker_capacity = 1.0 - instability;
        Escalation {
            rate,
            breaker_capacity,
            emergency_index: rate / (breaker_capacity + self.stabilizer),
        }
    }
}
