//! Logical clock driving the simulation.
//!
//! The clock is the only time source of the simulator. It never reads OS time
//! and only moves when the orchestrator finishes a tick, which keeps every run
//! replayable from its inputs alone.

/// Tick counter owned by the simulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimClock {
    now: u64,
}

impl SimClock {
    /// Create a clock at tick 0.
    pub fn new() -> Self {
        Self { now: 0 }
    }

    /// Current tick.
    #[inline(always)]
    pub fn now_ticks(&self) -> u64 {
        self.now
    }

    /// Advance by exactly one tick.
    #[inline(always)]
    pub fn tick(&mut self) {
        self.now = self.now.saturating_add(1);
    }
}
