//! Bounded trace of task transitions for replay and debugging.
//!
//! Every state change the orchestrator applies is pushed as a [`TraceEvent`].
//! The ring keeps the most recent `cap` events; older ones are evicted first,
//! so long runs never grow the trace without bound.

use std::collections::VecDeque;

/// One transition applied by the simulator, tagged with its tick.
///
/// Task references are dense indices into the simulator's task table.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TraceEvent {
    Admit { tick: u64, task: u32 },
    Unblock { tick: u64, task: u32 },
    Dispatch { tick: u64, task: u32 },
    Preempt { tick: u64, task: u32 },
    Run { tick: u64, task: u32, remaining: u64 },
    Block { tick: u64, task: u32, ready_at: u64 },
    Terminate { tick: u64, task: u32 },
    Idle { tick: u64 },
}

impl TraceEvent {
    /// Tick at which the event was applied.
    pub fn tick(&self) -> u64 {
        match *self {
            Self::Admit { tick, .. }
            | Self::Unblock { tick, .. }
            | Self::Dispatch { tick, .. }
            | Self::Preempt { tick, .. }
            | Self::Run { tick, .. }
            | Self::Block { tick, .. }
            | Self::Terminate { tick, .. }
            | Self::Idle { tick } => tick,
        }
    }
}

/// Fixed-capacity ring of trace events.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TraceRing {
    cap: usize,
    buf: VecDeque<TraceEvent>,
    evicted: u64,
}

impl TraceRing {
    /// Create a ring holding at least one event.
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            buf: VecDeque::with_capacity(cap.min(4096)),
            evicted: 0,
        }
    }

    /// Maximum number of retained events.
    #[inline(always)]
    pub fn cap(&self) -> usize {
        self.cap
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of events dropped because the ring was full.
    #[inline(always)]
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Push an event, evicting the oldest when at capacity.
    #[inline(always)]
    pub fn push(&mut self, ev: TraceEvent) {
        if self.buf.len() == self.cap {
            self.buf.pop_front();
            self.evicted += 1;
        }
        self.buf.push_back(ev);
    }

    /// Iterate retained events oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TraceEvent> {
        self.buf.iter()
    }

    /// Snapshot the retained events in chronological order.
    pub fn dump(&self) -> Vec<TraceEvent> {
        self.buf.iter().cloned().collect()
    }
}
