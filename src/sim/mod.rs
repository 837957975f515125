//! Deterministic simulation primitives.
//!
//! Invariants:
//! - `SimClock` is monotonic and advances only through `tick`.
//! - `TraceRing` never exceeds its capacity and evicts oldest events first.
//! - `SimRng` is deterministic and remaps a zero seed to a non-zero state.

pub mod clock;
pub mod rng;
pub mod trace;

pub use clock::SimClock;
pub use rng::SimRng;
pub use trace::{TraceEvent, TraceRing};
