//! Seeded RNG for workload generation.
//!
//! xorshift64* keeps output identical across platforms so a seed always maps
//! to the same task set. Not suitable for anything security related.

/// Single-state 64-bit generator.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Seed the generator. Zero is the xorshift fixed point, so it is replaced
    /// by a fixed odd constant.
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state }
    }

    #[inline(always)]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform value in `[lo, hi]` (inclusive on both ends).
    #[inline(always)]
    pub fn between(&mut self, lo: u64, hi: u64) -> u64 {
        debug_assert!(lo <= hi);
        let span = hi - lo;
        if span == u64::MAX {
            return self.next_u64();
        }
        lo + self.next_u64() % (span + 1)
    }

    /// True with probability `num / den`.
    #[inline(always)]
    pub fn chance(&mut self, num: u32, den: u32) -> bool {
        debug_assert!(den > 0 && num <= den);
        self.next_u64() % u64::from(den) < u64::from(num)
    }
}
