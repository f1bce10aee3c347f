//! I/O abstraction for time and randomness
//!
//! TigerStyle: all non-deterministic inputs go through traits.
//!
//! The mock backends generate randomized synthetic data and the remote
//! tool cache reads a clock. Both flow through this module so production
//! wiring and tests share the same code paths: tests inject a seeded RNG
//! or a manually advanced clock, production uses the wall clock and a
//! system-seeded generator.
//!
//! Components receive an [`IoContext`] at construction instead of reaching
//! for process-global state.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

// ============================================================================
// Time Provider
// ============================================================================

/// Clock abstraction
///
/// Code that needs the current time or a delay uses this trait rather than
/// `SystemTime::now()` directly.
#[async_trait]
pub trait TimeProvider: Send + Sync + std::fmt::Debug {
    /// Current time in milliseconds since the Unix epoch
    fn now_ms(&self) -> u64;

    /// Sleep for the given number of milliseconds
    async fn sleep_ms(&self, ms: u64);
}

/// Production clock backed by the system wall clock
#[derive(Debug, Clone, Default)]
pub struct WallClock;

impl WallClock {
    /// Create a new wall clock
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TimeProvider for WallClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    async fn sleep_ms(&self, ms: u64) {
        tokio::time::sleep(tokio::time::Duration::from_millis(ms)).await;
    }
}

/// Manually advanced clock for tests
///
/// `sleep_ms` advances the clock instead of waiting.
#[derive(Debug)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    /// Create a clock pinned at the given epoch milliseconds
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(start_ms),
        }
    }

    /// Advance the clock by the given number of milliseconds
    pub fn advance_ms(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

#[async_trait]
impl TimeProvider for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    async fn sleep_ms(&self, ms: u64) {
        self.advance_ms(ms);
    }
}

// ============================================================================
// RNG Provider
// ============================================================================

/// Random number generator abstraction
///
/// Not cryptographically secure; used only for synthetic data generation.
/// The trait is object-safe so it can live behind `Arc<dyn RngProvider>`;
/// selection from slices is done by index via [`RngProvider::pick_index`].
pub trait RngProvider: Send + Sync + std::fmt::Debug {
    /// Generate a random u64
    fn next_u64(&self) -> u64;

    /// Generate a random f64 in [0, 1)
    fn next_f64(&self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a random u64 in [min, max)
    fn gen_range(&self, min: u64, max: u64) -> u64 {
        assert!(min < max, "min must be less than max");
        min + self.next_u64() % (max - min)
    }

    /// Generate a random i64 in [min, max] (inclusive)
    fn gen_range_i64(&self, min: i64, max: i64) -> i64 {
        assert!(min <= max, "min must not exceed max");
        let span = (max - min) as u64 + 1;
        min + (self.next_u64() % span) as i64
    }

    /// Generate a random f64 in [min, max)
    fn gen_range_f64(&self, min: f64, max: f64) -> f64 {
        assert!(min <= max, "min must not exceed max");
        min + self.next_f64() * (max - min)
    }

    /// Generate a random bool that is true with the given probability
    fn gen_bool(&self, probability: f64) -> bool {
        assert!(
            (0.0..=1.0).contains(&probability),
            "probability must be in [0, 1]"
        );
        self.next_f64() < probability
    }

    /// Pick a uniform index into a collection of the given length
    fn pick_index(&self, len: usize) -> usize {
        assert!(len > 0, "cannot pick from an empty collection");
        (self.next_u64() % len as u64) as usize
    }
}

/// Production RNG using an atomic splitmix-style generator
///
/// Lock-free and thread-safe; seedable for reproducible tests.
#[derive(Debug)]
pub struct SystemRng {
    state: AtomicU64,
}

impl SystemRng {
    /// Create a generator seeded from the system clock
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x9E37_79B9_7F4A_7C15);
        Self::with_seed(seed)
    }

    /// Create a generator with an explicit seed (for tests)
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: AtomicU64::new(seed),
        }
    }
}

impl Default for SystemRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngProvider for SystemRng {
    fn next_u64(&self) -> u64 {
        // splitmix64: each call advances the state by a fixed odd constant
        // and finalizes it through two multiply-xorshift rounds.
        let state = self
            .state
            .fetch_add(0x9E37_79B9_7F4A_7C15, Ordering::Relaxed)
            .wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

// ============================================================================
// I/O Context
// ============================================================================

/// Bundle of the time and randomness providers
///
/// Constructed once at startup and handed to whichever component needs
/// clock or RNG access; tests build one per case with seeded providers.
#[derive(Clone)]
pub struct IoContext {
    /// Clock
    pub time: Arc<dyn TimeProvider>,
    /// Random number generator
    pub rng: Arc<dyn RngProvider>,
}

impl std::fmt::Debug for IoContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoContext")
            .field("time", &self.time)
            .field("rng", &self.rng)
            .finish()
    }
}

impl Default for IoContext {
    fn default() -> Self {
        Self::production()
    }
}

impl IoContext {
    /// Production context: wall clock + system-seeded RNG
    pub fn production() -> Self {
        Self {
            time: Arc::new(WallClock::new()),
            rng: Arc::new(SystemRng::new()),
        }
    }

    /// Context with custom providers
    pub fn new(time: Arc<dyn TimeProvider>, rng: Arc<dyn RngProvider>) -> Self {
        Self { time, rng }
    }

    /// Seeded context with a manual clock (for tests)
    pub fn seeded(seed: u64, start_ms: u64) -> Self {
        Self {
            time: Arc::new(ManualClock::new(start_ms)),
            rng: Arc::new(SystemRng::with_seed(seed)),
        }
    }

    /// Current time in milliseconds since the Unix epoch
    pub fn now_ms(&self) -> u64 {
        self.time.now_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_clock_monotone_enough() {
        let clock = WallClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(a > 1_577_836_800_000); // after Jan 1, 2020
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_ms(), 1_000);
        clock.advance_ms(250);
        assert_eq!(clock.now_ms(), 1_250);
    }

    #[tokio::test]
    async fn test_manual_clock_sleep_advances() {
        let clock = ManualClock::new(0);
        clock.sleep_ms(5_000).await;
        assert_eq!(clock.now_ms(), 5_000);
    }

    #[test]
    fn test_system_rng_deterministic_with_seed() {
        let a = SystemRng::with_seed(42);
        let b = SystemRng::with_seed(42);
        assert_eq!(a.next_u64(), b.next_u64());
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn test_gen_range_f64_within_bounds() {
        let rng = SystemRng::with_seed(7);
        for _ in 0..200 {
            let v = rng.gen_range_f64(65.0, 85.0);
            assert!((65.0..85.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn test_gen_range_i64_inclusive() {
        let rng = SystemRng::with_seed(11);
        let mut saw_min = false;
        let mut saw_max = false;
        for _ in 0..500 {
            let v = rng.gen_range_i64(1, 3);
            assert!((1..=3).contains(&v));
            saw_min |= v == 1;
            saw_max |= v == 3;
        }
        assert!(saw_min && saw_max);
    }

    #[test]
    fn test_pick_index_within_len() {
        let rng = SystemRng::with_seed(3);
        for _ in 0..100 {
            assert!(rng.pick_index(5) < 5);
        }
    }

    #[test]
    fn test_gen_bool_extremes() {
        let rng = SystemRng::with_seed(9);
        for _ in 0..10 {
            assert!(!rng.gen_bool(0.0));
            assert!(rng.gen_bool(1.0));
        }
    }

    #[test]
    fn test_io_context_seeded() {
        let ctx = IoContext::seeded(42, 1_700_000_000_000);
        assert_eq!(ctx.now_ms(), 1_700_000_000_000);
    }
}
