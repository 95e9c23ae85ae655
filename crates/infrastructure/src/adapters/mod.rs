//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.
//! Stateful adapters keep per-key state in a [`KeyedRegistry`], so keys
//! never contend with each other.

mod circuit_breaker;
mod clock;
mod random;
mod rate_limiter;
mod registry;

pub use circuit_breaker::CircuitBreakerRegistry;
pub use clock::{ManualClock, SystemClock};
pub use random::{SeededRandom, ThreadRandom, random_source};
pub use rate_limiter::FixedWindowRateLimiter;
pub use registry::KeyedRegistry;
