//! Internal utilities.
//!
//! - [`det_rng`]: seedable xorshift64 PRNG backing reproducible retry jitter.

pub mod det_rng;

pub use det_rng::DetRng;
