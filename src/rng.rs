//! Randomness source used by the sampling and repair operations.
//!
//! `Valuation`'s randomized methods are generic over [`RandomSource`] rather
//! than hard-wired to `rand::Rng`, so the core can be driven by whatever
//! generator an embedding solver already carries (a `rand::rngs::StdRng`
//! seeded for reproducible runs, a counter-based PRNG, or a narrow
//! hardware source that only ever hands back a handful of bits at a time).

/// A source of 32-bit random words.
///
/// `next_word` is the only required primitive; everything else in this
/// crate that needs randomness builds on top of it.
pub trait RandomSource {
    /// Returns the next pseudo-random 32-bit word.
    fn next_word(&mut self) -> u32;
}

#[cfg(feature = "rand")]
mod rand_adapter {
    use super::RandomSource;
    use rand::RngCore;

    /// Blanket adapter: any `rand::RngCore` is a [`RandomSource`].
    impl<R: RngCore + ?Sized> RandomSource for R {
        fn next_word(&mut self) -> u32 {
            self.next_u32()
        }
    }
}
