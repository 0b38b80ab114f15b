//! A feasible-domain valuation core for bit-vector stochastic local search.
//!
//! This crate tracks, for a single fixed-width bit-vector variable, the
//! set of assignments a local-search driver is allowed to move it within:
//! a half-open interval `[lo, hi)` over `Z/2^bw` (wrapping allowed) and a
//! per-bit mask of positions pinned to a specific value. On top of that
//! state it provides the snapping, sampling, and repair primitives an SLS
//! loop needs — "round this candidate down/up into range", "sample a
//! random feasible value below this point", "repair an assignment that
//! just went infeasible" — without ever materializing the feasible set.
//!
//! # Key Characteristics
//!
//! - Multiword unsigned bit-vector arithmetic with explicit carry/borrow
//! - Wraparound-aware interval semantics (`lo > hi` denotes a wrapping
//!   range, `lo == hi` denotes no constraint)
//! - Randomized sampling and repair generic over any [`rng::RandomSource`]
//!
//! # Architecture
//!
//! - [`bitvec::BitVec`]: fixed-width multiword unsigned integer with
//!   word-level access, comparison, and `add`/`sub`/`mul`
//! - [`valuation::Valuation`]: the interval + fixed-bit feasible domain,
//!   and all snapping/sampling/repair operations over it
//! - [`rng::RandomSource`]: the minimal randomness trait the sampling
//!   operations are generic over
//! - [`bignum`] (optional, `bignum` feature): conversions to and from
//!   `num_bigint::BigUint` for callers that parse bit-vector literals
//!   from host-native big integers
//!
//! # Examples
//!
//! ## Constraining and sampling a variable
//!
//! ```
//! use bv_sls_valuation::{BitVec, Valuation};
//! use rand::SeedableRng;
//!
//! let mut v = Valuation::new(8).unwrap();
//! v.add_range(&BitVec::from_u64(8, 10).unwrap(), &BitVec::from_u64(8, 20).unwrap()).unwrap();
//! v.init_fixed();
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let mut tmp = BitVec::new(8).unwrap();
//! assert!(v.set_random_at_least(&BitVec::from_u64(8, 10).unwrap(), &mut tmp, &mut rng));
//! v.commit_eval();
//! assert!(v.in_range(v.bits()));
//! ```
//!
//! ## Snapping an infeasible candidate into range
//!
//! ```
//! use bv_sls_valuation::BitVec;
//!
//! let a = BitVec::from_u64(16, 1000).unwrap();
//! let b = BitVec::from_u64(16, 2000).unwrap();
//! let mut sum = BitVec::new(16).unwrap();
//! let overflow = BitVec::add(&mut sum, &a, &b);
//! assert!(!overflow);
//! assert_eq!(sum.to_string(), "bb8");
//! ```
//!
//! # Performance
//!
//! Every operation on a fixed-width `BitVec` is O(bw/32): word-level
//! loops, no allocation on the hot `get_at_most`/`get_at_least`/`round_*`
//! paths. `mul` allocates a `2*nw`-word scratch buffer for the full
//! double-width product.
//!
//! # Safety
//!
//! Width and index contracts (`get_bit`/`set_bit` bounds, matching widths
//! across operands) are checked with `debug_assert!`, giving zero-cost
//! checking in release builds and full validation under test. Violations
//! a caller can plausibly hit at construction time (zero width, mismatched
//! parts, adding a range after pinning) go through [`error::BvError`]
//! instead.

pub mod bitvec;
pub mod error;
pub mod rng;
pub mod valuation;

#[cfg(feature = "bignum")]
pub mod bignum;

pub use bitvec::{BitVec, Word, BITS_PER_WORD};
pub use error::{BvError, Result};
pub use rng::RandomSource;
pub use valuation::Valuation;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = "bv-sls-valuation";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_re_exports() {
        let _bv = BitVec::new(32).unwrap();
        let _v = Valuation::new(32).unwrap();
        let _result: Result<()> = Ok(());
        assert_eq!(BITS_PER_WORD, 32);
    }
}
