//! Arbitrary-precision bridge between [`crate::bitvec::BitVec`] and
//! [`num_bigint::BigUint`].
//!
//! This module is pure plumbing: it exists so a caller that already
//! speaks host-native big integers (parsing a bit-vector literal from an
//! SMT-LIB script, say) can hand one to the core without writing its own
//! word-packing loop. None of the core's arithmetic goes through
//! `BigUint`; it stays on the word-level `add`/`sub`/`mul` in
//! [`crate::bitvec`] for performance. Gated behind the `bignum` feature
//! so a caller that never touches the outside world doesn't pay for the
//! dependency.

use crate::bitvec::{BitVec, BITS_PER_WORD};
use crate::error::Result;
use num_bigint::BigUint;

/// Converts `v` to a [`BigUint`]. Always exact: no truncation, no sign.
pub fn to_biguint(v: &BitVec) -> BigUint {
    BigUint::from_slice(v.words())
}

/// Builds a `bw`-bit [`BitVec`] from `value`, truncated mod `2^bw` if
/// `value` doesn't fit.
pub fn from_biguint(bw: usize, value: &BigUint) -> Result<BitVec> {
    let mut bv = BitVec::new(bw)?;
    for (i, word) in value.to_u32_digits().into_iter().enumerate() {
        if i >= bv.nw() {
            break;
        }
        bv.set_word(i, word);
    }
    bv.clear_overflow();
    Ok(bv)
}

/// Number of bits needed to represent `value` without truncation.
pub fn bits_needed(value: &BigUint) -> usize {
    value.bits().max(1) as usize
}

const _: () = assert!(BITS_PER_WORD == 32);
