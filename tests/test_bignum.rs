//! Integration tests for the optional `BigUint` bridge (`bignum` feature).

#![cfg(feature = "bignum")]

use bv_sls_valuation::bignum::{bits_needed, from_biguint, to_biguint};
use bv_sls_valuation::BitVec;
use num_bigint::BigUint;

#[test]
fn test_round_trip_wide_value() {
    let v = BitVec::from_u64(128, u64::MAX).unwrap();
    let big = to_biguint(&v);
    let back = from_biguint(128, &big).unwrap();
    assert_eq!(v, back);
}

#[test]
fn test_from_biguint_truncates() {
    let big = BigUint::from(1u32) << 40;
    let narrow = from_biguint(8, &big).unwrap();
    assert!(narrow.is_zero());
}

#[test]
fn test_bits_needed_matches_msb() {
    let v = BitVec::from_u64(16, 0x100).unwrap();
    let big = to_biguint(&v);
    assert_eq!(bits_needed(&big), v.msb() + 1);
}
