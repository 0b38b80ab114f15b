//! Integration tests for `BitVec` multiword arithmetic and comparison.

use bv_sls_valuation::BitVec;
use proptest::prelude::*;

// =============================================================================
// Construction and Widths
// =============================================================================

#[test]
fn test_construction_widths() {
    for bw in [1, 7, 8, 31, 32, 33, 63, 64, 65, 129] {
        let bv = BitVec::new(bw).unwrap();
        assert_eq!(bv.bw(), bw);
        assert!(bv.is_zero());
        assert!(!bv.has_overflow());
    }
}

#[test]
fn test_zero_width_rejected() {
    assert!(BitVec::new(0).is_err());
}

#[test]
fn test_set_width_preserves_no_overflow() {
    let mut bv = BitVec::from_u64(16, 0xBEEF).unwrap();
    bv.set_width(8).unwrap();
    assert!(!bv.has_overflow());
    bv.set_width(40).unwrap();
    assert!(!bv.has_overflow());
}

// =============================================================================
// Bit-Level Access
// =============================================================================

#[test]
fn test_set_get_bit_across_word_boundary() {
    let mut bv = BitVec::new(65).unwrap();
    bv.set_bit(31, 1);
    bv.set_bit(32, 1);
    bv.set_bit(64, 1);
    assert_eq!(bv.get_bit(31), 1);
    assert_eq!(bv.get_bit(32), 1);
    assert_eq!(bv.get_bit(64), 1);
    assert_eq!(bv.get_bit(33), 0);
}

// =============================================================================
// Multiword Arithmetic
// =============================================================================

#[test]
fn test_add_wraps_mod_2_pow_bw() {
    let a = BitVec::from_u64(8, 255).unwrap();
    let one = BitVec::from_u64(8, 1).unwrap();
    let mut out = BitVec::new(8).unwrap();
    let overflow = BitVec::add(&mut out, &a, &one);
    assert!(overflow);
    assert!(out.is_zero());
}

#[test]
fn test_add_crosses_multiple_words() {
    let a = BitVec::from_u64(96, u64::MAX).unwrap();
    let b = BitVec::from_u64(96, 1).unwrap();
    let mut out = BitVec::new(96).unwrap();
    let overflow = BitVec::add(&mut out, &a, &b);
    assert!(!overflow);
    assert_eq!(out.to_string(), "100000000");
}

#[test]
fn test_sub_wraps() {
    let zero = BitVec::new(8).unwrap();
    let one = BitVec::from_u64(8, 1).unwrap();
    let mut out = BitVec::new(8).unwrap();
    let borrow = BitVec::sub(&mut out, &zero, &one);
    assert!(borrow);
    assert_eq!(out.to_string(), "ff");
}

#[test]
fn test_mul_no_overflow_when_unchecked() {
    let a = BitVec::from_u64(8, 250).unwrap();
    let b = BitVec::from_u64(8, 250).unwrap();
    let mut out = BitVec::new(8).unwrap();
    let overflow = BitVec::mul(&mut out, &a, &b, false);
    assert!(!overflow);
}

#[test]
fn test_sub1_decrements_and_wraps() {
    let mut v = BitVec::from_u64(8, 5).unwrap();
    BitVec::sub1(&mut v);
    assert_eq!(v.to_string(), "4");
    let mut zero = BitVec::new(4).unwrap();
    BitVec::sub1(&mut zero);
    assert_eq!(zero.to_string(), "f");
}

// =============================================================================
// Comparison and Display
// =============================================================================

#[test]
fn test_ordering_total() {
    let values = [0u64, 1, 127, 128, 255];
    let bvs: Vec<BitVec> = values.iter().map(|&v| BitVec::from_u64(8, v).unwrap()).collect();
    for i in 0..bvs.len() {
        for j in 0..bvs.len() {
            assert_eq!(bvs[i].cmp(&bvs[j]), values[i].cmp(&values[j]));
        }
    }
}

#[test]
fn test_display_hex_no_leading_zeros() {
    assert_eq!(BitVec::from_u64(32, 0x0F).unwrap().to_string(), "f");
    assert_eq!(BitVec::from_u64(32, 0).unwrap().to_string(), "0");
}

proptest! {
    #[test]
    fn prop_add_matches_u64(a in 0u64..1_000_000, b in 0u64..1_000_000) {
        let bv_a = BitVec::from_u64(32, a).unwrap();
        let bv_b = BitVec::from_u64(32, b).unwrap();
        let mut out = BitVec::new(32).unwrap();
        let overflow = BitVec::add(&mut out, &bv_a, &bv_b);
        let expected = (a + b) % (1u64 << 32);
        prop_assert_eq!(out, BitVec::from_u64(32, expected).unwrap());
        prop_assert_eq!(overflow, a + b >= (1u64 << 32));
    }

    #[test]
    fn prop_sub_matches_u64(a in 0u64..1_000_000, b in 0u64..1_000_000) {
        let bv_a = BitVec::from_u64(32, a).unwrap();
        let bv_b = BitVec::from_u64(32, b).unwrap();
        let mut out = BitVec::new(32).unwrap();
        let borrow = BitVec::sub(&mut out, &bv_a, &bv_b);
        let expected = a.wrapping_sub(b) & 0xFFFF_FFFF;
        prop_assert_eq!(out, BitVec::from_u64(32, expected).unwrap());
        prop_assert_eq!(borrow, a < b);
    }

    #[test]
    fn prop_ordering_matches_u64(a in 0u64..1_000_000, b in 0u64..1_000_000) {
        let bv_a = BitVec::from_u64(32, a).unwrap();
        let bv_b = BitVec::from_u64(32, b).unwrap();
        prop_assert_eq!(bv_a.cmp(&bv_b), a.cmp(&b));
    }
}
