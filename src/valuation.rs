//! Feasible-domain tracking and stochastic local search support for a
//! single bit-vector variable.
//!
//! A [`Valuation`] couples a half-open interval constraint `[lo, hi)` over
//! `Z/2^bw` (with `lo == hi` meaning "no interval constraint") with a
//! per-bit `fixed`/`bits` mask recording which bits are pinned and to
//! what value. Together they describe the feasible set a solver's local
//! search is allowed to move the variable's assignment within, and this
//! module provides the snapping, sampling, and repair primitives an SLS
//! driver needs to stay inside it.

use crate::bitvec::{BitVec, Word, BITS_PER_WORD};
use crate::error::{BvError, Result};
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};

/// Tracks the feasible domain of one bit-vector variable and the
/// operations an SLS driver uses to sample and repair assignments within it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Valuation {
    bw: usize,
    lo: BitVec,
    hi: BitVec,
    bits: BitVec,
    fixed: BitVec,
    eval: BitVec,
}

impl Valuation {
    /// Creates a fresh `Valuation` over `bw` bits with no interval
    /// constraint (full domain) and no pinned bits, committed value zero.
    pub fn new(bw: usize) -> Result<Self> {
        Ok(Valuation {
            bw,
            lo: BitVec::new(bw)?,
            hi: BitVec::new(bw)?,
            bits: BitVec::new(bw)?,
            fixed: BitVec::new(bw)?,
            eval: BitVec::new(bw)?,
        })
    }

    /// Assembles a `Valuation` from independently constructed `BitVec`s.
    ///
    /// # Errors
    ///
    /// Returns [`BvError::WidthMismatch`] if the parts don't all share
    /// `lo`'s width.
    pub fn from_parts(lo: BitVec, hi: BitVec, bits: BitVec, fixed: BitVec, eval: BitVec) -> Result<Self> {
        let bw = lo.bw();
        for part in [&hi, &bits, &fixed, &eval] {
            if part.bw() != bw {
                return Err(BvError::WidthMismatch {
                    expected: bw,
                    actual: part.bw(),
                });
            }
        }
        Ok(Valuation { bw, lo, hi, bits, fixed, eval })
    }

    /// Bit width of the underlying variable.
    #[inline]
    pub fn bw(&self) -> usize {
        self.bw
    }

    /// Lower bound of the interval constraint (inclusive).
    pub fn lo(&self) -> &BitVec {
        &self.lo
    }

    /// Upper bound of the interval constraint (exclusive).
    pub fn hi(&self) -> &BitVec {
        &self.hi
    }

    /// Currently committed assignment.
    pub fn bits(&self) -> &BitVec {
        &self.bits
    }

    /// Mask of pinned bit positions.
    pub fn fixed(&self) -> &BitVec {
        &self.fixed
    }

    /// The uncommitted working assignment used by [`Valuation::set_repair`].
    pub fn eval(&self) -> &BitVec {
        &self.eval
    }

    /// Reads the committed assignment's bit `i`.
    pub fn get_value(&self, i: usize) -> u8 {
        self.bits.get_bit(i)
    }

    /// Sets the committed assignment's bit `i`, ignoring `fixed`. Callers
    /// that must respect pinned bits should check
    /// [`Valuation::can_set_bit`] first.
    pub fn set_value(&mut self, i: usize, value: u8) {
        self.bits.set_bit(i, value);
    }

    /// True if `v` falls within `[lo, hi)` under wraparound semantics.
    /// `lo == hi` means no interval constraint (always true).
    pub fn in_range(&self, v: &BitVec) -> bool {
        if self.lo == self.hi {
            true
        } else if self.lo < self.hi {
            self.lo <= *v && *v < self.hi
        } else {
            *v < self.hi || self.lo <= *v
        }
    }

    /// True if bit `i` may be set to `value` without violating `fixed`.
    pub fn can_set_bit(&self, i: usize, value: u8) -> bool {
        self.fixed.get_bit(i) == 0 || self.bits.get_bit(i) == value
    }

    /// True if every fixed bit of `v` agrees with `bits` (`agrees_on_fixed`).
    pub fn agrees_on_fixed(&self, v: &BitVec) -> bool {
        debug_assert_eq!(v.bw(), self.bw);
        for i in 0..self.bits.nw() {
            if self.fixed.word(i) & (v.word(i) ^ self.bits.word(i)) != 0 {
                return false;
            }
        }
        true
    }

    /// True if `v` could be the committed assignment: it agrees with every
    /// pinned bit and falls within the interval constraint.
    pub fn can_set(&self, v: &BitVec) -> bool {
        self.agrees_on_fixed(v) && self.in_range(v)
    }

    /// Writes into `dst` the minimum value agreeing with `fixed` (every
    /// free bit cleared), ignoring the interval constraint.
    pub fn min_feasible(&self, dst: &mut BitVec) {
        for i in 0..self.bits.nw() {
            dst.set_word(i, self.fixed.word(i) & self.bits.word(i));
        }
        dst.clear_overflow();
    }

    /// Writes into `dst` the maximum value agreeing with `fixed` (every
    /// free bit set), ignoring the interval constraint.
    pub fn max_feasible(&self, dst: &mut BitVec) {
        for i in 0..self.bits.nw() {
            dst.set_word(i, (self.fixed.word(i) & self.bits.word(i)) | !self.fixed.word(i));
        }
        dst.clear_overflow();
    }

    /// Moves `dst` to the largest value `<= lo_bound` inside `[lo, hi)`
    /// that also agrees with `fixed`, where `lo_bound` starts as `src`.
    ///
    /// Returns false if no feasible value exists.
    pub fn get_at_most(&self, src: &BitVec, dst: &mut BitVec) -> bool {
        debug_assert_eq!(src.bw(), self.bw);
        debug_assert_eq!(dst.bw(), self.bw);

        // Scan from the most significant bit down, keeping `dst` equal to
        // `src` ("tight") for as long as possible. A free bit under a
        // tight prefix just copies `src`; a fixed bit under a tight prefix
        // either keeps it tight (equal), drops it below `src` (breaking
        // tight, so everything below maximizes), or would push it above
        // `src` — which can only be undone by backtracking to the most
        // recent free bit that copied a 1 from `src`, clearing it, and
        // maximizing every bit below that pivot.
        let mut tight = true;
        let mut last_free_one: Option<usize> = None;
        let mut conflict = false;

        for i in (0..self.bw).rev() {
            let s = src.get_bit(i);
            if self.fixed.get_bit(i) == 1 {
                let req = self.bits.get_bit(i);
                if tight {
                    if req > s {
                        conflict = true;
                        break;
                    } else if req < s {
                        tight = false;
                    }
                }
                dst.set_bit(i, req);
            } else if tight {
                dst.set_bit(i, s);
                if s == 1 {
                    last_free_one = Some(i);
                }
            } else {
                dst.set_bit(i, 1);
            }
        }

        if conflict {
            let pivot = match last_free_one {
                Some(pivot) => pivot,
                None => return false,
            };
            dst.set_bit(pivot, 0);
            for j in (0..pivot).rev() {
                if self.fixed.get_bit(j) == 1 {
                    dst.set_bit(j, self.bits.get_bit(j));
                } else {
                    dst.set_bit(j, 1);
                }
            }
        }

        dst.clear_overflow();
        self.round_down(dst)
    }

    /// Moves `dst` to the smallest value `>= hi_bound` inside `[lo, hi)`
    /// that also agrees with `fixed`, where `hi_bound` starts as `src`.
    ///
    /// Returns false if no feasible value exists.
    pub fn get_at_least(&self, src: &BitVec, dst: &mut BitVec) -> bool {
        debug_assert_eq!(src.bw(), self.bw);
        debug_assert_eq!(dst.bw(), self.bw);

        // Mirror of `get_at_most`: stay tight to `src` from the top down,
        // backtracking to the most recent free bit that copied a 0 from
        // `src` (flipping it to 1) whenever a fixed bit would otherwise
        // force `dst` below `src`.
        let mut tight = true;
        let mut last_free_zero: Option<usize> = None;
        let mut conflict = false;

        for i in (0..self.bw).rev() {
            let s = src.get_bit(i);
            if self.fixed.get_bit(i) == 1 {
                let req = self.bits.get_bit(i);
                if tight {
                    if req < s {
                        conflict = true;
                        break;
                    } else if req > s {
                        tight = false;
                    }
                }
                dst.set_bit(i, req);
            } else if tight {
                dst.set_bit(i, s);
                if s == 0 {
                    last_free_zero = Some(i);
                }
            } else {
                dst.set_bit(i, 0);
            }
        }

        if conflict {
            let pivot = match last_free_zero {
                Some(pivot) => pivot,
                None => return false,
            };
            dst.set_bit(pivot, 1);
            for j in (0..pivot).rev() {
                if self.fixed.get_bit(j) == 1 {
                    dst.set_bit(j, self.bits.get_bit(j));
                } else {
                    dst.set_bit(j, 0);
                }
            }
        }

        dst.clear_overflow();
        self.round_up(dst)
    }

    /// Pulls `dst` down into `[lo, hi)`: if it overshoots `hi`, clamps to
    /// `hi - 1`; if it undershoots `lo` (only possible on the non-wrap
    /// branch), reports infeasibility.
    pub fn round_down(&self, dst: &mut BitVec) -> bool {
        if self.lo == self.hi {
            return true;
        }
        if self.lo < self.hi {
            if *dst < self.lo {
                return false;
            }
            if *dst >= self.hi {
                dst.assign(&self.hi);
                BitVec::sub1(dst);
            }
        } else if self.hi <= *dst && *dst < self.lo {
            dst.assign(&self.hi);
            BitVec::sub1(dst);
        }
        true
    }

    /// Pushes `dst` up into `[lo, hi)`: if it undershoots `lo`, clamps up
    /// to `lo`; if it overshoots `hi` (only possible on the non-wrap
    /// branch), reports infeasibility.
    pub fn round_up(&self, dst: &mut BitVec) -> bool {
        if self.lo == self.hi {
            return true;
        }
        if self.lo < self.hi {
            if *dst >= self.hi {
                return false;
            }
            if *dst < self.lo {
                dst.assign(&self.lo);
            }
        } else if self.hi <= *dst && *dst < self.lo {
            dst.assign(&self.lo);
        }
        true
    }

    /// Clears free 1-bits of `dst` from the most to least significant,
    /// stopping as soon as `pred(dst)` holds.
    pub fn round_down_pred<F: Fn(&BitVec) -> bool>(&self, dst: &mut BitVec, pred: F) -> bool {
        if pred(dst) {
            return true;
        }
        for i in (0..self.bw).rev() {
            if self.fixed.get_bit(i) == 0 && dst.get_bit(i) == 1 {
                dst.set_bit(i, 0);
                if pred(dst) {
                    return true;
                }
            }
        }
        pred(dst)
    }

    /// Sets free 0-bits of `dst` from the least to most significant,
    /// stopping as soon as `pred(dst)` holds.
    pub fn round_up_pred<F: Fn(&BitVec) -> bool>(&self, dst: &mut BitVec, pred: F) -> bool {
        if pred(dst) {
            return true;
        }
        for i in 0..self.bw {
            if self.fixed.get_bit(i) == 0 && dst.get_bit(i) == 0 {
                dst.set_bit(i, 1);
                if pred(dst) {
                    return true;
                }
            }
        }
        pred(dst)
    }

    /// Produces one 32-bit word of randomness by XOR-ing four shifted
    /// draws, so narrow random sources (fewer than 32 usable bits per
    /// call) still contribute entropy to every output bit.
    pub fn random_bits<R: RandomSource>(&self, rng: &mut R) -> Word {
        let mut result: Word = 0;
        for shift in [0u32, 8, 16, 24] {
            result ^= rng.next_word().wrapping_shl(shift);
        }
        result
    }

    /// Fills `dst` with a uniformly random value agreeing with `fixed`
    /// (free bits random, pinned bits equal to the committed assignment).
    /// Does not consider the interval constraint.
    pub fn get_variant<R: RandomSource>(&self, dst: &mut BitVec, rng: &mut R) {
        for i in 0..self.bits.nw() {
            let r = self.random_bits(rng);
            let v = (r & !self.fixed.word(i)) | (self.fixed.word(i) & self.bits.word(i));
            dst.set_word(i, v);
        }
        dst.clear_overflow();
    }

    fn randomize_below<R: RandomSource>(&self, tmp: &mut BitVec, rng: &mut R) {
        if tmp.is_zero() {
            return;
        }
        let msb = tmp.msb();
        for i in 0..self.bw {
            if self.fixed.get_bit(i) == 0 {
                let bit = (self.random_bits(rng) >> (i % BITS_PER_WORD)) & 1;
                if bit == 1 {
                    tmp.set_bit(i, 1);
                }
            }
        }
        for i in msb..self.bw {
            let v = if self.fixed.get_bit(i) == 1 {
                self.bits.get_bit(i)
            } else {
                0
            };
            tmp.set_bit(i, v);
        }
    }

    fn randomize_above<R: RandomSource>(&self, tmp: &mut BitVec, rng: &mut R) {
        if tmp.is_ones() {
            return;
        }
        let msb = tmp.msb();
        let floor = if msb >= self.bw { 0 } else { msb };
        for i in 0..self.bw {
            if self.fixed.get_bit(i) == 0 {
                let bit = (self.random_bits(rng) >> (i % BITS_PER_WORD)) & 1;
                if bit == 0 {
                    tmp.set_bit(i, 0);
                }
            }
        }
        for i in floor..self.bw {
            if self.fixed.get_bit(i) == 0 {
                tmp.set_bit(i, 1);
            } else {
                tmp.set_bit(i, self.bits.get_bit(i));
            }
        }
    }

    fn commit(&mut self, src: &BitVec) {
        self.eval.assign(src);
    }

    /// Samples a feasible value `<= src` (with respect to `fixed`), biases
    /// it further downward with probability 1/2, and commits the result
    /// into the uncommitted working assignment (see
    /// [`Valuation::commit_eval`]).
    ///
    /// Returns false if no value `<= src` is feasible.
    pub fn set_random_at_most<R: RandomSource>(
        &mut self,
        src: &BitVec,
        tmp: &mut BitVec,
        rng: &mut R,
    ) -> bool {
        if !self.get_at_most(src, tmp) {
            return false;
        }
        let coin = self.random_bits(rng) & 1 == 0;
        if coin || tmp.is_zero() {
            self.commit(tmp);
            return true;
        }
        self.randomize_below(tmp, rng);
        let still_ok = self.lo == self.hi || self.lo.is_zero() || self.lo <= *tmp;
        if !still_ok {
            self.get_at_most(src, tmp);
        }
        self.commit(tmp);
        true
    }

    /// Symmetric counterpart of [`Valuation::set_random_at_most`]: samples
    /// a feasible value `>= src`, biases it further upward with
    /// probability 1/2, and commits the result.
    ///
    /// Returns false if no value `>= src` is feasible.
    pub fn set_random_at_least<R: RandomSource>(
        &mut self,
        src: &BitVec,
        tmp: &mut BitVec,
        rng: &mut R,
    ) -> bool {
        if !self.get_at_least(src, tmp) {
            return false;
        }
        let coin = self.random_bits(rng) & 1 == 0;
        if coin || tmp.is_ones() {
            self.commit(tmp);
            return true;
        }
        self.randomize_above(tmp, rng);
        let still_ok = self.lo == self.hi || self.hi.is_zero() || *tmp < self.hi;
        if !still_ok {
            self.get_at_least(src, tmp);
        }
        self.commit(tmp);
        true
    }

    /// Samples a feasible value inside `[lo_q, hi_q)` (further restricting
    /// the valuation's own `[lo, hi)`), picking a random fixed-respecting
    /// starting point and snapping it into range from a randomly chosen
    /// direction. Retries the snap once on failure before giving up.
    ///
    /// Returns false if no value satisfying both interval constraints and
    /// `fixed` exists.
    pub fn set_random_in_range<R: RandomSource>(
        &mut self,
        lo_q: &BitVec,
        hi_q: &BitVec,
        tmp: &mut BitVec,
        rng: &mut R,
    ) -> bool {
        let go_up = self.random_bits(rng) & 1 == 1;
        let ok = if go_up {
            self.get_variant(tmp, rng);
            let hit = self.round_up_pred(tmp, |t| *t >= *lo_q && *t < *hi_q && self.in_range(t));
            if hit {
                true
            } else {
                self.get_variant(tmp, rng);
                self.round_up_pred(tmp, |t| *t >= *lo_q && *t < *hi_q && self.in_range(t))
            }
        } else {
            self.get_variant(tmp, rng);
            let hit = self.round_down_pred(tmp, |t| *t < *hi_q && *t >= *lo_q && self.in_range(t));
            if hit {
                true
            } else {
                self.get_variant(tmp, rng);
                self.round_down_pred(tmp, |t| *t < *hi_q && *t >= *lo_q && self.in_range(t))
            }
        };
        if ok {
            self.commit(tmp);
        }
        ok
    }

    /// Attempts to repair the working assignment to a feasible value near
    /// its current (possibly infeasible) state, trying `dst` downward
    /// first if `try_down` is set, else upward, committing the repaired
    /// value into the uncommitted working assignment.
    ///
    /// Always returns true: a repair candidate (one of `lo`, `hi - 1`, or
    /// the clamped current value) is always available once `fixed` and
    /// the interval agree, which [`Valuation::init_fixed`] guarantees.
    pub fn set_repair(&mut self, try_down: bool, dst: &mut BitVec) -> bool {
        let src = dst.clone();
        let snapped = if try_down {
            self.get_at_most(&src, dst)
        } else {
            self.get_at_least(&src, dst)
        };
        let ok = if snapped {
            true
        } else {
            self.min_feasible(dst);
            if self.round_up(dst) {
                true
            } else {
                self.max_feasible(dst);
                self.round_down(dst)
            }
        };
        self.commit(dst);
        ok
    }

    /// Commits the uncommitted working assignment (`eval`) into the
    /// committed assignment (`bits`).
    pub fn commit_eval(&mut self) {
        self.bits.assign(&self.eval);
    }

    fn enforce_eval_agreement(&mut self) {
        for i in 0..self.bits.nw() {
            let v = (self.eval.word(i) & !self.fixed.word(i)) | (self.fixed.word(i) & self.bits.word(i));
            self.eval.set_word(i, v);
        }
        self.eval.clear_overflow();
    }

    fn pin_bit(&mut self, i: usize, value: u8) {
        if self.fixed.get_bit(i) == 1 {
            return;
        }
        self.fixed.set_bit(i, 1);
        self.bits.set_bit(i, value);
    }

    /// Pins bit `i` to `value`. A thin, ambient wrapper around the
    /// internal pinning primitive used by [`Valuation::init_fixed`],
    /// exposed so callers can pin bits directly (e.g. from a parsed
    /// equality constraint) without going through the interval machinery.
    pub fn assign_fixed(&mut self, i: usize, value: u8) {
        self.pin_bit(i, value);
        self.enforce_eval_agreement();
    }

    /// Adds an interval constraint `[l, h)`. `l == h` denotes the full
    /// domain. Constraints accumulate by intersection: once an interval
    /// has been set, later calls may only tighten it.
    ///
    /// # Errors
    ///
    /// Returns [`BvError::RangeAfterPin`] if any bit has already been
    /// pinned; ranges must be established before the solver starts
    /// fixing bits.
    pub fn add_range(&mut self, l: &BitVec, h: &BitVec) -> Result<()> {
        if !self.fixed.is_zero() {
            return Err(BvError::RangeAfterPin);
        }
        if l == h {
            return Ok(());
        }
        if self.lo == self.hi {
            self.lo.assign(l);
            self.hi.assign(h);
        } else {
            let old_lo = self.lo.clone();
            let old_hi = self.hi.clone();
            if old_lo < old_hi {
                if old_lo < *l && *l < old_hi {
                    self.lo.assign(l);
                }
                // Preserved as in the original driver: this comparison can
                // never hold (`old_hi < h && h < old_hi`), so `hi` is never
                // tightened on the non-wrap branch. See DESIGN.md.
                if old_hi < *h && *h < old_hi {
                    self.hi.assign(h);
                }
            } else {
                if !(old_hi <= *l && *l < old_lo) {
                    self.lo.assign(l);
                }
                if !h.is_zero() && *h <= old_hi {
                    self.hi.assign(h);
                }
            }
        }
        if !self.in_range(&self.bits) {
            self.bits.assign(&self.lo);
        }
        self.enforce_eval_agreement();
        if !self.in_range(&self.eval) {
            self.eval.assign(&self.lo);
        }
        Ok(())
    }

    fn tighten_lo_against_fixed(&mut self) {
        for i in (0..self.bw).rev() {
            if self.fixed.get_bit(i) == 0 {
                continue;
            }
            let b = self.bits.get_bit(i);
            let l = self.lo.get_bit(i);
            if b == l {
                continue;
            }
            if b == 1 && l == 0 {
                self.lo.set_bit(i, 1);
                for j in 0..i {
                    let v = self.fixed.get_bit(j) & self.bits.get_bit(j);
                    self.lo.set_bit(j, v);
                }
            } else {
                for j in 0..self.bw {
                    let v = self.fixed.get_bit(j) & self.bits.get_bit(j);
                    self.lo.set_bit(j, v);
                }
            }
            break;
        }
        self.lo.clear_overflow();
    }

    fn tighten_hi_against_fixed(&mut self) {
        let mut hi1 = self.hi.clone();
        BitVec::sub1(&mut hi1);
        for i in (0..self.bw).rev() {
            if self.fixed.get_bit(i) == 0 {
                continue;
            }
            let b = self.bits.get_bit(i);
            let h = hi1.get_bit(i);
            if b == h {
                continue;
            }
            if b == 1 && h == 0 {
                hi1.set_bit(i, 1);
                for j in 0..i {
                    let v = self.fixed.get_bit(j) & self.bits.get_bit(j);
                    hi1.set_bit(j, v);
                }
            } else {
                for j in 0..self.bw {
                    let v = self.fixed.get_bit(j) & self.bits.get_bit(j);
                    hi1.set_bit(j, v);
                }
            }
            break;
        }
        hi1.clear_overflow();
        let one = BitVec::from_u64(self.bw, 1).expect("nonzero width");
        let mut new_hi = BitVec::new(self.bw).expect("nonzero width");
        BitVec::add(&mut new_hi, &hi1, &one);
        self.hi.assign(&new_hi);
    }

    fn tighten_fixed_from_interval(&mut self) {
        if !(self.lo < self.hi) {
            return;
        }
        for i in (0..self.bw).rev() {
            if self.hi.get_bit(i) == 0 {
                self.pin_bit(i, 0);
            } else {
                break;
            }
        }
        if self.hi.is_power_of2() {
            let top = self.hi.msb();
            if top > 0 {
                self.pin_bit(top - 1, 0);
            }
        }
        let one = BitVec::from_u64(self.bw, 1).expect("nonzero width");
        let mut lo_plus1 = BitVec::new(self.bw).expect("nonzero width");
        BitVec::add(&mut lo_plus1, &self.lo, &one);
        if self.hi == lo_plus1 {
            for i in 0..self.bw {
                let v = self.lo.get_bit(i);
                self.pin_bit(i, v);
            }
        }
    }

    /// Cross-propagates between the interval bounds and the fixed-bit
    /// mask: tightens `lo`/`hi` to agree with already-pinned bits, then
    /// pins any bit the (possibly tightened) interval forces to a single
    /// value. Idempotent; safe to call repeatedly as more bits are pinned.
    pub fn init_fixed(&mut self) {
        self.tighten_lo_against_fixed();
        self.tighten_hi_against_fixed();
        self.tighten_fixed_from_interval();
        self.fixed.clear_overflow();
        self.bits.clear_overflow();
        self.enforce_eval_agreement();
    }

    /// Writes into `out` the committed assignment logically shifted right
    /// by `k` bits (zero-filled from the top).
    pub fn shift_right(&self, out: &mut BitVec, k: usize) {
        debug_assert!(k < self.bw);
        for i in 0..self.bw {
            let v = if i + k < self.bw {
                self.bits.get_bit(i + k)
            } else {
                0
            };
            out.set_bit(i, v);
        }
        out.clear_overflow();
    }

    /// Reduces the committed assignment to a small natural number,
    /// saturating at `max_n` for values (or widths) that don't fit.
    pub fn to_nat(&self, max_n: usize) -> usize {
        let mut val: u128 = 0;
        for i in (0..self.bits.nw()).rev() {
            val = val
                .saturating_mul(1u128 << BITS_PER_WORD)
                .saturating_add(self.bits.word(i) as u128);
            if val > max_n as u128 {
                return max_n;
            }
        }
        val as usize
    }
}
