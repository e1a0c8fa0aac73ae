//! Homomorphic building blocks of the oblivious comparison.
//!
//! None of these operations branch on encrypted data: every selection is
//! expressed as modular arithmetic on the slots.

use crate::LookupParameters;

mod equality;
mod pow;
mod reduce;

pub use equality::EqualityMaskBuilder;
pub use pow::{multiplication_count, pow};
pub use reduce::reduce_all;

/// Multiplicative depth of comparing a ciphertext against a record and
/// masking the record value: the exponentiation to `p - 1`, the slot
/// reduction, and the final mask.
pub fn lookup_depth(params: &LookupParameters) -> usize {
    let exponent = params.plaintext_modulus.saturating_sub(1).max(1);
    let squarings = exponent.ilog2() as usize;
    let folds = usize::from(exponent.count_ones() > 1);
    squarings + folds + params.reduction_rounds() + 1
}
