//! Aggregation of the masked record values.

use rayon::prelude::*;

use crate::{Error, Result, traits::SlotCipher};

/// Sums the masked values slot-wise.
///
/// When at most one record matched, the sum is the value of that record, or
/// the all-zero vector when none did. The additions are performed as a
/// parallel reduction, in no particular order. Returns an error if `masks`
/// is empty.
pub fn sum<C: SlotCipher + ?Sized>(cipher: &C, masks: &[C::Ciphertext]) -> Result<C::Ciphertext> {
    masks
        .par_iter()
        .cloned()
        .map(Ok)
        .try_reduce_with(|a, b| cipher.add(&a, &b))
        .unwrap_or(Err(Error::EmptyDatabase))
}
