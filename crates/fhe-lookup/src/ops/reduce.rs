//! Reduction of all the slots of a ciphertext.

use crate::{Result, traits::SlotCipher};

/// Multiplies all the slots of `ct` together, leaving the product in every
/// slot. On a 0/1 indicator this is the logical AND of all the slots.
///
/// After the round with rotation `2^k`, each slot holds the product of a
/// window of `2^(k+1)` consecutive slots; the windows cover the whole vector
/// only when the slot count is a power of two, which
/// [`crate::LookupParameters::validate`] enforces.
pub fn reduce_all<C: SlotCipher + ?Sized>(cipher: &C, ct: &C::Ciphertext) -> Result<C::Ciphertext> {
    let slot_count = cipher.slot_count();
    let mut r = ct.clone();
    let mut rot = 1usize;
    while rot < slot_count {
        let tmp = cipher.rotate(&r, -(rot as isize))?;
        r = cipher.multiply(&r, &tmp)?;
        rot <<= 1;
    }
    Ok(r)
}
