//! Slot-wise equality indicator.

use crate::{Result, ops::pow::pow, traits::SlotCipher};

/// Builds slot-wise equality indicators between ciphertexts.
///
/// For a prime plaintext modulus `p`, Fermat's little theorem gives
/// `x^(p-1) = 1` for every non-zero `x` and `0^(p-1) = 0`, so that
/// `1 - (a - b)^(p-1)` holds 1 in the slots where `a` and `b` agree and 0
/// elsewhere.
pub struct EqualityMaskBuilder<'a, C: SlotCipher + ?Sized> {
    cipher: &'a C,
    ones: C::Ciphertext,
    exponent: u64,
}

impl<'a, C: SlotCipher + ?Sized> EqualityMaskBuilder<'a, C> {
    /// Creates a builder; this encrypts the all-ones vector once.
    pub fn new(cipher: &'a C) -> Result<Self> {
        Ok(Self {
            cipher,
            ones: cipher.encrypt_constant(1)?,
            exponent: cipher.plaintext_modulus() - 1,
        })
    }

    /// Returns a ciphertext whose slot `i` is 1 if `a[i] == b[i]`, and 0
    /// otherwise.
    pub fn build(&self, a: &C::Ciphertext, b: &C::Ciphertext) -> Result<C::Ciphertext> {
        let d = self.cipher.sub(a, b)?;
        let d = pow(self.cipher, &d, self.exponent)?;
        let d = self.cipher.negate(&d)?;
        self.cipher.add(&d, &self.ones)
    }
}
