//! Traits for the ciphertext capability used by the lookup protocol.

use crate::Result;

/// A homomorphic capability over encrypted vectors of integers modulo a
/// plaintext modulus `p`.
///
/// Each ciphertext encrypts `slot_count()` slots and every operation acts
/// slot-wise with exact modular arithmetic, except `rotate` which shifts the
/// slots cyclically. No operation reveals the encrypted values; only
/// [`SlotCipher::decrypt_decode`] does, and the lookup protocol calls it once,
/// on the aggregated result.
pub trait SlotCipher: Send + Sync {
    /// The ciphertext type of this capability.
    type Ciphertext: Clone + Send + Sync;

    /// Number of slots in a ciphertext; constant for the lifetime of the
    /// capability.
    fn slot_count(&self) -> usize;

    /// The plaintext modulus `p`.
    fn plaintext_modulus(&self) -> u64;

    /// Encodes and encrypts `values`. Values beyond the slot count are
    /// dropped, missing slots are set to zero, and every value is reduced
    /// modulo `p`.
    fn encode_encrypt(&self, values: &[u64]) -> Result<Self::Ciphertext>;

    /// Decrypts and decodes a ciphertext into exactly `slot_count()` values in
    /// `[0, p)`.
    fn decrypt_decode(&self, ct: &Self::Ciphertext) -> Result<Vec<u64>>;

    /// Slot-wise `a + b`.
    fn add(&self, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Result<Self::Ciphertext>;

    /// Slot-wise `a - b`.
    fn sub(&self, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Result<Self::Ciphertext>;

    /// Slot-wise `a * b`.
    fn multiply(&self, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Result<Self::Ciphertext>;

    /// Slot-wise `-a`.
    fn negate(&self, a: &Self::Ciphertext) -> Result<Self::Ciphertext>;

    /// Slot-wise `a * a`.
    fn square(&self, a: &Self::Ciphertext) -> Result<Self::Ciphertext> {
        self.multiply(a, a)
    }

    /// Cyclically rotates the slots by `k` positions: slot `i` of the result
    /// holds slot `i - k` of `a`. A negative `k` shifts the slots to the left.
    fn rotate(&self, a: &Self::Ciphertext, k: isize) -> Result<Self::Ciphertext>;

    /// Encrypts the vector with every slot equal to `value`.
    fn encrypt_constant(&self, value: u64) -> Result<Self::Ciphertext> {
        self.encode_encrypt(&vec![value; self.slot_count()])
    }
}

/// Number of positions a rotation by `k` shifts the slots to the left, in
/// `[0, slot_count)`.
pub(crate) fn left_shift(k: isize, slot_count: usize) -> usize {
    let n = slot_count as isize;
    ((n - k.rem_euclid(n)) % n) as usize
}
