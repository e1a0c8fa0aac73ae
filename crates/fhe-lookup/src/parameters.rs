//! Parameters of an encrypted lookup and their validation.

use crate::{ConfigurationError, Result, traits::SlotCipher};

/// Smallest plaintext modulus able to hold every 7-bit ASCII code.
pub const MIN_PLAINTEXT_MODULUS: u64 = 128;

/// Plaintext modulus used by default: the smallest prime larger than a byte
/// that enables batching for every degree up to 128.
pub const DEFAULT_PLAINTEXT_MODULUS: u64 = 257;

/// Number of slots used by default.
pub const DEFAULT_SLOT_COUNT: usize = 32;

/// The plaintext space seen by the lookup protocol: each slot holds an
/// integer modulo `plaintext_modulus`, and a ciphertext holds `slot_count`
/// slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupParameters {
    /// The plaintext modulus `p`.
    pub plaintext_modulus: u64,
    /// The number of slots of a ciphertext.
    pub slot_count: usize,
}

impl LookupParameters {
    /// Creates parameters without validating them.
    pub fn new(plaintext_modulus: u64, slot_count: usize) -> Self {
        Self {
            plaintext_modulus,
            slot_count,
        }
    }

    /// Reads the parameters a ciphertext capability was configured with.
    pub fn of<C: SlotCipher + ?Sized>(cipher: &C) -> Self {
        Self::new(cipher.plaintext_modulus(), cipher.slot_count())
    }

    /// Checks that the equality test and the slot reduction are sound for
    /// these parameters: the plaintext modulus must be a prime able to hold
    /// character codes, and the slot count must be a power of two.
    pub fn validate(&self) -> Result<()> {
        if self.plaintext_modulus < MIN_PLAINTEXT_MODULUS {
            return Err(ConfigurationError::PlaintextModulusTooSmall(
                self.plaintext_modulus,
                MIN_PLAINTEXT_MODULUS,
            )
            .into());
        }
        if !fhe_util::is_prime(self.plaintext_modulus) {
            return Err(ConfigurationError::PlaintextModulusNotPrime(self.plaintext_modulus).into());
        }
        if self.slot_count < 2 || !self.slot_count.is_power_of_two() {
            return Err(ConfigurationError::SlotCountNotPowerOfTwo(self.slot_count).into());
        }
        Ok(())
    }

    /// Number of rotate-and-multiply rounds needed to reduce all the slots.
    pub fn reduction_rounds(&self) -> usize {
        self.slot_count.next_power_of_two().trailing_zeros() as usize
    }
}

impl Default for LookupParameters {
    fn default() -> Self {
        Self::new(DEFAULT_PLAINTEXT_MODULUS, DEFAULT_SLOT_COUNT)
    }
}
