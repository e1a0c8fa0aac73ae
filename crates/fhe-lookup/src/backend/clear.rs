//! A slot-vector capability computing in the clear.

use fhe_math::zq::Modulus;

use crate::{Error, Result, traits::SlotCipher, traits::left_shift};

/// A slot vector held in the clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotVector(Vec<u64>);

impl SlotVector {
    /// The slots of the vector.
    pub fn slots(&self) -> &[u64] {
        &self.0
    }
}

/// A [`SlotCipher`] that performs the slot-wise modular arithmetic on
/// unencrypted vectors.
///
/// It provides no privacy whatsoever. It computes exactly what an encrypted
/// capability computes, without noise, and is meant to test and debug the
/// protocol on plaintext-equivalent values.
#[derive(Debug, Clone, PartialEq)]
pub struct ClearSlotCipher {
    modulus: Modulus,
    slot_count: usize,
}

impl ClearSlotCipher {
    /// Creates a capability with `slot_count` slots modulo `plaintext_modulus`.
    ///
    /// Only the arithmetic requirements are checked here; whether the
    /// parameters suit a lookup is checked by
    /// [`crate::LookupParameters::validate`].
    pub fn new(plaintext_modulus: u64, slot_count: usize) -> Result<Self> {
        if slot_count == 0 {
            return Err(Error::CapabilityError(
                "The slot count must be positive".to_string(),
            ));
        }
        Ok(Self {
            modulus: Modulus::new(plaintext_modulus)?,
            slot_count,
        })
    }

    fn check(&self, a: &SlotVector) -> Result<()> {
        if a.0.len() != self.slot_count {
            Err(Error::CapabilityError(format!(
                "Slot vector of length {} does not match the slot count {}",
                a.0.len(),
                self.slot_count
            )))
        } else {
            Ok(())
        }
    }

    fn binary<F>(&self, a: &SlotVector, b: &SlotVector, op: F) -> Result<SlotVector>
    where
        F: Fn(&Modulus, &mut [u64], &[u64]),
    {
        self.check(a)?;
        self.check(b)?;
        let mut out = a.0.clone();
        op(&self.modulus, &mut out, &b.0);
        Ok(SlotVector(out))
    }
}

impl SlotCipher for ClearSlotCipher {
    type Ciphertext = SlotVector;

    fn slot_count(&self) -> usize {
        self.slot_count
    }

    fn plaintext_modulus(&self) -> u64 {
        *self.modulus
    }

    fn encode_encrypt(&self, values: &[u64]) -> Result<SlotVector> {
        let mut slots = vec![0u64; self.slot_count];
        slots
            .iter_mut()
            .zip(values.iter())
            .for_each(|(s, v)| *s = *v);
        self.modulus.reduce_vec(&mut slots);
        Ok(SlotVector(slots))
    }

    fn decrypt_decode(&self, ct: &SlotVector) -> Result<Vec<u64>> {
        self.check(ct)?;
        Ok(ct.0.clone())
    }

    fn add(&self, a: &SlotVector, b: &SlotVector) -> Result<SlotVector> {
        self.binary(a, b, |m, x, y| m.add_vec(x, y))
    }

    fn sub(&self, a: &SlotVector, b: &SlotVector) -> Result<SlotVector> {
        self.binary(a, b, |m, x, y| m.sub_vec(x, y))
    }

    fn multiply(&self, a: &SlotVector, b: &SlotVector) -> Result<SlotVector> {
        self.binary(a, b, |m, x, y| m.mul_vec(x, y))
    }

    fn negate(&self, a: &SlotVector) -> Result<SlotVector> {
        self.check(a)?;
        let mut out = a.0.clone();
        self.modulus.neg_vec(&mut out);
        Ok(SlotVector(out))
    }

    fn rotate(&self, a: &SlotVector, k: isize) -> Result<SlotVector> {
        self.check(a)?;
        let mut out = a.0.clone();
        out.rotate_left(left_shift(k, self.slot_count));
        Ok(SlotVector(out))
    }
}

#[cfg(test)]
mod tests {
    use super::ClearSlotCipher;
    use crate::{Error, traits::SlotCipher};
    use std::error::Error as StdError;

    #[test]
    fn constructor() {
        assert!(ClearSlotCipher::new(257, 8).is_ok());
        assert!(matches!(
            ClearSlotCipher::new(257, 0),
            Err(Error::CapabilityError(_))
        ));
        assert_eq!(
            ClearSlotCipher::new(1, 8),
            Err(Error::MathError(fhe_math::Error::InvalidModulus(1)))
        );
    }

    #[test]
    fn encode_pads_truncates_and_reduces() -> Result<(), Box<dyn StdError>> {
        let cipher = ClearSlotCipher::new(257, 4)?;
        let ct = cipher.encode_encrypt(&[1, 2])?;
        assert_eq!(cipher.decrypt_decode(&ct)?, vec![1, 2, 0, 0]);

        let ct = cipher.encode_encrypt(&[1, 2, 3, 4, 5, 6])?;
        assert_eq!(cipher.decrypt_decode(&ct)?, vec![1, 2, 3, 4]);

        let ct = cipher.encode_encrypt(&[257, 258, 514])?;
        assert_eq!(cipher.decrypt_decode(&ct)?, vec![0, 1, 0, 0]);
        Ok(())
    }

    #[test]
    fn arithmetic() -> Result<(), Box<dyn StdError>> {
        let cipher = ClearSlotCipher::new(257, 4)?;
        let a = cipher.encode_encrypt(&[1, 200, 0, 256])?;
        let b = cipher.encode_encrypt(&[3, 100, 0, 2])?;

        assert_eq!(
            cipher.decrypt_decode(&cipher.add(&a, &b)?)?,
            vec![4, 43, 0, 1]
        );
        assert_eq!(
            cipher.decrypt_decode(&cipher.sub(&a, &b)?)?,
            vec![255, 100, 0, 254]
        );
        assert_eq!(
            cipher.decrypt_decode(&cipher.multiply(&a, &b)?)?,
            vec![3, 211, 0, 255]
        );
        assert_eq!(
            cipher.decrypt_decode(&cipher.negate(&a)?)?,
            vec![256, 57, 0, 1]
        );
        assert_eq!(
            cipher.decrypt_decode(&cipher.square(&a)?)?,
            vec![1, 165, 0, 1]
        );
        assert_eq!(
            cipher.decrypt_decode(&cipher.encrypt_constant(1)?)?,
            vec![1, 1, 1, 1]
        );
        Ok(())
    }

    #[test]
    fn rotation() -> Result<(), Box<dyn StdError>> {
        let cipher = ClearSlotCipher::new(257, 4)?;
        let a = cipher.encode_encrypt(&[1, 2, 3, 4])?;
        assert_eq!(
            cipher.decrypt_decode(&cipher.rotate(&a, -1)?)?,
            vec![2, 3, 4, 1]
        );
        assert_eq!(
            cipher.decrypt_decode(&cipher.rotate(&a, 1)?)?,
            vec![4, 1, 2, 3]
        );
        assert_eq!(
            cipher.decrypt_decode(&cipher.rotate(&a, -6)?)?,
            vec![3, 4, 1, 2]
        );
        assert_eq!(cipher.rotate(&a, 0)?, a);
        assert_eq!(cipher.rotate(&a, isize::MIN)?, a);
        assert_eq!(
            cipher.decrypt_decode(&cipher.rotate(&a, isize::MAX)?)?,
            vec![2, 3, 4, 1]
        );
        Ok(())
    }

    #[test]
    fn mismatched_lengths() -> Result<(), Box<dyn StdError>> {
        let small = ClearSlotCipher::new(257, 4)?;
        let large = ClearSlotCipher::new(257, 8)?;
        let a = small.encode_encrypt(&[1])?;
        let b = large.encode_encrypt(&[1])?;
        assert!(matches!(small.add(&a, &b), Err(Error::CapabilityError(_))));
        assert!(matches!(large.rotate(&a, 1), Err(Error::CapabilityError(_))));
        Ok(())
    }
}
