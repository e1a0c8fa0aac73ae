//! A slot-vector capability on the BFV scheme of the `fhe` crate.

use std::sync::Arc;

use fhe::bfv::{
    BfvParameters, BfvParametersBuilder, Ciphertext, Encoding, EvaluationKey,
    EvaluationKeyBuilder, Plaintext, PublicKey, RelinearizationKey, SecretKey,
};
use fhe_math::zq::Modulus;
use fhe_traits::{FheDecoder, FheDecrypter, FheEncoder, FheEncrypter};
use rand::{CryptoRng, RngCore};

use crate::{
    ConfigurationError, Result,
    ops::lookup_depth,
    parameters::{DEFAULT_PLAINTEXT_MODULUS, DEFAULT_SLOT_COUNT, LookupParameters},
    traits::{SlotCipher, left_shift},
};

/// Size of the ciphertext moduli chosen by the builder.
const MODULUS_SIZE: usize = 62;

/// Sizes of the ciphertext moduli used by default. They leave enough noise
/// budget for the multiplicative depth of a lookup with the default
/// plaintext modulus and slot count; the builder adds moduli when the
/// parameters need more.
pub const DEFAULT_MODULI_SIZES: [usize; 8] = [MODULUS_SIZE; 8];

/// Estimated number of bits of ciphertext modulus for a lookup with `params`
/// at BFV degree `degree` to decrypt correctly.
///
/// The estimate reserves the plaintext scaling, one modulus of key-switching
/// noise, and `log2(p) + log2(degree) + 8` bits for each multiplicative
/// level of [`lookup_depth`].
pub fn required_moduli_bits(params: &LookupParameters, degree: usize) -> usize {
    let plaintext_bits = (u64::BITS - params.plaintext_modulus.leading_zeros()) as usize;
    let degree_bits = degree.max(2).ilog2() as usize;
    let per_level = plaintext_bits + degree_bits + 8;
    plaintext_bits + (MODULUS_SIZE + degree_bits + 10) + lookup_depth(params) * per_level
}

/// A [`SlotCipher`] on BFV ciphertexts.
///
/// A BFV plaintext of degree `d` in SIMD encoding is a `2 x d/2` matrix whose
/// columns can be rotated. The slot vector has `d/2` slots and is stored in
/// both rows, so that rotating the columns by `i` shifts the slot vector
/// cyclically to the left by `i`.
///
/// The capability holds all the keys of a single data holder: ciphertexts are
/// encrypted under the public key and decrypted with the secret key.
#[derive(Debug)]
pub struct BfvSlotCipher {
    par: Arc<BfvParameters>,
    plaintext: Modulus,
    sk: SecretKey,
    pk: PublicKey,
    rk: RelinearizationKey,
    ek: EvaluationKey,
    rotations: Vec<usize>,
}

impl BfvSlotCipher {
    /// The BFV parameters.
    pub fn parameters(&self) -> &Arc<BfvParameters> {
        &self.par
    }

    /// The sizes of the ciphertext moduli.
    pub fn moduli_sizes(&self) -> &[usize] {
        self.par.moduli_sizes()
    }

    /// The left rotations supported by [`SlotCipher::rotate`].
    pub fn supported_rotations(&self) -> &[usize] {
        &self.rotations
    }

    fn row_size(&self) -> usize {
        self.par.degree() >> 1
    }
}

impl SlotCipher for BfvSlotCipher {
    type Ciphertext = Ciphertext;

    fn slot_count(&self) -> usize {
        self.row_size()
    }

    fn plaintext_modulus(&self) -> u64 {
        *self.plaintext
    }

    fn encode_encrypt(&self, values: &[u64]) -> Result<Ciphertext> {
        let row_size = self.row_size();
        let mut row = vec![0u64; row_size];
        row.iter_mut()
            .zip(values.iter())
            .for_each(|(s, v)| *s = *v);
        self.plaintext.reduce_vec(&mut row);

        let mut slots = Vec::with_capacity(self.par.degree());
        slots.extend_from_slice(&row);
        slots.extend_from_slice(&row);

        let pt = Plaintext::try_encode(slots.as_slice(), Encoding::simd(), &self.par)?;
        Ok(self.pk.try_encrypt(&pt, &mut rand::rng())?)
    }

    fn decrypt_decode(&self, ct: &Ciphertext) -> Result<Vec<u64>> {
        let pt = self.sk.try_decrypt(ct)?;
        let mut slots = Vec::<u64>::try_decode(&pt, Encoding::simd())?;
        slots.truncate(self.row_size());
        Ok(slots)
    }

    fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        Ok(a + b)
    }

    fn sub(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        Ok(a - b)
    }

    fn multiply(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        let mut c = a * b;
        self.rk.relinearizes(&mut c)?;
        Ok(c)
    }

    fn negate(&self, a: &Ciphertext) -> Result<Ciphertext> {
        Ok(-a)
    }

    fn rotate(&self, a: &Ciphertext, k: isize) -> Result<Ciphertext> {
        match left_shift(k, self.row_size()) {
            0 => Ok(a.clone()),
            i => Ok(self.ek.rotates_columns_by(a, i)?),
        }
    }
}

/// Builder for a [`BfvSlotCipher`].
#[derive(Debug, Clone)]
pub struct BfvSlotCipherBuilder {
    degree: usize,
    plaintext_modulus: u64,
    moduli_sizes: Option<Vec<usize>>,
    extra_rotations: Vec<usize>,
}

impl Default for BfvSlotCipherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BfvSlotCipherBuilder {
    /// Creates a new builder with the default parameters: plaintext modulus
    /// 257, 32 slots, and at least eight 62-bit ciphertext moduli. These
    /// parameters do not provide any meaningful security level.
    #[must_use]
    pub fn new() -> Self {
        Self {
            degree: 2 * DEFAULT_SLOT_COUNT,
            plaintext_modulus: DEFAULT_PLAINTEXT_MODULUS,
            moduli_sizes: None,
            extra_rotations: vec![],
        }
    }

    /// Sets the number of slots; the BFV degree is twice this number.
    pub fn set_slot_count(&mut self, slot_count: usize) -> &mut Self {
        self.degree = 2 * slot_count;
        self
    }

    /// Sets the BFV polynomial degree; the slot count is half this number.
    pub fn set_degree(&mut self, degree: usize) -> &mut Self {
        self.degree = degree;
        self
    }

    /// Sets the plaintext modulus.
    pub fn set_plaintext_modulus(&mut self, plaintext_modulus: u64) -> &mut Self {
        self.plaintext_modulus = plaintext_modulus;
        self
    }

    /// Sets the sizes of the ciphertext moduli. Unless set, the builder uses
    /// [`DEFAULT_MODULI_SIZES`], with as many additional 62-bit moduli as
    /// [`required_moduli_bits`] asks for.
    pub fn set_moduli_sizes(&mut self, sizes: &[usize]) -> &mut Self {
        self.moduli_sizes = Some(sizes.to_vec());
        self
    }

    /// Enables a left rotation by `i` slots in addition to the rotations by
    /// powers of two, which are always enabled.
    pub fn add_rotation(&mut self, i: usize) -> &mut Self {
        self.extra_rotations.push(i);
        self
    }

    /// Validates the parameters, generates the keys and builds the
    /// capability.
    ///
    /// Returns an error if the ciphertext moduli set with
    /// [`BfvSlotCipherBuilder::set_moduli_sizes`] are smaller than
    /// [`required_moduli_bits`].
    pub fn build<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<BfvSlotCipher> {
        let slot_count = self.degree / 2;
        let params = LookupParameters::new(self.plaintext_modulus, slot_count);
        params.validate()?;
        if self.plaintext_modulus % (2 * self.degree as u64) != 1 {
            return Err(ConfigurationError::BatchingNotSupported(
                self.plaintext_modulus,
                2 * self.degree,
            )
            .into());
        }

        let required = required_moduli_bits(&params, self.degree);
        let moduli_sizes = match &self.moduli_sizes {
            Some(sizes) => {
                let available = sizes.iter().sum::<usize>();
                if available < required {
                    return Err(ConfigurationError::InsufficientModuli(required, available).into());
                }
                sizes.clone()
            }
            None => {
                let count = required
                    .div_ceil(MODULUS_SIZE)
                    .max(DEFAULT_MODULI_SIZES.len());
                vec![MODULUS_SIZE; count]
            }
        };

        let par = BfvParametersBuilder::new()
            .set_degree(self.degree)
            .set_plaintext_modulus(self.plaintext_modulus)
            .set_moduli_sizes(&moduli_sizes)
            .build_arc()?;
        let plaintext = Modulus::new(self.plaintext_modulus)?;

        let mut rotations = std::iter::successors(Some(1usize), |r| Some(r << 1))
            .take_while(|r| *r < slot_count)
            .chain(self.extra_rotations.iter().map(|i| i % slot_count))
            .filter(|i| *i != 0)
            .collect::<Vec<_>>();
        rotations.sort_unstable();
        rotations.dedup();

        let sk = SecretKey::random(&par, rng);
        let pk = PublicKey::new(&sk, rng);
        let rk = RelinearizationKey::new(&sk, rng)?;
        let mut ek_builder = EvaluationKeyBuilder::new(&sk)?;
        for i in &rotations {
            ek_builder.enable_column_rotation(*i)?;
        }
        let ek = ek_builder.build(rng)?;

        log::debug!(
            "BFV capability: degree {}, plaintext modulus {}, moduli sizes {:?}, rotations {:?}",
            self.degree,
            self.plaintext_modulus,
            moduli_sizes,
            rotations
        );

        Ok(BfvSlotCipher {
            par,
            plaintext,
            sk,
            pk,
            rk,
            ek,
            rotations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BfvSlotCipher, BfvSlotCipherBuilder, DEFAULT_MODULI_SIZES, required_moduli_bits,
    };
    use crate::{ConfigurationError, Error, LookupParameters, traits::SlotCipher};
    use rand::rng;
    use std::error::Error as StdError;

    fn cipher(slot_count: usize) -> Result<BfvSlotCipher, Box<dyn StdError>> {
        Ok(BfvSlotCipherBuilder::new()
            .set_slot_count(slot_count)
            .build(&mut rng())?)
    }

    #[test]
    fn builder() -> Result<(), Box<dyn StdError>> {
        let mut rng = rng();

        let c = BfvSlotCipherBuilder::new().build(&mut rng)?;
        assert_eq!(c.slot_count(), 32);
        assert_eq!(c.plaintext_modulus(), 257);
        assert_eq!(c.parameters().degree(), 64);
        assert_eq!(c.supported_rotations(), &[1, 2, 4, 8, 16]);
        assert_eq!(c.moduli_sizes(), &DEFAULT_MODULI_SIZES);

        let c = BfvSlotCipherBuilder::new()
            .set_degree(32)
            .add_rotation(3)
            .add_rotation(19)
            .build(&mut rng)?;
        assert_eq!(c.slot_count(), 16);
        assert_eq!(c.supported_rotations(), &[1, 2, 3, 4, 8]);

        assert_eq!(
            BfvSlotCipherBuilder::new()
                .set_plaintext_modulus(131)
                .build(&mut rng)
                .unwrap_err(),
            Error::ConfigurationError(ConfigurationError::BatchingNotSupported(131, 128))
        );
        assert_eq!(
            BfvSlotCipherBuilder::new()
                .set_plaintext_modulus(97)
                .build(&mut rng)
                .unwrap_err(),
            Error::ConfigurationError(ConfigurationError::PlaintextModulusTooSmall(97, 128))
        );
        assert_eq!(
            BfvSlotCipherBuilder::new()
                .set_slot_count(24)
                .build(&mut rng)
                .unwrap_err(),
            Error::ConfigurationError(ConfigurationError::SlotCountNotPowerOfTwo(24))
        );
        Ok(())
    }

    #[test]
    fn encrypt_decrypt() -> Result<(), Box<dyn StdError>> {
        let c = cipher(16)?;
        let ct = c.encode_encrypt(&[78, 111, 114, 119, 97, 121])?;
        assert_eq!(
            c.decrypt_decode(&ct)?,
            [78, 111, 114, 119, 97, 121, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );

        let values = (1..=20).collect::<Vec<u64>>();
        let ct = c.encode_encrypt(&values)?;
        assert_eq!(c.decrypt_decode(&ct)?, (1..=16).collect::<Vec<u64>>());
        Ok(())
    }

    #[test]
    fn arithmetic() -> Result<(), Box<dyn StdError>> {
        let c = cipher(8)?;
        let a = c.encode_encrypt(&[1, 200, 0, 256, 5, 6, 7, 8])?;
        let b = c.encode_encrypt(&[3, 100, 0, 2, 5, 6, 7, 8])?;

        assert_eq!(
            c.decrypt_decode(&c.add(&a, &b)?)?,
            [4, 43, 0, 1, 10, 12, 14, 16]
        );
        assert_eq!(
            c.decrypt_decode(&c.sub(&a, &b)?)?,
            [255, 100, 0, 254, 0, 0, 0, 0]
        );
        assert_eq!(
            c.decrypt_decode(&c.multiply(&a, &b)?)?,
            [3, 211, 0, 255, 25, 36, 49, 64]
        );
        assert_eq!(
            c.decrypt_decode(&c.negate(&a)?)?,
            [256, 57, 0, 1, 252, 251, 250, 249]
        );
        assert_eq!(
            c.decrypt_decode(&c.square(&a)?)?,
            [1, 165, 0, 1, 25, 36, 49, 64]
        );
        Ok(())
    }

    #[test]
    fn rotation() -> Result<(), Box<dyn StdError>> {
        let c = cipher(8)?;
        let a = c.encode_encrypt(&[1, 2, 3, 4, 5, 6, 7, 8])?;
        assert_eq!(
            c.decrypt_decode(&c.rotate(&a, -1)?)?,
            [2, 3, 4, 5, 6, 7, 8, 1]
        );
        assert_eq!(
            c.decrypt_decode(&c.rotate(&a, -4)?)?,
            [5, 6, 7, 8, 1, 2, 3, 4]
        );
        assert_eq!(
            c.decrypt_decode(&c.rotate(&a, -8)?)?,
            [1, 2, 3, 4, 5, 6, 7, 8]
        );
        assert!(matches!(c.rotate(&a, -3), Err(Error::FheError(_))));
        Ok(())
    }

    #[test]
    fn moduli_follow_the_depth() -> Result<(), Box<dyn StdError>> {
        let bits = DEFAULT_MODULI_SIZES.iter().sum::<usize>();
        for (p, slot_count) in [(257, 8), (257, 16), (257, 32), (257, 64), (257, 128)] {
            let params = LookupParameters::new(p, slot_count);
            assert!(required_moduli_bits(&params, 2 * slot_count) <= bits);
        }
        let large = LookupParameters::new(65537, 32);
        let required = required_moduli_bits(&large, 64);
        assert!(required > bits);

        // Explicit moduli too small for the depth are rejected.
        assert_eq!(
            BfvSlotCipherBuilder::new()
                .set_plaintext_modulus(65537)
                .set_moduli_sizes(&DEFAULT_MODULI_SIZES)
                .build(&mut rng())
                .unwrap_err(),
            Error::ConfigurationError(ConfigurationError::InsufficientModuli(required, bits))
        );

        // Otherwise the builder adds moduli.
        let c = BfvSlotCipherBuilder::new()
            .set_plaintext_modulus(65537)
            .build(&mut rng())?;
        assert_eq!(c.moduli_sizes().len(), required.div_ceil(62));
        assert!(c.moduli_sizes().iter().sum::<usize>() >= required);
        Ok(())
    }
}
