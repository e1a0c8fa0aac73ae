//! Oblivious matching of a query against a single record.

use crate::{
    Result,
    database::EncryptedRecord,
    ops::{EqualityMaskBuilder, reduce_all},
    traits::SlotCipher,
};

/// Compares an encrypted query against encrypted records, one at a time.
///
/// For a record `(key, value)` the matcher returns an encryption of `value`
/// if the whole key equals the query, and an encryption of the all-zero
/// vector otherwise. The selection is a multiplication by a 0/1 mask; nothing
/// about the comparison is ever decrypted.
pub struct RecordMatcher<'a, C: SlotCipher + ?Sized> {
    cipher: &'a C,
    equality: EqualityMaskBuilder<'a, C>,
}

impl<'a, C: SlotCipher + ?Sized> RecordMatcher<'a, C> {
    /// Creates a matcher over the ciphertexts of `cipher`.
    pub fn new(cipher: &'a C) -> Result<Self> {
        Ok(Self {
            cipher,
            equality: EqualityMaskBuilder::new(cipher)?,
        })
    }

    /// Returns the value of `record` masked by whether its key equals `query`.
    pub fn matches(
        &self,
        record: &EncryptedRecord<C::Ciphertext>,
        query: &C::Ciphertext,
    ) -> Result<C::Ciphertext> {
        let indicator = self.equality.build(&record.key, query)?;
        let all_match = reduce_all(self.cipher, &indicator)?;
        self.cipher.multiply(&all_match, &record.value)
    }
}
