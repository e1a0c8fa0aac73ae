//! The encrypted key/value database.

use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    Error, Field, Result,
    encoding::encode_str,
    lookup::{LookupResult, QueryOrchestrator},
    parameters::LookupParameters,
    traits::SlotCipher,
};

/// A plaintext key/value record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The key, compared against the queries.
    pub key: String,
    /// The value returned when the key matches a query.
    pub value: String,
}

impl Record {
    /// Creates a new record.
    pub fn new<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A record whose key and value are encrypted slot vectors.
#[derive(Debug, Clone)]
pub struct EncryptedRecord<T> {
    /// The encrypted key.
    pub key: T,
    /// The encrypted value.
    pub value: T,
}

/// A database of encrypted records, built once and then queried any number
/// of times, possibly concurrently.
pub struct EncryptedDatabase<C: SlotCipher> {
    cipher: Arc<C>,
    records: Vec<EncryptedRecord<C::Ciphertext>>,
}

impl<C: SlotCipher> EncryptedDatabase<C> {
    /// Encodes and encrypts `records` with `cipher`.
    ///
    /// Returns an error, and builds nothing, if the parameters of `cipher`
    /// are not suitable for a lookup, if there are no records, or if any key
    /// or value does not fit in the slots.
    ///
    /// The keys must be unique: a lookup of a key present several times
    /// returns the slot-wise sum of the corresponding values.
    pub fn build(cipher: Arc<C>, records: &[Record]) -> Result<Self> {
        let params = LookupParameters::of(&*cipher);
        params.validate()?;
        if records.is_empty() {
            return Err(Error::EmptyDatabase);
        }

        let encoded = records
            .iter()
            .map(|record| {
                Ok((
                    encode_str(
                        &record.key,
                        Field::Key,
                        params.slot_count,
                        params.plaintext_modulus,
                    )?,
                    encode_str(
                        &record.value,
                        Field::Value,
                        params.slot_count,
                        params.plaintext_modulus,
                    )?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let encrypted = encoded
            .par_iter()
            .map(|(key, value)| {
                Ok(EncryptedRecord {
                    key: cipher.encode_encrypt(key)?,
                    value: cipher.encode_encrypt(value)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        log::info!(
            "Encrypted a database of {} records in {} slots modulo {}",
            encrypted.len(),
            params.slot_count,
            params.plaintext_modulus
        );

        Ok(Self {
            cipher,
            records: encrypted,
        })
    }

    /// The ciphertext capability of the database.
    pub fn cipher(&self) -> &C {
        &self.cipher
    }

    /// The encrypted records, in their original order.
    pub fn records(&self) -> &[EncryptedRecord<C::Ciphertext>] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the database has no records; never true for a built database.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up the value of the key `query`.
    ///
    /// The query is compared with every key without decrypting anything but
    /// the final aggregate, which is the value of the matching record, or
    /// [`LookupResult::NotFound`] when no key matches. The keys are assumed
    /// unique; see [`EncryptedDatabase::build`].
    pub fn lookup(&self, query: &str) -> Result<LookupResult> {
        Ok(QueryOrchestrator::new(self).run(query)?.result)
    }
}
