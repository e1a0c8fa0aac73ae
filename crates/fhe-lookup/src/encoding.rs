//! Encoding of strings into slot vectors.
//!
//! A string is encoded as the vector of its bytes, followed by zeros up to
//! the slot count. The zero value is reserved for the padding, so that a
//! decoded vector ends at its first zero slot.

use crate::{Error, Field, Result};

/// Encodes `s` into its slot representation, checking that it fits in
/// `slot_count` slots and that every byte is a non-zero value smaller than
/// `plaintext_modulus`.
///
/// The vector is not padded: capabilities pad with zeros on encryption.
pub fn encode_str(
    s: &str,
    field: Field,
    slot_count: usize,
    plaintext_modulus: u64,
) -> Result<Vec<u64>> {
    let bytes = s.as_bytes();
    if bytes.len() > slot_count {
        return Err(Error::OversizedField(field, bytes.len(), slot_count));
    }
    bytes
        .iter()
        .map(|b| {
            if *b == 0 || u64::from(*b) >= plaintext_modulus {
                Err(Error::InvalidCharacter(field, *b))
            } else {
                Ok(u64::from(*b))
            }
        })
        .collect()
}

/// Decodes a slot vector into a string, stopping at the first zero slot.
///
/// Returns `None` when the leading slot is zero, i.e. when the vector encodes
/// no string at all. Slots that do not hold a byte decode as the replacement
/// character.
pub fn decode_slots(slots: &[u64]) -> Option<String> {
    let bytes = slots
        .iter()
        .take_while(|v| **v != 0)
        .map(|v| u8::try_from(*v).unwrap_or(0xff))
        .collect::<Vec<u8>>();
    if bytes.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }
}
