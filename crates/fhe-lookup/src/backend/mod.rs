//! Ciphertext capabilities implementing [`crate::traits::SlotCipher`].

mod bfv;
mod clear;

pub use bfv::{BfvSlotCipher, BfvSlotCipherBuilder, DEFAULT_MODULI_SIZES, required_moduli_bits};
pub use clear::{ClearSlotCipher, SlotVector};
