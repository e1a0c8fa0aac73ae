//! Homomorphic exponentiation by square-and-multiply.

use crate::{Error, Result, traits::SlotCipher};

/// Computes `ct^degree` slot-wise with `O(log(degree))` homomorphic
/// multiplications.
///
/// The running base is squared at every bit of `degree`; the bases at the
/// odd steps are folded into an accumulator which is multiplied into the
/// result once at the end. Returns an error if `degree` is zero.
pub fn pow<C: SlotCipher + ?Sized>(
    cipher: &C,
    ct: &C::Ciphertext,
    degree: u64,
) -> Result<C::Ciphertext> {
    if degree == 0 {
        return Err(Error::InvalidExponent(degree));
    }

    let mut degree = degree;
    let mut x = ct.clone();
    let mut y: Option<C::Ciphertext> = None;

    while degree > 1 {
        if degree % 2 == 0 {
            x = cipher.square(&x)?;
            degree /= 2;
        } else {
            y = Some(match y {
                None => x.clone(),
                Some(y) => cipher.multiply(&y, &x)?,
            });
            x = cipher.square(&x)?;
            degree = (degree - 1) / 2;
        }
    }

    match y {
        Some(y) => cipher.multiply(&x, &y),
        None => Ok(x),
    }
}

/// Number of homomorphic multiplications (squarings included) performed by
/// [`pow`] for this `degree`.
pub fn multiplication_count(degree: u64) -> usize {
    if degree == 0 {
        return 0;
    }
    let squarings = degree.ilog2() as usize;
    let folds = degree.count_ones() as usize - 1;
    squarings + folds
}
