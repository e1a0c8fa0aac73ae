use std::fmt::Display;

use thiserror::Error;

/// The Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// The string field an encoding error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The key of a database record.
    Key,
    /// The value of a database record.
    Value,
    /// The query string of a lookup.
    Query,
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Key => write!(f, "key"),
            Field::Value => write!(f, "value"),
            Field::Query => write!(f, "query"),
        }
    }
}

/// Enum encapsulating all the possible errors from this library.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Indicates that an error from the BFV capability was encountered.
    #[error("{0}")]
    FheError(fhe::Error),

    /// Indicates that an error from the underlying modular arithmetic was
    /// encountered.
    #[error("{0}")]
    MathError(fhe_math::Error),

    /// Indicates that another ciphertext capability reported an error.
    #[error("Capability error: {0}")]
    CapabilityError(String),

    /// Indicates a configuration error.
    #[error("{0}")]
    ConfigurationError(ConfigurationError),

    /// Indicates that a string does not fit in the slots of a ciphertext.
    #[error("Oversized {0}: {1} characters exceed the slot count {2}")]
    OversizedField(Field, usize, usize),

    /// Indicates that a string contains a byte that cannot be encoded.
    #[error("Invalid byte {1:#04x} in {0}")]
    InvalidCharacter(Field, u8),

    /// Indicates that there was nothing to aggregate.
    #[error("The database is empty")]
    EmptyDatabase,

    /// Indicates that an exponentiation was requested with a zero exponent.
    #[error("Invalid exponent: {0} is not at least 1")]
    InvalidExponent(u64),

    /// Indicates that a lookup was cancelled before completion.
    #[error("The lookup was cancelled")]
    Cancelled,

    /// Indicates that the database source could not be read.
    #[error("Source error: {0}")]
    SourceError(String),

    /// Indicates that a row of the database source has fewer than two fields.
    #[error("Malformed record on line {0}: expected a key and a value")]
    MalformedRecord(u64),
}

impl From<fhe::Error> for Error {
    fn from(e: fhe::Error) -> Self {
        Error::FheError(e)
    }
}

impl From<fhe_math::Error> for Error {
    fn from(e: fhe_math::Error) -> Self {
        Error::MathError(e)
    }
}

impl From<ConfigurationError> for Error {
    fn from(e: ConfigurationError) -> Self {
        Error::ConfigurationError(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::SourceError(e.to_string())
    }
}

/// Separate enum to indicate configuration-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Indicates that the plaintext modulus cannot hold the character codes.
    #[error("Plaintext modulus {0} is too small: it must be at least {1}")]
    PlaintextModulusTooSmall(u64, u64),

    /// Indicates that the plaintext modulus is not prime.
    #[error("Plaintext modulus {0} is not prime")]
    PlaintextModulusNotPrime(u64),

    /// Indicates that the slot count is not a power of two.
    #[error("Slot count {0} is not a power of two larger than 1")]
    SlotCountNotPowerOfTwo(usize),

    /// Indicates that the plaintext modulus does not allow SIMD batching.
    #[error("Plaintext modulus {0} is not congruent to 1 modulo {1}")]
    BatchingNotSupported(u64, usize),

    /// Indicates that the ciphertext moduli leave too little noise budget for
    /// the multiplicative depth of a lookup.
    #[error("Ciphertext moduli of {1} bits are too small: a lookup needs {0} bits")]
    InsufficientModuli(usize, usize),
}

#[cfg(test)]
mod tests {
    use crate::{ConfigurationError, Error, Field};

    #[test]
    fn error_strings() {
        assert_eq!(
            Error::MathError(fhe_math::Error::InvalidModulus(1)).to_string(),
            fhe_math::Error::InvalidModulus(1).to_string()
        );
        assert_eq!(
            Error::CapabilityError("out of memory".to_string()).to_string(),
            "Capability error: out of memory"
        );
        assert_eq!(
            Error::OversizedField(Field::Query, 40, 32).to_string(),
            "Oversized query: 40 characters exceed the slot count 32"
        );
        assert_eq!(
            Error::InvalidCharacter(Field::Key, 0).to_string(),
            "Invalid byte 0x00 in key"
        );
        assert_eq!(Error::EmptyDatabase.to_string(), "The database is empty");
        assert_eq!(
            Error::InvalidExponent(0).to_string(),
            "Invalid exponent: 0 is not at least 1"
        );
        assert_eq!(Error::Cancelled.to_string(), "The lookup was cancelled");
        assert_eq!(
            Error::MalformedRecord(3).to_string(),
            "Malformed record on line 3: expected a key and a value"
        );
        assert_eq!(
            Error::ConfigurationError(ConfigurationError::PlaintextModulusNotPrime(256))
                .to_string(),
            ConfigurationError::PlaintextModulusNotPrime(256).to_string()
        );
    }

    #[test]
    fn configuration_error_strings() {
        assert_eq!(
            ConfigurationError::PlaintextModulusTooSmall(127, 128).to_string(),
            "Plaintext modulus 127 is too small: it must be at least 128"
        );
        assert_eq!(
            ConfigurationError::PlaintextModulusNotPrime(256).to_string(),
            "Plaintext modulus 256 is not prime"
        );
        assert_eq!(
            ConfigurationError::SlotCountNotPowerOfTwo(24).to_string(),
            "Slot count 24 is not a power of two larger than 1"
        );
        assert_eq!(
            ConfigurationError::BatchingNotSupported(131, 128).to_string(),
            "Plaintext modulus 131 is not congruent to 1 modulo 128"
        );
        assert_eq!(
            ConfigurationError::InsufficientModuli(777, 496).to_string(),
            "Ciphertext moduli of 496 bits are too small: a lookup needs 777 bits"
        );
    }
}
