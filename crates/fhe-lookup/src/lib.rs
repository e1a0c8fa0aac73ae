#![crate_name = "fhe_lookup"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]
#![doc = include_str!("../README.md")]

mod database;
mod errors;
mod lookup;
mod matcher;
mod parameters;

pub mod aggregate;
pub mod backend;
pub mod encoding;
pub mod ops;
pub mod source;
pub mod traits;

pub use database::{EncryptedDatabase, EncryptedRecord, Record};
pub use errors::{ConfigurationError, Error, Field, Result};
pub use lookup::{
    Cancellation, LookupReport, LookupResult, NOT_FOUND_MESSAGE, QueryOrchestrator, Stage,
    StageTimings,
};
pub use matcher::RecordMatcher;
pub use parameters::{
    DEFAULT_PLAINTEXT_MODULUS, DEFAULT_SLOT_COUNT, LookupParameters, MIN_PLAINTEXT_MODULUS,
};
