//! The query orchestrator, driving a lookup through its stages.

use std::{
    fmt::{self, Display},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use rayon::prelude::*;

use crate::{
    Error, Field, Result,
    aggregate::sum,
    database::EncryptedDatabase,
    encoding::{decode_slots, encode_str},
    matcher::RecordMatcher,
    traits::SlotCipher,
};

/// Message displayed when no key matches the query.
pub const NOT_FOUND_MESSAGE: &str = "Key not in the database.";

/// The stages of a lookup, in the order in which they are run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Nothing has been done yet.
    Idle,
    /// The query is encoded and encrypted.
    Encoding,
    /// The query is matched against every record.
    Matching,
    /// The masked values are summed.
    Aggregating,
    /// The sum is decrypted.
    Decrypting,
    /// The decrypted slots are decoded into the result.
    Reporting,
    /// The lookup is complete.
    Done,
}

impl Stage {
    /// The stage following this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Stage::Idle => Some(Stage::Encoding),
            Stage::Encoding => Some(Stage::Matching),
            Stage::Matching => Some(Stage::Aggregating),
            Stage::Aggregating => Some(Stage::Decrypting),
            Stage::Decrypting => Some(Stage::Reporting),
            Stage::Reporting => Some(Stage::Done),
            Stage::Done => None,
        }
    }
}

/// The outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    /// The value of the key equal to the query.
    Found(String),
    /// No key is equal to the query.
    NotFound,
}

impl LookupResult {
    /// The value found, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            LookupResult::Found(value) => Some(value),
            LookupResult::NotFound => None,
        }
    }

    /// Whether a value was found.
    pub fn is_found(&self) -> bool {
        matches!(self, LookupResult::Found(_))
    }
}

impl Display for LookupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupResult::Found(value) => write!(f, "{value}"),
            LookupResult::NotFound => write!(f, "{NOT_FOUND_MESSAGE}"),
        }
    }
}

/// A flag to cancel a lookup from another thread.
///
/// Clones share the same flag. A lookup checks it before matching each
/// record and before aggregating, and stops with [`Error::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    /// Creates a flag that is not raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed)
    }

    /// Whether the flag is raised.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Wall-clock duration of each stage of a lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageTimings {
    /// Encoding and encryption of the query.
    pub encoding: Duration,
    /// Matching of the query against all the records.
    pub matching: Duration,
    /// Sum of the masked values.
    pub aggregating: Duration,
    /// Decryption of the sum.
    pub decrypting: Duration,
    /// Decoding of the result.
    pub reporting: Duration,
}

impl StageTimings {
    /// The durations of the stages that do some work, in order.
    pub fn stages(&self) -> [(Stage, Duration); 5] {
        [
            (Stage::Encoding, self.encoding),
            (Stage::Matching, self.matching),
            (Stage::Aggregating, self.aggregating),
            (Stage::Decrypting, self.decrypting),
            (Stage::Reporting, self.reporting),
        ]
    }

    /// Total duration of the lookup.
    pub fn total(&self) -> Duration {
        self.stages().iter().map(|(_, d)| *d).sum()
    }

    fn record(&mut self, stage: Stage, duration: Duration) {
        match stage {
            Stage::Encoding => self.encoding = duration,
            Stage::Matching => self.matching = duration,
            Stage::Aggregating => self.aggregating = duration,
            Stage::Decrypting => self.decrypting = duration,
            Stage::Reporting => self.reporting = duration,
            Stage::Idle | Stage::Done => {}
        }
    }
}

/// The result of a lookup together with the time spent in each stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupReport {
    /// The outcome of the lookup.
    pub result: LookupResult,
    /// Duration of the stages.
    pub timings: StageTimings,
}

/// Runs one lookup against an encrypted database.
///
/// The stages run strictly in the order of [`Stage`], each on the output of
/// the previous one. An error at any stage aborts the lookup; there is no
/// partial result. The orchestrator is consumed by [`QueryOrchestrator::run`].
pub struct QueryOrchestrator<'a, C: SlotCipher> {
    database: &'a EncryptedDatabase<C>,
    cancellation: Cancellation,
    stage: Stage,
    timings: StageTimings,
}

impl<'a, C: SlotCipher> QueryOrchestrator<'a, C> {
    /// Creates an orchestrator for a lookup in `database`.
    pub fn new(database: &'a EncryptedDatabase<C>) -> Self {
        Self {
            database,
            cancellation: Cancellation::new(),
            stage: Stage::Idle,
            timings: StageTimings::default(),
        }
    }

    /// Sets the flag that cancels the lookup.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Runs `f` as the stage following the current one.
    fn step<T, F: FnOnce(&Self) -> Result<T>>(&mut self, f: F) -> Result<T> {
        let stage = self.stage.next().unwrap_or(Stage::Done);
        log::debug!("Lookup stage {stage:?}");
        self.stage = stage;
        let start = Instant::now();
        let output = f(self)?;
        self.timings.record(stage, start.elapsed());
        Ok(output)
    }

    /// Looks up the value of the key `query`.
    ///
    /// The keys of the database are assumed unique: when several keys equal
    /// the query, the result is the slot-wise sum of their values, which
    /// generally does not decode to any of them.
    pub fn run(mut self, query: &str) -> Result<LookupReport> {
        let database = self.database;
        let cipher = database.cipher();

        let query_ct = self.step(|_| {
            let values = encode_str(
                query,
                Field::Query,
                cipher.slot_count(),
                cipher.plaintext_modulus(),
            )?;
            cipher.encode_encrypt(&values)
        })?;

        let masks = self.step(|this| {
            let matcher = RecordMatcher::new(cipher)?;
            database
                .records()
                .par_iter()
                .enumerate()
                .map(|(i, record)| {
                    this.cancellation.check()?;
                    log::trace!("Matching record {i}");
                    matcher.matches(record, &query_ct)
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let aggregate = self.step(|this| {
            this.cancellation.check()?;
            sum(cipher, &masks)
        })?;
        drop(masks);

        let slots = self.step(|_| cipher.decrypt_decode(&aggregate))?;

        let result = self.step(|_| {
            Ok(match decode_slots(&slots) {
                Some(value) => LookupResult::Found(value),
                None => LookupResult::NotFound,
            })
        })?;

        log::debug!("Lookup stage {:?}", Stage::Done);
        log::info!(
            "Lookup of a {}-byte query in {} records: {} in {:?}",
            query.len(),
            database.len(),
            if result.is_found() { "found" } else { "not found" },
            self.timings.total()
        );

        Ok(LookupReport {
            result,
            timings: self.timings,
        })
    }
}
