//! Overrepresentation analysis (ORA) of named item sets
//!
//! `overrep` tests whether a group of "hit" items, e.g. well predicted
//! compounds or a list of regulated genes, is enriched within named sets
//! (gene targets, pathways, ...) compared to a background population. Every set
//! is tested with the hypergeometric distribution and the p-values are
//! corrected for multiple testing using the Benjamini–Hochberg procedure.
//!
//! # Examples
//!
//! ```
//! use overrep::{analyze, Items, OraConfig, SetCollection};
//!
//! let sets: SetCollection = [
//!     ("HK1", "Glycolysis"),
//!     ("HK2", "Glycolysis"),
//!     ("GPI", "Glycolysis"),
//!     ("PFKL", "Glycolysis"),
//!     ("ALDOA", "Glycolysis"),
//!     ("CS", "TCA_Cycle"),
//!     ("ACO1", "TCA_Cycle"),
//!     ("IDH1", "TCA_Cycle"),
//!     ("OGDH", "TCA_Cycle"),
//!     ("SDHA", "TCA_Cycle"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let hits: Items = ["HK2", "PFKL", "ALDOA", "IDH1"]
//!     .into_iter()
//!     .map(String::from)
//!     .collect();
//!
//! let results = analyze(&sets, &hits, None, &OraConfig::default()).unwrap();
//!
//! assert_eq!(results[0].set_name(), "Glycolysis");
//! assert_eq!(results[0].overlap_size(), 3);
//! assert_eq!(results[1].set_name(), "TCA_Cycle");
//! ```
use thiserror::Error;

pub mod enrichment;
pub mod parser;
pub mod pathway;
pub mod report;
pub mod sets;
pub mod stats;
pub mod workflow;

pub use enrichment::{analyze, significant, HitCounting, OraConfig, SetEnrichment};
pub use sets::{ItemSet, Items, SetCollection};

/// Number of decimal digits that p-values and FDR values are rounded to
pub const DEFAULT_PRECISION: i32 = 5;

/// FDR threshold below which a set is reported as significant
pub const DEFAULT_FDR_THRESHOLD: f64 = 0.05;

/// Smallest set that is tested by default
pub const DEFAULT_MIN_SET_SIZE: usize = 2;

/// Main error type of the `overrep` crate
#[derive(Error, Debug)]
pub enum OraError {
    /// Input tables are malformed, required columns are missing or
    /// parameters are out of range
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Either the universe or the hits are empty, the test is undefined
    #[error("universe and hits must contain at least one item")]
    EmptyUniverseOrHits,
    /// The pathway provider did not return usable data
    #[error("pathway lookup failed: {0}")]
    ExternalLookupFailure(String),
    #[error("unable to read or write file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to read or write CSV data: {0}")]
    Csv(#[from] csv::Error),
}

impl OraError {
    /// The process exit code that the command line tools use for this error
    ///
    /// Only invalid (or unreadable) input is treated as a failure,
    /// all other errors are reported but do not fail the run.
    pub fn exit_code(&self) -> i32 {
        match self {
            OraError::InvalidInput(_) | OraError::Io(_) | OraError::Csv(_) => 1,
            OraError::EmptyUniverseOrHits | OraError::ExternalLookupFailure(_) => 0,
        }
    }
}

/// Shortcut for `Result<T, OraError>`
pub type OraResult<T> = Result<T, OraError>;

/// Counts in this crate are `usize` but the statistics need `f64` values.
/// Set sizes never come close to the 2^52 limit, but we panic instead
/// of silently losing precision.
fn f64_from_usize(n: usize) -> f64 {
    let intermediate: u32 = n
        .try_into()
        .expect("cannot safely create f64 from large usize");
    intermediate.into()
}

/// `statrs` works on `u64` values
fn u64_from_usize(n: usize) -> u64 {
    n.try_into().expect("usize must fit into u64")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(OraError::InvalidInput("foo".to_string()).exit_code(), 1);
        assert_eq!(OraError::EmptyUniverseOrHits.exit_code(), 0);
        assert_eq!(
            OraError::ExternalLookupFailure("timeout".to_string()).exit_code(),
            0
        );
    }

    #[test]
    fn error_messages() {
        let err = OraError::InvalidInput("column `gene` not found".to_string());
        assert_eq!(err.to_string(), "invalid input: column `gene` not found");
    }

    #[test]
    fn usize_conversion() {
        assert!((f64_from_usize(12) - 12.0).abs() < f64::EPSILON);
        assert_eq!(u64_from_usize(7), 7);
    }
}
