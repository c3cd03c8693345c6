//! Best-effort results that carry the reasons why they are incomplete
use std::fmt::Display;

use serde::Serialize;

use crate::PathwayError;

/// Why an [`Outcome`] is degraded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Degradation {
    /// A source failed and did not contribute any records
    DataUnavailable {
        /// The label of the source
        source: String,
        /// The error message of the source
        reason: String,
    },
    /// Records without `id` and `name` were dropped
    MalformedRecords {
        /// The number of dropped records
        count: usize,
    },
    /// No source could be queried at all
    Failed {
        /// The error message
        reason: String,
    },
}

impl From<PathwayError> for Degradation {
    fn from(err: PathwayError) -> Self {
        match err {
            PathwayError::SourceUnavailable { label, reason } => Degradation::DataUnavailable {
                source: label,
                reason,
            },
            other => Degradation::Failed {
                reason: other.to_string(),
            },
        }
    }
}

impl Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degradation::DataUnavailable { source, reason } => {
                write!(f, "{source} unavailable: {reason}")
            }
            Degradation::MalformedRecords { count } => {
                write!(f, "{count} malformed records skipped")
            }
            Degradation::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// The result of a best-effort operation
///
/// Failures of collaborators never abort an enrichment. Instead the
/// result is marked as `Degraded` and still holds a valid (possibly empty) value.
///
/// # Examples
///
/// ```
/// use pathways::{Degradation, Outcome};
///
/// let outcome: Outcome<Vec<u32>> = Outcome::Ok(vec![1, 2]);
/// assert!(!outcome.is_degraded());
///
/// let outcome = outcome.degrade(Degradation::MalformedRecords { count: 3 });
/// assert!(outcome.is_degraded());
/// assert_eq!(outcome.reasons().len(), 1);
/// assert_eq!(outcome.into_value(), vec![1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The operation succeeded without any issues
    Ok(T),
    /// The operation completed, but some data is missing
    Degraded {
        /// The best-effort value
        value: T,
        /// All reasons for the degradation, in the order they occured
        reasons: Vec<Degradation>,
    },
}

impl<T> Outcome<T> {
    /// Returns `true` if the outcome is degraded
    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    /// Returns the value, regardless of degradation
    pub fn value(&self) -> &T {
        match self {
            Outcome::Ok(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    /// Consumes the outcome and returns the value, regardless of degradation
    pub fn into_value(self) -> T {
        match self {
            Outcome::Ok(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    /// The reasons of the degradation, empty for [`Outcome::Ok`]
    pub fn reasons(&self) -> &[Degradation] {
        match self {
            Outcome::Ok(_) => &[],
            Outcome::Degraded { reasons, .. } => reasons,
        }
    }

    /// Adds another reason and turns the outcome into [`Outcome::Degraded`]
    #[must_use]
    pub fn degrade(self, reason: Degradation) -> Self {
        match self {
            Outcome::Ok(value) => Outcome::Degraded {
                value,
                reasons: vec![reason],
            },
            Outcome::Degraded { value, mut reasons } => {
                reasons.push(reason);
                Outcome::Degraded { value, reasons }
            }
        }
    }

    /// Maps the value, keeping the degradation reasons
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Ok(value) => Outcome::Ok(f(value)),
            Outcome::Degraded { value, reasons } => Outcome::Degraded {
                value: f(value),
                reasons,
            },
        }
    }

    /// Splits the outcome into value and degradation reasons
    pub fn into_parts(self) -> (T, Vec<Degradation>) {
        match self {
            Outcome::Ok(value) => (value, Vec::new()),
            Outcome::Degraded { value, reasons } => (value, reasons),
        }
    }
}

impl<T: Default> Outcome<T> {
    /// A degraded, empty outcome
    pub fn failed(reason: Degradation) -> Self {
        Outcome::Degraded {
            value: T::default(),
            reasons: vec![reason],
        }
    }
}

impl<T> From<(T, Vec<Degradation>)> for Outcome<T> {
    fn from((value, reasons): (T, Vec<Degradation>)) -> Self {
        if reasons.is_empty() {
            Outcome::Ok(value)
        } else {
            Outcome::Degraded { value, reasons }
        }
    }
}
