//! Pathway sources (KEGG, Reactome, WikiPathways, ...) and querying them concurrently
//!
//! A [`PathwaySource`] wraps the retrieval of pathway candidates from one
//! database. Network access, authentication, rate limits, retries and the
//! parsing of the response format are the responsibility of the source.
//! This crate only relies on the returned [`PathwaySourceRecord`]s.
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::gene::GeneList;
use crate::pathway::PathwaySourceRecord;
use crate::{PathwayError, PathwayResult};

/// A provider of pathway candidates for a list of genes
///
/// Sources are shared between threads and queried concurrently,
/// so they must be `Send` and `Sync`.
pub trait PathwaySource: Send + Sync {
    /// The label of the source, e.g. `KEGG`
    ///
    /// The label is added to every record that does not specify its own source.
    fn label(&self) -> &str;

    /// Returns all pathways that contain at least one of the `genes`
    ///
    /// # Errors
    ///
    /// If the source is not able to provide any data, it should return
    /// [`PathwayError::SourceUnavailable`]. Other errors are converted into it.
    fn fetch(&self, genes: &GeneList) -> PathwayResult<Vec<PathwaySourceRecord>>;
}

impl<T: PathwaySource + ?Sized> PathwaySource for Box<T> {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn fetch(&self, genes: &GeneList) -> PathwayResult<Vec<PathwaySourceRecord>> {
        (**self).fetch(genes)
    }
}

/// A [`PathwaySource`] that serves a fixed set of records from memory
///
/// Useful for offline analysis, fixtures and tests.
///
/// # Examples
///
/// ```
/// use pathways::{GeneList, PathwaySource, PathwaySourceRecord, StaticSource};
///
/// let source = StaticSource::new("KEGG", vec![
///     PathwaySourceRecord::new("hsa04115", "p53 signaling pathway")
///         .with_matched_genes(["TP53", "MDM2", "CDKN1A"]),
///     PathwaySourceRecord::new("hsa04012", "ErbB signaling pathway")
///         .with_matched_genes(["EGFR", "ERBB2"]),
/// ]);
///
/// let genes = GeneList::from_freetext("TP53, CDKN1A, BRCA1").unwrap();
/// let records = source.fetch(&genes).unwrap();
///
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].matched_genes().len(), 2);
/// assert_eq!(records[0].source(), "KEGG");
/// ```
#[derive(Debug, Clone)]
pub struct StaticSource {
    label: String,
    records: Vec<PathwaySourceRecord>,
}

impl StaticSource {
    /// Constructs a new `StaticSource`
    ///
    /// The matched genes of each record are the pathway genes known to
    /// the source. [`PathwaySource::fetch`] restricts them to the queried genes.
    pub fn new(label: &str, records: Vec<PathwaySourceRecord>) -> Self {
        Self {
            label: label.to_string(),
            records,
        }
    }
}

impl PathwaySource for StaticSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn fetch(&self, genes: &GeneList) -> PathwayResult<Vec<PathwaySourceRecord>> {
        Ok(self
            .records
            .iter()
            .filter_map(|record| {
                let matched: Vec<_> = record
                    .matched_genes()
                    .iter()
                    .filter(|gene| genes.contains(gene.as_str()))
                    .cloned()
                    .collect();
                if matched.is_empty() {
                    None
                } else {
                    let count = matched.len();
                    Some(
                        record
                            .clone()
                            .with_matched_genes(matched)
                            .with_matched_gene_count(count),
                    )
                }
            })
            .collect())
    }
}

/// Queries all `sources` concurrently and waits until all of them are done
///
/// At most `max_concurrent` sources are queried at the same time. The results
/// are returned in the same order as `sources`, independent of the order in
/// which the sources finish. Records without a source label are labelled
/// with [`PathwaySource::label`].
///
/// # Errors
///
/// Returns [`PathwayError::WorkerPool`] if the threads cannot be spawned.
/// Errors and panics of individual sources are returned inside the `Vec` as
/// [`PathwayError::SourceUnavailable`].
pub fn fetch_all<S: PathwaySource>(
    sources: &[S],
    genes: &GeneList,
    max_concurrent: usize,
) -> PathwayResult<Vec<PathwayResult<Vec<PathwaySourceRecord>>>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_concurrent.max(1))
        .thread_name(|idx| format!("pathway-source-{idx}"))
        .build()
        .map_err(|err| PathwayError::WorkerPool(err.to_string()))?;

    Ok(pool.install(|| {
        sources
            .par_iter()
            .map(|source| fetch_one(source, genes))
            .collect()
    }))
}

fn fetch_one<S: PathwaySource>(
    source: &S,
    genes: &GeneList,
) -> PathwayResult<Vec<PathwaySourceRecord>> {
    let response = panic::catch_unwind(AssertUnwindSafe(|| source.fetch(genes)))
        .unwrap_or_else(|payload| {
            Err(PathwayError::SourceUnavailable {
                label: source.label().to_string(),
                reason: panic_reason(payload.as_ref()),
            })
        });

    match response {
        Ok(mut records) => {
            debug!("{} returned {} records", source.label(), records.len());
            for record in &mut records {
                record.stamp_source(source.label());
            }
            Ok(records)
        }
        Err(PathwayError::SourceUnavailable { label, reason }) => {
            warn!("{} unavailable: {}", label, reason);
            Err(PathwayError::SourceUnavailable { label, reason })
        }
        Err(err) => {
            warn!("{} failed: {}", source.label(), err);
            Err(PathwayError::SourceUnavailable {
                label: source.label().to_string(),
                reason: err.to_string(),
            })
        }
    }
}

fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|msg| (*msg).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned());
    match message {
        Some(message) => format!("panicked: {message}"),
        None => "panicked".to_string(),
    }
}
