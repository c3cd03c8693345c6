//! Pathway enrichment of gene sets, aggregated from multiple pathway databases
//!
//! The crate takes the pathway candidates that several [`PathwaySource`]s report
//! for a list of genes, merges them into one deduplicated set and calculates
//! which pathways are over-represented in the gene list.
//!
//! The main entry point is the [`Enricher`]:
//!
//! ```
//! use pathways::{Enricher, GeneList, PathwaySourceRecord, StaticSource};
//!
//! let kegg = StaticSource::new("KEGG", vec![
//!     PathwaySourceRecord::new("hsa04115", "p53 signaling pathway")
//!         .with_category("Cellular Processes")
//!         .with_pathway_gene_count(68)
//!         .with_matched_genes(["TP53", "MDM2"]),
//! ]);
//!
//! let enricher = Enricher::builder().source(kegg).build();
//! let genes = GeneList::from_freetext("TP53, MDM2, EGFR").unwrap();
//!
//! let pathways = enricher.enrich_pathways(&genes);
//! assert_eq!(pathways.len(), 1);
//! assert!(pathways[0].is_significant());
//! assert!(pathways[0].canonical_tags().contains("p53"));
//! ```
//!
//! All individual steps are public as well, in case the pathway records
//! are retrieved by other means:
//!
//! - [`merge()`] unions records from different sources
//! - [`score()`] calculates p-value and fold enrichment
//! - [`classify()`] derives canonical tags from the pathway description
//! - [`rank()`], [`filter_significant()`] and [`summarize_by_category()`]
use thiserror::Error;

pub mod enricher;
pub mod gene;
pub mod merge;
pub mod outcome;
pub mod pathway;
pub mod rank;
pub mod source;
pub mod stats;
pub mod tags;

pub use enricher::{Enricher, EnricherBuilder, EnrichmentReport};
pub use gene::{GeneList, GeneSymbol, Genes};
pub use merge::{merge, Merger};
pub use outcome::{Degradation, Outcome};
pub use pathway::{EnrichedPathway, MergedPathway, PathwaySourceRecord, Significance};
pub use rank::{filter_significant, rank, summarize_by_category, CategorySummary};
pub use source::{PathwaySource, StaticSource};
pub use stats::score;
pub use tags::{classify, Classify, TagSet};

/// The number of protein coding genes in the genome, used as background population
pub const TOTAL_GENES_IN_GENOME: u64 = 20_000;

/// Assumed number of genes in a pathway if the source does not report it
pub const DEFAULT_PATHWAY_SIZE: u64 = 100;

/// The maximum number of pathways returned from [`rank`]
pub const MAX_RESULTS: usize = 20;

/// p-values below this threshold are [`Significance::Significant`]
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Main Error type for this crate
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum PathwayError {
    /// A pathway source could not deliver any data
    #[error("source {label} unavailable: {reason}")]
    SourceUnavailable {
        /// The label of the source
        label: String,
        /// Why the source failed
        reason: String,
    },
    /// Invalid input data, e.g. an empty gene list
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The worker pool for querying sources could not be started
    #[error("unable to start worker pool: {0}")]
    WorkerPool(String),
}

/// Shortcut for `Result<T, PathwayError>`
pub type PathwayResult<T> = Result<T, PathwayError>;

/// We frequently divide `u64` counts and need `f64` values. Counts
/// are saturated at `u32::MAX` so the conversion is always lossless.
fn f64_from_u64(n: u64) -> f64 {
    u32::try_from(n).map_or(f64::from(u32::MAX), f64::from)
}

/// See [`f64_from_u64`]
fn f64_from_usize(n: usize) -> f64 {
    u32::try_from(n).map_or(f64::from(u32::MAX), f64::from)
}
