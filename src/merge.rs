//! Merging pathway records of multiple sources into one deduplicated set
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::debug;

use crate::pathway::{MergedPathway, PathwaySourceRecord};

/// Collects [`PathwaySourceRecord`]s and merges all records with the same identity key
///
/// The first record of every key defines the descriptive fields (name, category,
/// description, pathway size) of the [`MergedPathway`]. Later records only add their
/// matched genes and source label. Merging is therefore dependent on the
/// order in which records are added and callers must add records in a
/// deterministic order.
///
/// Records without `id` and `name` are skipped.
///
/// # Examples
///
/// ```
/// use pathways::{Merger, PathwaySourceRecord};
///
/// let mut merger = Merger::new();
/// merger.add(PathwaySourceRecord::new("P1", "A").with_source("KEGG"));
/// merger.add(PathwaySourceRecord::new("P1", "B").with_source("Reactome"));
/// merger.add(PathwaySourceRecord::default());
///
/// assert_eq!(merger.skipped(), 1);
///
/// let pathways = merger.finish();
/// assert_eq!(pathways.len(), 1);
/// assert_eq!(pathways[0].name(), "A");
/// assert_eq!(pathways[0].source(), "KEGG + Reactome");
/// ```
#[derive(Debug, Default)]
pub struct Merger {
    index: HashMap<String, usize>,
    pathways: Vec<MergedPathway>,
    skipped: usize,
}

impl Merger {
    /// Constructs a new, empty `Merger`
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single record
    ///
    /// Returns `false` if the record was skipped because it
    /// has no identity key, `true` otherwise.
    pub fn add(&mut self, record: PathwaySourceRecord) -> bool {
        let Some(key) = record.identity_key() else {
            debug!("Skipping record without id and name from {}", record.source());
            self.skipped += 1;
            return false;
        };

        match self.index.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                self.pathways[*entry.get()].absorb(&record);
            }
            Entry::Vacant(entry) => {
                entry.insert(self.pathways.len());
                self.pathways.push(MergedPathway::seed(record));
            }
        }
        true
    }

    /// Adds all records of one source
    pub fn extend<I: IntoIterator<Item = PathwaySourceRecord>>(&mut self, records: I) {
        for record in records {
            self.add(record);
        }
    }

    /// The number of skipped, malformed records
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// The number of distinct pathways
    pub fn len(&self) -> usize {
        self.pathways.len()
    }

    /// Returns `true` if no pathway was added yet
    pub fn is_empty(&self) -> bool {
        self.pathways.is_empty()
    }

    /// Returns the merged pathways in the order their keys were first added
    pub fn finish(self) -> Vec<MergedPathway> {
        self.pathways
    }
}

/// Merges the record lists of multiple sources
///
/// All records of the first list are processed before the records of the
/// second list and so on. See [`Merger`] for the merge rules.
///
/// The output is in the order in which the pathways were first encountered.
///
/// # Examples
///
/// ```
/// use pathways::{merge, PathwaySourceRecord};
///
/// let kegg = vec![
///     PathwaySourceRecord::new("hsa04115", "p53 signaling pathway")
///         .with_source("KEGG")
///         .with_matched_genes(["TP53"]),
/// ];
/// let wikipathways = vec![
///     PathwaySourceRecord::new("hsa04115", "TP53 network")
///         .with_source("WikiPathways")
///         .with_matched_genes(["TP53", "MDM2"]),
/// ];
///
/// let merged = merge(vec![kegg, wikipathways]);
/// assert_eq!(merged.len(), 1);
/// assert_eq!(merged[0].name(), "p53 signaling pathway");
/// assert_eq!(merged[0].matched_gene_count(), 2);
/// ```
pub fn merge<L, R>(lists: L) -> Vec<MergedPathway>
where
    L: IntoIterator<Item = R>,
    R: IntoIterator<Item = PathwaySourceRecord>,
{
    let mut merger = Merger::new();
    for list in lists {
        merger.extend(list);
    }
    merger.finish()
}
