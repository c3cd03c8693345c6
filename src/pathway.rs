//! Pathway records as reported by sources, after merging and after enrichment
use std::fmt::Display;

use serde::Serialize;

use crate::gene::{GeneSymbol, Genes};
use crate::tags::{Classify, TagSet};
use crate::SIGNIFICANCE_THRESHOLD;

/// Separator between source labels of a [`MergedPathway`]
pub const SOURCE_SEPARATOR: &str = " + ";

/// A pathway candidate, as reported by a single [`PathwaySource`](`crate::PathwaySource`)
///
/// Records are created by the sources and are not modified afterwards.
///
/// # Examples
///
/// ```
/// use pathways::PathwaySourceRecord;
///
/// let record = PathwaySourceRecord::new("hsa04210", "Apoptosis")
///     .with_source("KEGG")
///     .with_pathway_gene_count(136)
///     .with_matched_genes(["TP53", "BAX"]);
///
/// assert_eq!(record.identity_key(), Some("hsa04210"));
/// assert_eq!(record.matched_genes().len(), 2);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathwaySourceRecord {
    id: String,
    name: String,
    category: Option<String>,
    description: String,
    source: String,
    #[serde(rename = "genesInPathway")]
    pathway_gene_count: Option<u64>,
    #[serde(rename = "inputGenesMatched")]
    matched_genes: Genes,
    matched_gene_count: Option<usize>,
}

impl PathwaySourceRecord {
    /// Constructs a new record with the provider scoped `id` and a `name`
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Constructs a new record without an ID
    ///
    /// The name will be used to identify the pathway across sources
    pub fn named(name: &str) -> Self {
        Self::new("", name)
    }

    /// Sets the category, e.g. `Metabolism` or `Signal transduction`
    #[must_use]
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Sets the free text description
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Sets the label of the reporting source
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    /// Sets the total number of genes in the pathway
    #[must_use]
    pub fn with_pathway_gene_count(mut self, count: u64) -> Self {
        self.pathway_gene_count = Some(count);
        self
    }

    /// Sets the input genes that are part of the pathway
    #[must_use]
    pub fn with_matched_genes<I, G>(mut self, genes: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<GeneSymbol>,
    {
        self.matched_genes = genes.into_iter().collect();
        self
    }

    /// Sets the number of matched genes, as claimed by the source
    #[must_use]
    pub fn with_matched_gene_count(mut self, count: usize) -> Self {
        self.matched_gene_count = Some(count);
        self
    }

    /// The provider scoped ID, might be empty
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The name of the pathway
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The category of the pathway, if known
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// The free text description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The label of the source that reported the record
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The total number of genes in the pathway, if known
    pub fn pathway_gene_count(&self) -> Option<u64> {
        self.pathway_gene_count
    }

    /// The input genes that are part of the pathway
    pub fn matched_genes(&self) -> &Genes {
        &self.matched_genes
    }

    /// The number of matched genes, as claimed by the source
    ///
    /// This value is not trusted during merging, [`MergedPathway::matched_gene_count`]
    /// is always recalculated.
    pub fn matched_gene_count(&self) -> Option<usize> {
        self.matched_gene_count
    }

    /// The key used to identify the same pathway across sources
    ///
    /// This is the `id` if present, otherwise the `name`. Returns `None`
    /// if the record has neither.
    pub fn identity_key(&self) -> Option<&str> {
        [self.id.as_str(), self.name.as_str()]
            .into_iter()
            .find(|key| !key.is_empty())
    }

    /// Sets the source label, unless the record has one already
    pub(crate) fn stamp_source(&mut self, source: &str) {
        if self.source.is_empty() {
            self.source = source.to_string();
        }
    }
}

impl Classify for PathwaySourceRecord {
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// A pathway that combines the records of all sources with the same identity key
///
/// - The matched genes are the union of all records
/// - The source is the list of all distinct source labels, joined by `" + "`
/// - All other fields are taken from the first record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedPathway {
    id: String,
    name: String,
    category: Option<String>,
    description: String,
    source: String,
    #[serde(skip)]
    sources: Vec<String>,
    #[serde(rename = "genesInPathway")]
    pathway_gene_count: Option<u64>,
    #[serde(rename = "inputGenesMatched")]
    matched_genes: Genes,
    matched_gene_count: usize,
}

impl MergedPathway {
    /// Creates the merged pathway from its first record
    pub(crate) fn seed(record: PathwaySourceRecord) -> Self {
        let matched_gene_count = record.matched_genes.len();
        let mut pathway = Self {
            id: record.id,
            name: record.name,
            category: record.category,
            description: record.description,
            source: String::new(),
            sources: Vec::new(),
            pathway_gene_count: record.pathway_gene_count,
            matched_genes: record.matched_genes,
            matched_gene_count,
        };
        pathway.add_source(&record.source);
        pathway
    }

    /// Adds the matched genes and the source label of another record
    ///
    /// Descriptive fields of `record` are ignored.
    pub(crate) fn absorb(&mut self, record: &PathwaySourceRecord) {
        self.matched_genes.union(&record.matched_genes);
        self.matched_gene_count = self.matched_genes.len();
        self.add_source(&record.source);
    }

    fn add_source(&mut self, source: &str) {
        if source.is_empty() || self.sources.iter().any(|s| s == source) {
            return;
        }
        self.sources.push(source.to_string());
        self.source = self.sources.join(SOURCE_SEPARATOR);
    }

    /// The ID of the first record, might be empty
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The name of the pathway
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The category of the pathway, if known
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// The free text description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// All distinct source labels, joined by `" + "`
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Iterates all distinct source labels in the order they were first seen
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(String::as_str)
    }

    /// The total number of genes in the pathway, if known
    pub fn pathway_gene_count(&self) -> Option<u64> {
        self.pathway_gene_count
    }

    /// The input genes that are part of the pathway
    pub fn matched_genes(&self) -> &Genes {
        &self.matched_genes
    }

    /// The number of matched genes
    pub fn matched_gene_count(&self) -> usize {
        self.matched_gene_count
    }

    /// The identity key, see [`PathwaySourceRecord::identity_key`]
    pub fn identity_key(&self) -> &str {
        if self.id.is_empty() {
            &self.name
        } else {
            &self.id
        }
    }
}

impl Classify for MergedPathway {
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// Whether the p-value of an [`EnrichedPathway`] is below [`SIGNIFICANCE_THRESHOLD`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Significance {
    /// `p < 0.05`
    #[serde(rename = "significant")]
    Significant,
    /// `p >= 0.05`
    #[serde(rename = "not significant")]
    NotSignificant,
}

impl Significance {
    /// The significance of a p-value
    pub fn from_pvalue(pvalue: f64) -> Self {
        if pvalue < SIGNIFICANCE_THRESHOLD {
            Significance::Significant
        } else {
            Significance::NotSignificant
        }
    }
}

impl Display for Significance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Significance::Significant => write!(f, "significant"),
            Significance::NotSignificant => write!(f, "not significant"),
        }
    }
}

/// A [`MergedPathway`] with its enrichment statistics and canonical tags
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedPathway {
    #[serde(flatten)]
    pathway: MergedPathway,
    #[serde(rename = "pvalue")]
    p_value: f64,
    fold_enrichment: f64,
    enrichment_score: f64,
    canonical_tags: TagSet,
    significance: Significance,
}

impl EnrichedPathway {
    pub(crate) fn new(
        pathway: MergedPathway,
        p_value: f64,
        fold_enrichment: f64,
        enrichment_score: f64,
        canonical_tags: TagSet,
    ) -> Self {
        Self {
            pathway,
            p_value,
            fold_enrichment,
            enrichment_score,
            canonical_tags,
            significance: Significance::from_pvalue(p_value),
        }
    }

    /// The underlying merged pathway
    pub fn pathway(&self) -> &MergedPathway {
        &self.pathway
    }

    /// The name of the pathway
    pub fn name(&self) -> &str {
        self.pathway.name()
    }

    /// The category of the pathway, if known
    pub fn category(&self) -> Option<&str> {
        self.pathway.category()
    }

    /// All distinct source labels, joined by `" + "`
    pub fn source(&self) -> &str {
        self.pathway.source()
    }

    /// The input genes that are part of the pathway
    pub fn matched_genes(&self) -> &Genes {
        self.pathway.matched_genes()
    }

    /// The number of matched genes
    pub fn matched_gene_count(&self) -> usize {
        self.pathway.matched_gene_count()
    }

    /// Returns the p-value of the enrichment
    ///
    /// The p-value indicates the probability that the overlap
    /// between input genes and pathway occured by chance
    pub fn pvalue(&self) -> f64 {
        self.p_value
    }

    /// Returns the fold enrichment over the expected overlap
    pub fn fold_enrichment(&self) -> f64 {
        self.fold_enrichment
    }

    /// Composite ranking score of fold enrichment and confidence, capped at 1
    pub fn enrichment_score(&self) -> f64 {
        self.enrichment_score
    }

    /// The canonical tags derived from name, description and category
    pub fn canonical_tags(&self) -> &TagSet {
        &self.canonical_tags
    }

    /// The [`Significance`] of the p-value
    pub fn significance(&self) -> Significance {
        self.significance
    }

    /// Returns `true` if the p-value is below [`SIGNIFICANCE_THRESHOLD`]
    pub fn is_significant(&self) -> bool {
        self.significance == Significance::Significant
    }
}

impl Classify for EnrichedPathway {
    fn name(&self) -> &str {
        self.pathway.name()
    }
    fn description(&self) -> &str {
        self.pathway.description()
    }
    fn category(&self) -> Option<&str> {
        self.pathway.category()
    }
}

impl Display for EnrichedPathway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (p={:.2e})", self.name(), self.p_value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn identity_key() {
        let record = PathwaySourceRecord::new("R-HSA-109581", "Apoptosis");
        assert_eq!(record.identity_key(), Some("R-HSA-109581"));

        let record = PathwaySourceRecord::named("Apoptosis");
        assert_eq!(record.identity_key(), Some("Apoptosis"));

        let record = PathwaySourceRecord::default();
        assert_eq!(record.identity_key(), None);
    }

    #[test]
    fn seed_recalculates_count() {
        let record = PathwaySourceRecord::new("hsa04115", "p53 signaling")
            .with_source("KEGG")
            .with_matched_genes(["TP53", "MDM2"])
            .with_matched_gene_count(7);
        let merged = MergedPathway::seed(record);
        assert_eq!(merged.matched_gene_count(), 2);
        assert_eq!(merged.source(), "KEGG");
    }

    #[test]
    fn absorb_keeps_first_fields() {
        let first = PathwaySourceRecord::new("P1", "A")
            .with_source("KEGG")
            .with_pathway_gene_count(50)
            .with_matched_genes(["TP53"]);
        let second = PathwaySourceRecord::new("P1", "B")
            .with_source("Reactome")
            .with_pathway_gene_count(80)
            .with_matched_genes(["TP53", "ATM"]);

        let mut merged = MergedPathway::seed(first);
        merged.absorb(&second);
        merged.absorb(&second);

        assert_eq!(merged.name(), "A");
        assert_eq!(merged.pathway_gene_count(), Some(50));
        assert_eq!(merged.matched_gene_count(), 2);
        assert_eq!(merged.source(), "KEGG + Reactome");
        assert_eq!(merged.sources().count(), 2);
    }

    #[test]
    fn significance() {
        assert_eq!(Significance::from_pvalue(0.049), Significance::Significant);
        assert_eq!(
            Significance::from_pvalue(0.05),
            Significance::NotSignificant
        );
        assert_eq!(Significance::NotSignificant.to_string(), "not significant");
    }

    #[test]
    fn serialize_record() {
        let record = PathwaySourceRecord::new("hsa04115", "p53 signaling")
            .with_pathway_gene_count(68)
            .with_matched_genes(["TP53"]);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["genesInPathway"], 68);
        assert_eq!(json["inputGenesMatched"][0], "TP53");
        assert!(json["matchedGeneCount"].is_null());
    }
}
