//! The entry point of the enrichment analysis
use std::fmt::Display;

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::gene::GeneList;
use crate::merge::Merger;
use crate::outcome::{Degradation, Outcome};
use crate::pathway::EnrichedPathway;
use crate::rank::{filter_significant, rank, summarize_by_category, CategorySummary};
use crate::source::{fetch_all, PathwaySource};
use crate::stats::score;

/// The number of pathways listed in the text representation of an [`EnrichmentReport`]
const REPORT_TOP_PATHWAYS: usize = 5;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// `Enricher` runs the full enrichment analysis of a gene list
///
/// It holds all registered [`PathwaySource`]s and is meant to be
/// constructed once, at startup, and shared for all requests.
/// The `Enricher` itself does not keep any state between requests.
///
/// ```mermaid
/// flowchart LR
///     genes[Gene list] --> fetch
///     subgraph fetch[Concurrent fetch]
///         A[Source A]
///         B[Source B]
///     end
///     fetch --> merge[Merge] --> score[Score & tag] --> rank[Rank] --> result[Top 20 pathways]
/// ```
///
/// # Examples
///
/// ```
/// use pathways::{Enricher, GeneList, PathwaySourceRecord, StaticSource};
///
/// let p53 = PathwaySourceRecord::new("hsa04115", "p53 signaling")
///     .with_pathway_gene_count(68)
///     .with_matched_genes(["TP53"]);
///
/// let enricher = Enricher::builder()
///     .source(StaticSource::new("KEGG", vec![p53.clone()]))
///     .source(StaticSource::new("Reactome", vec![p53]))
///     .build();
///
/// let genes = GeneList::from_freetext("TP53").unwrap();
/// let pathways = enricher.enrich_pathways(&genes);
///
/// assert_eq!(pathways.len(), 1);
/// assert_eq!(pathways[0].source(), "KEGG + Reactome");
/// assert_eq!(pathways[0].matched_gene_count(), 1);
/// ```
pub struct Enricher {
    sources: Vec<Box<dyn PathwaySource>>,
    max_concurrent_sources: usize,
}

impl Enricher {
    /// Returns an [`EnricherBuilder`] to register sources
    pub fn builder() -> EnricherBuilder {
        EnricherBuilder::default()
    }

    /// The labels of all registered sources, in registration order
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|source| source.label())
    }

    /// The maximum number of sources that are queried at the same time
    pub fn max_concurrent_sources(&self) -> usize {
        self.max_concurrent_sources
    }

    /// Returns the (at most 20) most significant pathways for the `genes`
    ///
    /// This method never fails. If a source fails, its pathways are missing
    /// from the result. If all sources fail, the result is empty.
    /// Use [`Enricher::try_enrich`] to find out if the result is complete.
    pub fn enrich_pathways(&self, genes: &GeneList) -> Vec<EnrichedPathway> {
        self.try_enrich(genes).into_value()
    }

    /// Returns the (at most 20) most significant pathways for the `genes`,
    /// along with all issues that occured
    ///
    /// An empty gene list returns an empty [`Outcome::Ok`] without
    /// querying any source.
    pub fn try_enrich(&self, genes: &GeneList) -> Outcome<Vec<EnrichedPathway>> {
        if genes.is_empty() {
            debug!("No genes provided, skipping enrichment");
            return Outcome::Ok(Vec::new());
        }

        let responses = match fetch_all(&self.sources, genes, self.max_concurrent_sources) {
            Ok(responses) => responses,
            Err(err) => {
                error!("Unable to query pathway sources: {}", err);
                return Outcome::failed(err.into());
            }
        };

        let mut reasons = Vec::new();
        let mut merger = Merger::new();
        for response in responses {
            match response {
                Ok(records) => merger.extend(records),
                Err(err) => reasons.push(Degradation::from(err)),
            }
        }
        if merger.skipped() > 0 {
            warn!("Skipped {} records without id and name", merger.skipped());
            reasons.push(Degradation::MalformedRecords {
                count: merger.skipped(),
            });
        }

        debug!("Merged {} distinct pathways", merger.len());
        let ranked = rank(score(genes, merger.finish()));
        Outcome::from((ranked, reasons))
    }

    /// Runs the enrichment and summarizes the result
    pub fn report(&self, genes: &GeneList) -> EnrichmentReport {
        let (pathways, degradations) = self.try_enrich(genes).into_parts();
        EnrichmentReport::new(genes.len(), pathways, degradations)
    }
}

impl std::fmt::Debug for Enricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enricher")
            .field("sources", &self.sources().collect::<Vec<_>>())
            .field("max_concurrent_sources", &self.max_concurrent_sources)
            .finish()
    }
}

/// Builder for an [`Enricher`]
///
/// # Examples
///
/// ```
/// use pathways::{Enricher, StaticSource};
///
/// let enricher = Enricher::builder()
///     .source(StaticSource::new("KEGG", Vec::new()))
///     .source(StaticSource::new("Reactome", Vec::new()))
///     .max_concurrent_sources(1)
///     .build();
///
/// assert_eq!(enricher.sources().collect::<Vec<_>>(), vec!["KEGG", "Reactome"]);
/// assert_eq!(enricher.max_concurrent_sources(), 1);
/// ```
#[derive(Default)]
pub struct EnricherBuilder {
    sources: Vec<Box<dyn PathwaySource>>,
    max_concurrent_sources: Option<usize>,
}

impl EnricherBuilder {
    /// Registers a source
    ///
    /// Sources are merged in the order of registration, so the first
    /// source takes precedence for the descriptive fields of a pathway.
    #[must_use]
    pub fn source<S: PathwaySource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Registers an already boxed source
    #[must_use]
    pub fn boxed_source(mut self, source: Box<dyn PathwaySource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Limits the number of sources that are queried at the same time
    ///
    /// Defaults to the number of sources, i.e. all sources at once.
    #[must_use]
    pub fn max_concurrent_sources(mut self, max: usize) -> Self {
        self.max_concurrent_sources = Some(max.max(1));
        self
    }

    /// Builds the [`Enricher`]
    pub fn build(self) -> Enricher {
        let max_concurrent_sources = self
            .max_concurrent_sources
            .unwrap_or(self.sources.len())
            .max(1);
        Enricher {
            sources: self.sources,
            max_concurrent_sources,
        }
    }
}

/// The ranked pathways of an enrichment analysis with summary statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentReport {
    input_genes: usize,
    pathways: Vec<EnrichedPathway>,
    categories: Vec<CategorySummary>,
    significant_pathways: usize,
    degradations: Vec<Degradation>,
}

impl EnrichmentReport {
    /// Builds the report from ranked pathways
    pub fn new(
        input_genes: usize,
        pathways: Vec<EnrichedPathway>,
        degradations: Vec<Degradation>,
    ) -> Self {
        let categories = summarize_by_category(&pathways);
        let significant_pathways = filter_significant(&pathways, None).len();
        Self {
            input_genes,
            pathways,
            categories,
            significant_pathways,
            degradations,
        }
    }

    /// The number of input genes
    pub fn input_genes(&self) -> usize {
        self.input_genes
    }

    /// The ranked pathways
    pub fn pathways(&self) -> &[EnrichedPathway] {
        &self.pathways
    }

    /// Summaries of all categories, sorted by average p-value
    pub fn categories(&self) -> &[CategorySummary] {
        &self.categories
    }

    /// The number of pathways with `p < 0.05`
    pub fn significant_pathways(&self) -> usize {
        self.significant_pathways
    }

    /// Reasons why the report might be incomplete
    pub fn degradations(&self) -> &[Degradation] {
        &self.degradations
    }

    /// Returns `true` if all sources delivered their data
    pub fn is_complete(&self) -> bool {
        self.degradations.is_empty()
    }
}

impl Display for EnrichmentReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Pathway enrichment of {} genes", self.input_genes)?;
        writeln!(
            f,
            "Pathways: {} ({} significant)",
            self.pathways.len(),
            self.significant_pathways
        )?;
        writeln!(f, "Categories: {}", self.categories.len())?;
        if !self.pathways.is_empty() {
            writeln!(f, "Top pathways:")?;
            for (idx, pathway) in self.pathways.iter().take(REPORT_TOP_PATHWAYS).enumerate() {
                writeln!(f, "{}. {}", idx + 1, pathway)?;
            }
        }
        for degradation in &self.degradations {
            writeln!(f, "Warning: {degradation}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{PathwayError, PathwayResult, PathwaySourceRecord, StaticSource};

    struct Offline;

    impl PathwaySource for Offline {
        fn label(&self) -> &str {
            "Offline"
        }

        fn fetch(&self, _genes: &GeneList) -> PathwayResult<Vec<PathwaySourceRecord>> {
            Err(PathwayError::SourceUnavailable {
                label: "Offline".to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    fn kegg() -> StaticSource {
        StaticSource::new(
            "KEGG",
            vec![
                PathwaySourceRecord::new("hsa04115", "p53 signaling pathway")
                    .with_category("Cellular Processes")
                    .with_pathway_gene_count(68)
                    .with_matched_genes(["TP53", "MDM2", "CDKN1A"]),
                PathwaySourceRecord::new("hsa04210", "Apoptosis")
                    .with_category("Cellular Processes")
                    .with_pathway_gene_count(136)
                    .with_matched_genes(["TP53", "BAX"]),
            ],
        )
    }

    #[test]
    fn empty_genes() {
        let enricher = Enricher::builder().source(Offline).build();
        let outcome = enricher.try_enrich(&GeneList::default());
        assert_eq!(outcome, Outcome::Ok(Vec::new()));
    }

    #[test]
    fn no_sources() {
        let enricher = Enricher::builder().build();
        let genes = GeneList::from_freetext("TP53").unwrap();
        assert_eq!(enricher.max_concurrent_sources(), 1);
        assert_eq!(enricher.try_enrich(&genes), Outcome::Ok(Vec::new()));
    }

    #[test]
    fn failing_source_is_absorbed() {
        let enricher = Enricher::builder().source(Offline).source(kegg()).build();
        let genes = GeneList::from_freetext("TP53, MDM2").unwrap();

        let outcome = enricher.try_enrich(&genes);
        assert!(outcome.is_degraded());
        assert_eq!(
            outcome.reasons(),
            &[Degradation::DataUnavailable {
                source: "Offline".to_string(),
                reason: "connection refused".to_string()
            }]
        );
        assert_eq!(outcome.value().len(), 2);
        assert_eq!(outcome.value()[0].name(), "p53 signaling pathway");
    }

    #[test]
    fn all_sources_fail() {
        let enricher = Enricher::builder().source(Offline).source(Offline).build();
        let genes = GeneList::from_freetext("TP53").unwrap();
        assert!(enricher.enrich_pathways(&genes).is_empty());
        assert_eq!(enricher.try_enrich(&genes).reasons().len(), 2);
    }

    #[test]
    fn malformed_records_are_reported() {
        let broken = StaticSource::new(
            "Broken",
            vec![PathwaySourceRecord::default().with_matched_genes(["TP53"])],
        );
        let enricher = Enricher::builder().source(kegg()).source(broken).build();
        let genes = GeneList::from_freetext("TP53").unwrap();

        let outcome = enricher.try_enrich(&genes);
        assert_eq!(
            outcome.reasons(),
            &[Degradation::MalformedRecords { count: 1 }]
        );
        assert_eq!(outcome.value().len(), 2);
    }

    #[test]
    fn report() {
        let enricher = Enricher::builder().source(kegg()).source(Offline).build();
        let genes = GeneList::from_freetext("TP53, MDM2, CDKN1A").unwrap();

        let report = enricher.report(&genes);
        assert_eq!(report.input_genes(), 3);
        assert_eq!(report.pathways().len(), 2);
        assert_eq!(report.significant_pathways(), 2);
        assert_eq!(report.categories().len(), 1);
        assert!(!report.is_complete());

        let text = report.to_string();
        assert!(text.starts_with("Pathway enrichment of 3 genes\n"));
        assert!(text.contains("Pathways: 2 (2 significant)"));
        assert!(text.contains("1. p53 signaling pathway (p="));
        assert!(text.contains("Warning: Offline unavailable: connection refused"));
    }

    #[test]
    fn report_serializes() {
        let enricher = Enricher::builder().source(kegg()).build();
        let genes = GeneList::from_freetext("TP53").unwrap();
        let json = serde_json::to_value(enricher.report(&genes)).unwrap();
        assert_eq!(json["inputGenes"], 1);
        assert_eq!(json["pathways"][0]["significance"], "significant");
        assert_eq!(json["pathways"][0]["inputGenesMatched"][0], "TP53");
        assert!(json["pathways"][0]["pvalue"].is_number());
        assert!(json["degradations"].as_array().unwrap().is_empty());
    }

    #[test]
    fn debug_lists_sources() {
        let enricher = Enricher::builder().source(kegg()).build();
        assert!(format!("{enricher:?}").contains("KEGG"));
    }
}
