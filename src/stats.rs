//! Statistical enrichment of pathways within a set of input genes
//!
//! For each pathway, the enrichment answers the question: how likely is it
//! to observe at least as many input genes in the pathway as we do,
//! if the input genes were picked at random from the genome?
//!
//! The exact answer is given by the hypergeometric distribution. This crate
//! uses the [binomial approximation](`binomial::Binomial`) with the success
//! probability `pathway size / genes in genome`, which is accurate as long as
//! the input gene list is small compared to the genome.
//!
//! In addition to the p-value, the fold enrichment (observed vs. expected overlap)
//! and a composite ranking score are calculated.
use tracing::debug;

use crate::gene::GeneList;
use crate::pathway::{EnrichedPathway, MergedPathway};
use crate::tags::classify;
use crate::{f64_from_u64, DEFAULT_PATHWAY_SIZE, TOTAL_GENES_IN_GENOME};

pub mod binomial;
use binomial::Binomial;

/// The p-value, fold enrichment and ranking score of a single pathway
///
/// [`Enrichment`] is returned from [`Enrichment::calculate`] and is
/// stored in every [`EnrichedPathway`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enrichment {
    pvalue: f64,
    fold_enrichment: f64,
    score: f64,
    overlap: u64,
}

impl Enrichment {
    /// Calculates the enrichment of a pathway
    ///
    /// - `sample_size`: The number of input genes (draws)
    /// - `pathway_size`: The number of genes in the pathway (successes in the population)
    /// - `overlap`: The number of input genes in the pathway (observed successes)
    ///
    /// The population is [`TOTAL_GENES_IN_GENOME`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pathways::stats::Enrichment;
    ///
    /// let enrichment = Enrichment::calculate(5, 5, 5);
    /// assert!(enrichment.pvalue() < 1e-15);
    /// assert!(enrichment.fold_enrichment() > 1.0);
    /// assert!((enrichment.score() - 1.0).abs() < f64::EPSILON);
    /// ```
    pub fn calculate(sample_size: u64, pathway_size: u64, overlap: u64) -> Self {
        let binom = Binomial::from_counts(pathway_size, TOTAL_GENES_IN_GENOME, sample_size);
        let pvalue = binom.at_least(overlap);

        let expected = f64_from_u64(pathway_size) * f64_from_u64(sample_size)
            / f64_from_u64(TOTAL_GENES_IN_GENOME);
        let fold_enrichment = if expected > 0.0 {
            f64_from_u64(overlap) / expected
        } else {
            debug!(
                "No expected overlap for pathway size {} and sample size {}",
                pathway_size, sample_size
            );
            1.0
        };

        let score = (fold_enrichment * (1.0 - pvalue)).min(1.0);

        debug!(
            "Population: {}, Successes: {}, Draws: {}, Observed: {}, p: {:e}, fold: {}",
            TOTAL_GENES_IN_GENOME, pathway_size, sample_size, overlap, pvalue, fold_enrichment
        );

        Self {
            pvalue,
            fold_enrichment,
            score,
            overlap,
        }
    }

    /// Returns the p-value of the enrichment
    ///
    /// The p-value indicates the probability that the enrichment
    /// occured by chance
    pub fn pvalue(&self) -> f64 {
        self.pvalue
    }

    /// Returns the fold enrichment over the expected overlap
    pub fn fold_enrichment(&self) -> f64 {
        self.fold_enrichment
    }

    /// Returns the composite score `min(1, fold * (1 - p))`
    ///
    /// This is not a probability, only a heuristic to rank pathways
    /// by both effect size and confidence.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// The number of observed input genes used for the test
    pub fn overlap(&self) -> u64 {
        self.overlap
    }
}

/// Calculates the enrichment of every pathway within the `input_genes`
/// and annotates it with its canonical tags
///
/// - Pathways without a known gene count are assumed to have [`DEFAULT_PATHWAY_SIZE`] genes
/// - The overlap is the number of matched genes, but at least 1
///
/// The output has the same order as the input, it is not sorted. Use
/// [`rank`](`crate::rank()`) to sort by p-value.
///
/// # Examples
///
/// ```
/// use pathways::{merge, score, GeneList, PathwaySourceRecord};
///
/// let genes = GeneList::from_freetext("TP53").unwrap();
/// let merged = merge(vec![vec![
///     PathwaySourceRecord::new("hsa04115", "p53 signaling")
///         .with_pathway_gene_count(68)
///         .with_matched_genes(["TP53"]),
/// ]]);
///
/// let enriched = score(&genes, merged);
/// assert!((enriched[0].pvalue() - 68.0 / 20_000.0).abs() < 1e-12);
/// assert!(enriched[0].is_significant());
/// ```
pub fn score<I>(input_genes: &GeneList, pathways: I) -> Vec<EnrichedPathway>
where
    I: IntoIterator<Item = MergedPathway>,
{
    let sample_size = u64::try_from(input_genes.len()).unwrap_or(u64::MAX);
    pathways
        .into_iter()
        .map(|pathway| {
            let pathway_size = pathway
                .pathway_gene_count()
                .unwrap_or(DEFAULT_PATHWAY_SIZE);
            let overlap = u64::try_from(pathway.matched_gene_count())
                .unwrap_or(u64::MAX)
                .max(1);
            let enrichment = Enrichment::calculate(sample_size, pathway_size, overlap);
            let tags = classify(&pathway);
            EnrichedPathway::new(
                pathway,
                enrichment.pvalue(),
                enrichment.fold_enrichment(),
                enrichment.score(),
                tags,
            )
        })
        .collect()
}
