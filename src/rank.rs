//! Sorting, filtering and summarizing enriched pathways
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::Serialize;

use crate::pathway::EnrichedPathway;
use crate::{f64_from_usize, MAX_RESULTS, SIGNIFICANCE_THRESHOLD};

/// Category used for pathways that do not specify one
pub const DEFAULT_CATEGORY: &str = "Other";

/// The maximum number of pathway names listed in a [`CategorySummary`]
pub const MAX_TOP_PATHWAYS: usize = 3;

/// Sorts pathways by p-value and keeps the [`MAX_RESULTS`] most significant
///
/// The sort is stable, pathways with the same p-value keep their relative order.
///
/// # Examples
///
/// ```
/// use pathways::{merge, rank, score, GeneList, PathwaySourceRecord};
///
/// let genes = GeneList::from_freetext("TP53, MDM2, BAX").unwrap();
/// let merged = merge(vec![vec![
///     PathwaySourceRecord::new("hsa04210", "Apoptosis")
///         .with_pathway_gene_count(136)
///         .with_matched_genes(["BAX"]),
///     PathwaySourceRecord::new("hsa04115", "p53 signaling pathway")
///         .with_pathway_gene_count(68)
///         .with_matched_genes(["TP53", "MDM2"]),
/// ]]);
///
/// let ranked = rank(score(&genes, merged));
/// assert_eq!(ranked[0].name(), "p53 signaling pathway");
/// ```
pub fn rank(mut enriched: Vec<EnrichedPathway>) -> Vec<EnrichedPathway> {
    enriched.sort_by(|a, b| {
        a.pvalue()
            .partial_cmp(&b.pvalue())
            .unwrap_or(Ordering::Equal)
    });
    enriched.truncate(MAX_RESULTS);
    enriched
}

/// Returns all pathways with a p-value below `threshold`
///
/// If no threshold is given, [`SIGNIFICANCE_THRESHOLD`] is used.
///
/// # Examples
///
/// ```
/// use pathways::{filter_significant, merge, score, GeneList, PathwaySourceRecord};
///
/// let genes = GeneList::from_freetext("TP53, MDM2").unwrap();
/// let enriched = score(&genes, merge(vec![vec![
///     PathwaySourceRecord::new("hsa04115", "p53 signaling pathway")
///         .with_pathway_gene_count(68)
///         .with_matched_genes(["TP53", "MDM2"]),
///     PathwaySourceRecord::new("hsa01100", "Metabolic pathways")
///         .with_pathway_gene_count(1500)
///         .with_matched_genes(["MDM2"]),
/// ]]));
///
/// assert_eq!(filter_significant(&enriched, None).len(), 1);
/// assert_eq!(filter_significant(&enriched, 1.0).len(), 2);
/// ```
pub fn filter_significant<T: Into<Option<f64>>>(
    pathways: &[EnrichedPathway],
    threshold: T,
) -> Vec<&EnrichedPathway> {
    let threshold = threshold.into().unwrap_or(SIGNIFICANCE_THRESHOLD);
    pathways
        .iter()
        .filter(|pathway| pathway.pvalue() < threshold)
        .collect()
}

/// Aggregated statistics of all pathways in one category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    category: String,
    pathway_count: usize,
    average_p_value: f64,
    top_pathway_names: Vec<String>,
}

impl CategorySummary {
    fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            pathway_count: 0,
            average_p_value: 0.0,
            top_pathway_names: Vec::with_capacity(MAX_TOP_PATHWAYS),
        }
    }

    /// The name of the category
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The number of pathways in the category
    pub fn pathway_count(&self) -> usize {
        self.pathway_count
    }

    /// The arithmetic mean of the p-values of all pathways in the category
    pub fn average_p_value(&self) -> f64 {
        self.average_p_value
    }

    /// The names of the first (up to 3) pathways of the category
    pub fn top_pathway_names(&self) -> &[String] {
        &self.top_pathway_names
    }
}

/// Groups pathways by category and sorts the categories by average p-value
///
/// Pathways without category are grouped as [`DEFAULT_CATEGORY`]. The top
/// pathway names follow the order of `ranked`, which should already be sorted
/// by [`rank`]. Categories with the same average p-value keep the order in
/// which they first appear in `ranked`.
///
/// # Examples
///
/// ```
/// use pathways::{merge, rank, score, summarize_by_category, GeneList, PathwaySourceRecord};
///
/// let genes = GeneList::from_freetext("TP53, MDM2, BAX").unwrap();
/// let ranked = rank(score(&genes, merge(vec![vec![
///     PathwaySourceRecord::new("hsa04210", "Apoptosis")
///         .with_category("Cellular Processes")
///         .with_matched_genes(["BAX"]),
///     PathwaySourceRecord::new("hsa04115", "p53 signaling pathway")
///         .with_category("Cellular Processes")
///         .with_matched_genes(["TP53", "MDM2"]),
///     PathwaySourceRecord::new("WP1", "Unsorted")
///         .with_matched_genes(["BAX"]),
/// ]])));
///
/// let summary = summarize_by_category(&ranked);
/// assert_eq!(summary.len(), 2);
/// assert_eq!(summary[0].category(), "Cellular Processes");
/// assert_eq!(summary[0].pathway_count(), 2);
/// assert_eq!(summary[0].top_pathway_names()[0], "p53 signaling pathway");
/// assert_eq!(summary[1].category(), "Other");
/// ```
pub fn summarize_by_category(ranked: &[EnrichedPathway]) -> Vec<CategorySummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<CategorySummary> = Vec::new();
    let mut pvalue_sums: Vec<f64> = Vec::new();

    for pathway in ranked {
        let category = pathway
            .category()
            .filter(|category| !category.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);

        let idx = match index.entry(category) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                summaries.push(CategorySummary::new(category));
                pvalue_sums.push(0.0);
                *entry.insert(summaries.len() - 1)
            }
        };

        let summary = &mut summaries[idx];
        summary.pathway_count += 1;
        pvalue_sums[idx] += pathway.pvalue();
        if summary.top_pathway_names.len() < MAX_TOP_PATHWAYS {
            summary.top_pathway_names.push(pathway.name().to_string());
        }
    }

    for (summary, sum) in summaries.iter_mut().zip(pvalue_sums) {
        summary.average_p_value = sum / f64_from_usize(summary.pathway_count);
    }

    summaries.sort_by(|a, b| {
        a.average_p_value
            .partial_cmp(&b.average_p_value)
            .unwrap_or(Ordering::Equal)
    });
    summaries
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pathway::PathwaySourceRecord;
    use crate::merge;

    /// Builds enriched pathways with fixed p-values
    fn pathways(items: &[(&str, Option<&str>, f64)]) -> Vec<EnrichedPathway> {
        let merged = merge(vec![items
            .iter()
            .map(|(name, category, _)| {
                let record = PathwaySourceRecord::named(name);
                match category {
                    Some(category) => record.with_category(category),
                    None => record,
                }
            })
            .collect::<Vec<_>>()]);
        merged
            .into_iter()
            .zip(items)
            .map(|(pathway, (_, _, pvalue))| {
                EnrichedPathway::new(pathway, *pvalue, 1.0, 0.5, Default::default())
            })
            .collect()
    }

    fn names(pathways: &[EnrichedPathway]) -> Vec<&str> {
        pathways.iter().map(EnrichedPathway::name).collect()
    }

    #[test]
    fn rank_sorts_ascending() {
        let ranked = rank(pathways(&[
            ("a", None, 0.3),
            ("b", None, 0.001),
            ("c", None, 0.04),
        ]));
        assert_eq!(names(&ranked), vec!["b", "c", "a"]);
    }

    #[test]
    fn rank_is_stable() {
        let ranked = rank(pathways(&[
            ("a", None, 0.2),
            ("b", None, 0.01),
            ("c", None, 0.2),
            ("d", None, 0.01),
        ]));
        assert_eq!(names(&ranked), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn rank_truncates() {
        let items: Vec<(String, f64)> = (0..30)
            .map(|i| (format!("pathway {i}"), f64::from(30 - i) / 100.0))
            .collect();
        let input: Vec<(&str, Option<&str>, f64)> = items
            .iter()
            .map(|(name, pvalue)| (name.as_str(), None, *pvalue))
            .collect();
        let ranked = rank(pathways(&input));
        assert_eq!(ranked.len(), MAX_RESULTS);
        assert_eq!(ranked[0].name(), "pathway 29");
        assert_eq!(ranked[19].name(), "pathway 10");
    }

    #[test]
    fn rank_empty() {
        assert!(rank(Vec::new()).is_empty());
    }

    #[test]
    fn filter() {
        let enriched = pathways(&[
            ("a", None, 0.01),
            ("b", None, 0.05),
            ("c", None, 0.049),
            ("d", None, 1.0),
        ]);
        assert_eq!(names_ref(&filter_significant(&enriched, 0.05)), vec!["a", "c"]);
        assert_eq!(names_ref(&filter_significant(&enriched, None)), vec!["a", "c"]);
        assert_eq!(filter_significant(&enriched, 1.0).len(), 3);
        assert_eq!(filter_significant(&enriched, 1.01).len(), 4);
        assert!(filter_significant(&enriched, 0.0).is_empty());
        assert_eq!(enriched.len(), 4);
    }

    fn names_ref<'a>(pathways: &[&'a EnrichedPathway]) -> Vec<&'a str> {
        pathways.iter().map(|p| p.name()).collect()
    }

    #[test]
    fn summary_tie_keeps_first_seen_category() {
        let enriched = pathways(&[
            ("a1", Some("A"), 0.01),
            ("a2", Some("A"), 0.03),
            ("b1", Some("B"), 0.02),
        ]);
        let summary = summarize_by_category(&enriched);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].category(), "A");
        assert_eq!(summary[0].pathway_count(), 2);
        assert!((summary[0].average_p_value() - 0.02).abs() < 1e-15);
        assert_eq!(summary[1].category(), "B");
        assert_eq!(summary[1].pathway_count(), 1);
        assert!((summary[1].average_p_value() - 0.02).abs() < 1e-15);
    }

    #[test]
    fn summary_sorted_by_average() {
        let enriched = pathways(&[
            ("a1", Some("A"), 0.2),
            ("b1", Some("B"), 0.01),
            ("c1", None, 0.001),
            ("c2", Some(""), 0.003),
        ]);
        let summary = summarize_by_category(&enriched);
        let categories: Vec<&str> = summary.iter().map(CategorySummary::category).collect();
        assert_eq!(categories, vec!["Other", "B", "A"]);
        assert_eq!(summary[0].pathway_count(), 2);
        assert!((summary[0].average_p_value() - 0.002).abs() < 1e-12);
    }

    #[test]
    fn summary_top_names() {
        let enriched = pathways(&[
            ("a1", Some("A"), 0.01),
            ("b1", Some("B"), 0.01),
            ("a2", Some("A"), 0.02),
            ("a3", Some("A"), 0.03),
            ("a4", Some("A"), 0.04),
        ]);
        let summary = summarize_by_category(&enriched);
        let a = summary.iter().find(|s| s.category() == "A").unwrap();
        assert_eq!(a.pathway_count(), 4);
        assert_eq!(a.top_pathway_names(), &["a1", "a2", "a3"]);
    }

    #[test]
    fn summary_empty() {
        assert!(summarize_by_category(&[]).is_empty());
    }

    #[test]
    fn serialize_summary() {
        let summary = summarize_by_category(&pathways(&[("a1", Some("A"), 0.5)]));
        let json = serde_json::to_value(&summary[0]).unwrap();
        assert_eq!(json["category"], "A");
        assert_eq!(json["pathwayCount"], 1);
        assert_eq!(json["topPathwayNames"][0], "a1");
    }
}
