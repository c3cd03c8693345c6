//! Gene symbols and ordered sets of genes
use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt::Display;

use serde::Serialize;

use crate::{PathwayError, PathwayResult};

/// The symbol of a protein coding gene, e.g. `TP53`
///
/// Symbols are compared exactly as received, there is no
/// normalization of case or whitespace.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GeneSymbol {
    inner: String,
}

impl GeneSymbol {
    /// Constructs a new `GeneSymbol`
    pub fn new<S: Into<String>>(symbol: S) -> Self {
        Self {
            inner: symbol.into(),
        }
    }

    /// The symbol as `&str`
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl From<&str> for GeneSymbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for GeneSymbol {
    fn from(inner: String) -> Self {
        Self { inner }
    }
}

impl PartialEq<str> for GeneSymbol {
    fn eq(&self, other: &str) -> bool {
        self.inner == other
    }
}

impl PartialEq<&str> for GeneSymbol {
    fn eq(&self, other: &&str) -> bool {
        self.inner == *other
    }
}

impl Borrow<str> for GeneSymbol {
    fn borrow(&self) -> &str {
        &self.inner
    }
}

impl Display for GeneSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// An ordered set of [`GeneSymbol`]s
///
/// Each symbol occurs only once. Unlike a `HashSet`, the set keeps the order
/// in which symbols were first inserted, so that merged pathway records
/// list their genes deterministically. Lookups use a hash index.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Genes {
    symbols: Vec<GeneSymbol>,
    #[serde(skip)]
    index: HashSet<GeneSymbol>,
}

impl Genes {
    /// Constructs a new, empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the set contains no genes
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Returns the number of genes in the set
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Adds a gene to the end of the set
    ///
    /// Returns whether the gene was newly inserted. That is:
    ///
    /// - If the set did not previously contain this gene, true is returned.
    /// - If the set already contained this gene, false is returned.
    pub fn insert<G: Into<GeneSymbol>>(&mut self, gene: G) -> bool {
        let gene = gene.into();
        if self.index.contains(&gene) {
            false
        } else {
            self.index.insert(gene.clone());
            self.symbols.push(gene);
            true
        }
    }

    /// Adds all genes of `other` that are not yet present
    ///
    /// Returns the number of newly inserted genes
    pub fn union(&mut self, other: &Genes) -> usize {
        let mut added = 0;
        for gene in other {
            if !self.contains(gene.as_str()) {
                self.insert(gene.clone());
                added += 1;
            }
        }
        added
    }

    /// Returns `true` if the set contains the gene
    pub fn contains(&self, gene: &str) -> bool {
        self.index.contains(gene)
    }

    /// Returns an iterator of the genes in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, GeneSymbol> {
        self.symbols.iter()
    }
}

impl<G: Into<GeneSymbol>> FromIterator<G> for Genes {
    fn from_iter<T: IntoIterator<Item = G>>(iter: T) -> Self {
        let mut genes = Genes::new();
        for gene in iter {
            genes.insert(gene);
        }
        genes
    }
}

impl<'a> IntoIterator for &'a Genes {
    type Item = &'a GeneSymbol;
    type IntoIter = std::slice::Iter<'a, GeneSymbol>;
    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

/// The input genes of an enrichment analysis
///
/// # Examples
///
/// ```
/// use pathways::GeneList;
///
/// let genes = GeneList::from_freetext("tp53, BRCA1,, EGFR ,TP53").unwrap();
/// assert_eq!(genes.len(), 3);
/// assert_eq!(genes.iter().next().unwrap(), "TP53");
///
/// assert!(GeneList::from_freetext(" , ").is_err());
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeneList {
    genes: Genes,
}

impl GeneList {
    /// Parses a comma separated list of gene symbols
    ///
    /// Symbols are trimmed and upper-cased, empty items and duplicates are removed.
    ///
    /// # Errors
    ///
    /// Returns [`PathwayError::InvalidInput`] if the text does not contain any symbol
    pub fn from_freetext(text: &str) -> PathwayResult<Self> {
        let genes: Genes = text
            .split(',')
            .map(str::trim)
            .filter(|symbol| !symbol.is_empty())
            .map(str::to_uppercase)
            .collect();
        if genes.is_empty() {
            return Err(PathwayError::InvalidInput(format!(
                "no gene symbols in '{text}'"
            )));
        }
        Ok(Self { genes })
    }

    /// Returns `true` if the list contains no genes
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// The number of genes, the sample size of the enrichment
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Returns `true` if the gene is part of the list
    pub fn contains(&self, gene: &str) -> bool {
        self.genes.contains(gene)
    }

    /// Returns an iterator of all genes
    pub fn iter(&self) -> std::slice::Iter<'_, GeneSymbol> {
        self.genes.iter()
    }

    /// The genes as [`Genes`] set
    pub fn genes(&self) -> &Genes {
        &self.genes
    }
}

impl<G: Into<GeneSymbol>> FromIterator<G> for GeneList {
    fn from_iter<T: IntoIterator<Item = G>>(iter: T) -> Self {
        Self {
            genes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a GeneList {
    type Item = &'a GeneSymbol;
    type IntoIter = std::slice::Iter<'a, GeneSymbol>;
    fn into_iter(self) -> Self::IntoIter {
        self.genes.iter()
    }
}
