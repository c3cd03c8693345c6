//! Canonical tags derived from the free text metadata of pathways
//!
//! Pathway databases use different names for the same biological theme,
//! e.g. `Programmed cell death` (Reactome) and `Apoptosis` (KEGG).
//! [`classify`] maps name, description and category of a pathway to a set of
//! canonical tags using the fixed rule table [`TAG_RULES`].
use std::sync::LazyLock;

use regex::Regex;
use serde::ser::{Serialize, Serializer};
use smallvec::SmallVec;
use tracing::warn;

/// Pathway records that can be classified into canonical tags
pub trait Classify {
    /// The name of the pathway
    fn name(&self) -> &str;
    /// The free text description of the pathway
    fn description(&self) -> &str;
    /// The category of the pathway, if known
    fn category(&self) -> Option<&str>;
}

/// A canonical tag and the regular expressions that indicate it
///
/// Patterns are matched against the lower-cased pathway text. Short
/// abbreviations are anchored with `\b`, so that e.g. `akt` does not
/// match inside an unrelated word.
#[derive(Debug, Clone, Copy)]
pub struct TagRule {
    /// The canonical tag
    pub tag: &'static str,
    /// Lower-case regular expressions, any match assigns the tag
    pub patterns: &'static [&'static str],
}

impl TagRule {
    /// Compiles all patterns into one alternation
    ///
    /// Returns `None` if a pattern is not a valid regular expression
    pub fn compile(&self) -> Option<Regex> {
        let alternation = self
            .patterns
            .iter()
            .map(|pattern| format!("(?:{pattern})"))
            .collect::<Vec<_>>()
            .join("|");
        match Regex::new(&alternation) {
            Ok(regex) => Some(regex),
            Err(err) => {
                warn!("Invalid pattern for tag {}: {}", self.tag, err);
                None
            }
        }
    }
}

/// The tag that is always assigned to pathways in a `metabolism` category
pub const METABOLIC_TAG: &str = "metabolic";

/// All canonical tags and their patterns
///
/// Every rule is evaluated, a pathway can receive multiple tags.
pub const TAG_RULES: &[TagRule] = &[
    TagRule {
        tag: "dna repair",
        patterns: &[
            r"dna repair",
            r"mismatch repair",
            r"base excision",
            r"nucleotide excision",
            r"homologous recombination",
            r"double[- ]strand break",
            r"fanconi",
        ],
    },
    TagRule {
        tag: "cell cycle",
        patterns: &[
            r"cell cycle",
            r"\bmitotic",
            r"\bmitosis",
            r"\bg1/s\b",
            r"\bg2/m\b",
            r"\bcyclin",
        ],
    },
    TagRule {
        tag: "p53",
        patterns: &[r"\bt?p53\b"],
    },
    TagRule {
        tag: "apoptosis",
        patterns: &[
            r"apoptosis",
            r"apoptotic",
            r"programmed cell death",
            r"\bcaspase",
        ],
    },
    TagRule {
        tag: "immune",
        patterns: &[
            r"immune",
            r"immunity",
            r"\bt[- ]cell",
            r"\bb[- ]cell",
            r"\bantigen",
            r"\binterferon",
            r"\btoll[- ]like",
            r"\bcytokine",
        ],
    },
    TagRule {
        tag: "inflammation",
        patterns: &[
            r"inflamma",
            r"\bnf-kappa",
            r"\bnf-kb\b",
            r"\btnf",
            r"\binterleukin",
        ],
    },
    TagRule {
        tag: "metabolic",
        patterns: &[
            r"metabolism",
            r"metabolic",
            r"glycolysis",
            r"gluconeogenesis",
            r"lipid",
            r"fatty acid",
            r"biosynthesis",
        ],
    },
    TagRule {
        tag: "mitochondrial",
        patterns: &[
            r"mitochondri",
            r"oxidative phosphorylation",
            r"respiratory chain",
            r"electron transport",
        ],
    },
    TagRule {
        tag: "autophagy",
        patterns: &[r"autophagy", r"mitophagy", r"\blysosom"],
    },
    TagRule {
        tag: "synaptic",
        patterns: &[
            r"synap",
            r"neurotransmitter",
            r"\bglutamat",
            r"\bgaba",
            r"\bdopamin",
        ],
    },
    TagRule {
        tag: "amyloid",
        patterns: &[r"amyloid", r"alzheimer", r"\bapp processing"],
    },
    TagRule {
        tag: "tau",
        patterns: &[
            r"\btau protein",
            r"\btauopath",
            r"\bmapt\b",
            r"neurofibrillary",
        ],
    },
    TagRule {
        tag: "synuclein",
        patterns: &[r"synuclein", r"\bsnca\b", r"parkinson", r"\blewy bod"],
    },
    TagRule {
        tag: "epigenetic",
        patterns: &[
            r"epigenetic",
            r"chromatin",
            r"\bhistone",
            r"dna methylation",
            r"acetylation",
        ],
    },
    TagRule {
        tag: "angiogenesis",
        patterns: &[
            r"angiogenesis",
            r"\bvegf",
            r"vascular endothelial",
            r"\bhypoxi",
        ],
    },
    TagRule {
        tag: "growth factor",
        patterns: &[
            r"growth factor",
            r"\begfr\b",
            r"\berbb",
            r"\bfgfr?\d*\b",
            r"\bpdgf",
            r"\bigf",
        ],
    },
    TagRule {
        tag: "pi3k-akt",
        patterns: &[r"\bpi3k\b", r"\bakt\d?\b", r"\bmtor", r"phosphatidylinositol 3"],
    },
    TagRule {
        tag: "ras-mapk",
        patterns: &[
            r"\bras signaling",
            r"\bras pathway",
            r"\bmapk",
            r"\berk1/2\b",
            r"\berk signaling",
            r"\bbraf\b",
            r"\braf/mek\b",
            r"\bmek/erk\b",
        ],
    },
];

/// [`TAG_RULES`] with their compiled patterns, built on first use
static COMPILED_RULES: LazyLock<Vec<(&'static str, Option<Regex>)>> = LazyLock::new(|| {
    TAG_RULES
        .iter()
        .map(|rule| (rule.tag, rule.compile()))
        .collect()
});

/// A set of canonical tags
///
/// Each tag occurs only once, iteration follows insertion order
/// which is the order of [`TAG_RULES`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagSet {
    tags: SmallVec<[&'static str; 8]>,
}

impl TagSet {
    /// Constructs a new, empty `TagSet`
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag to the set
    ///
    /// Returns whether the tag was newly inserted
    pub fn insert(&mut self, tag: &'static str) -> bool {
        if self.contains(tag) {
            false
        } else {
            self.tags.push(tag);
            true
        }
    }

    /// Returns `true` if the set contains the tag
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| *t == tag)
    }

    /// Returns the number of tags
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if the set contains no tags
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterates the tags in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tags.iter().copied()
    }
}

impl Serialize for TagSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.tags.iter())
    }
}

/// Derives the canonical tags of a pathway
///
/// Name, description and category are joined and lower-cased. Each rule of
/// [`TAG_RULES`] whose patterns occur in the text adds its tag. Pathways
/// in a category containing `metabolism` are always tagged as [`METABOLIC_TAG`].
///
/// # Examples
///
/// ```
/// use pathways::{classify, PathwaySourceRecord};
///
/// let record = PathwaySourceRecord::named("Genome maintenance")
///     .with_description("DNA repair and apoptosis pathway");
///
/// let tags = classify(&record);
/// assert!(tags.contains("dna repair"));
/// assert!(tags.contains("apoptosis"));
/// assert_eq!(tags.len(), 2);
/// ```
pub fn classify<C: Classify + ?Sized>(pathway: &C) -> TagSet {
    let category = pathway.category().unwrap_or_default();
    let text = format!(
        "{} {} {}",
        pathway.name(),
        pathway.description(),
        category
    )
    .to_lowercase();

    let mut tags = TagSet::new();
    for (tag, regex) in COMPILED_RULES.iter() {
        if regex.as_ref().is_some_and(|regex| regex.is_match(&text)) {
            tags.insert(*tag);
        }
    }

    if category.to_lowercase().contains("metabolism") {
        tags.insert(METABOLIC_TAG);
    }
    tags
}
