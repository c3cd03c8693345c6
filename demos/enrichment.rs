//! Runs a pathway enrichment against two offline sources
//!
//! ```bash
//! RUST_LOG=debug cargo run --example enrichment -- "TP53, MDM2, CDKN1A, BAX"
//! ```
use std::process;

use pathways::{Enricher, GeneList, PathwaySourceRecord, StaticSource};
use tracing_subscriber::EnvFilter;

fn kegg() -> StaticSource {
    StaticSource::new(
        "KEGG",
        vec![
            PathwaySourceRecord::new("hsa04115", "p53 signaling pathway")
                .with_category("Cellular Processes")
                .with_pathway_gene_count(73)
                .with_matched_genes(["TP53", "MDM2", "CDKN1A", "BAX", "ATM", "CHEK2"]),
            PathwaySourceRecord::new("hsa04210", "Apoptosis")
                .with_category("Cellular Processes")
                .with_pathway_gene_count(136)
                .with_matched_genes(["TP53", "BAX", "BCL2", "CASP3", "CASP9"]),
            PathwaySourceRecord::new("hsa04110", "Cell cycle")
                .with_category("Cellular Processes")
                .with_pathway_gene_count(157)
                .with_matched_genes(["TP53", "MDM2", "CDKN1A", "CDK2", "CCND1"]),
            PathwaySourceRecord::new("hsa00010", "Glycolysis / Gluconeogenesis")
                .with_category("Carbohydrate metabolism")
                .with_pathway_gene_count(67)
                .with_matched_genes(["HK2", "PKM", "LDHA"]),
        ],
    )
}

fn reactome() -> StaticSource {
    StaticSource::new(
        "Reactome",
        vec![
            PathwaySourceRecord::new("hsa04115", "TP53 regulates transcription")
                .with_category("Gene expression")
                .with_pathway_gene_count(80)
                .with_matched_genes(["TP53", "MDM2", "PMAIP1", "BBC3"]),
            PathwaySourceRecord::new("R-HSA-5693532", "DNA Double-Strand Break Repair")
                .with_category("DNA Repair")
                .with_pathway_gene_count(170)
                .with_matched_genes(["ATM", "BRCA1", "CHEK2", "TP53BP1"]),
            PathwaySourceRecord::named("Intrinsic Pathway for Apoptosis")
                .with_category("Programmed Cell Death")
                .with_matched_genes(["BAX", "BCL2", "CASP9"]),
        ],
    )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let Some(input) = std::env::args().nth(1) else {
        println!("Run enrichment of a comma separated gene list\n\n");
        println!("Usage:\ncargo run --example enrichment -- <GENES>");
        println!("e.g.:\ncargo run --example enrichment -- \"TP53, MDM2, BAX\"\n");
        process::exit(1)
    };

    let genes = match GeneList::from_freetext(&input) {
        Ok(genes) => genes,
        Err(err) => {
            println!("{err}");
            process::exit(1)
        }
    };

    let enricher = Enricher::builder()
        .source(kegg())
        .source(reactome())
        .build();

    let report = enricher.report(&genes);
    println!("{report}");

    for pathway in report.pathways() {
        println!(
            "{}\t{:e}\t{:.2}\t{}\t[{}]",
            pathway.name(),
            pathway.pvalue(),
            pathway.fold_enrichment(),
            pathway.source(),
            pathway.canonical_tags().iter().collect::<Vec<_>>().join(", ")
        );
    }
}
