//! Stated/inferred reconciliation walkthrough.
//!
//! Builds a small dual-registry store for one disorder and walks the
//! graduated matching operations a reconciler would run against it:
//! exact lookup, specificity-tolerant lookup, group relocation by
//! content hash, and replacement numbering.
//!
//! Run with: cargo run --example reconcile -p concept-graph

use concept_graph::{
    ancestors, Characteristic, ConceptId, GraphStore, Relationship, Tolerance,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// SNOMED CT identifiers for the walkthrough.
const DISORDER: ConceptId = ConceptId(233_604_007); // |Pneumonia|
const CLINICAL_FINDING: ConceptId = ConceptId(404_684_003);
const FINDING_SITE: ConceptId = ConceptId(363_698_007);
const ASSOC_MORPHOLOGY: ConceptId = ConceptId(116_676_008);
const LUNG: ConceptId = ConceptId(39_607_008);
const LEFT_LUNG: ConceptId = ConceptId(44_029_006);
const BODY_STRUCTURE: ConceptId = ConceptId(123_037_004);
const INFLAMMATION: ConceptId = ConceptId(23_583_003);

const STATED: Characteristic = Characteristic::Stated;
const INFERRED: Characteristic = Characteristic::Inferred;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "concept_graph=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut store = GraphStore::new();
    load_inferred(&mut store);
    load_stated(&mut store);

    println!("── Registries ─────────────────────────────────────────────");
    for characteristic in [STATED, INFERRED] {
        let graph = store.graph(characteristic);
        println!(
            "  {} graph: {} concepts, {} relationships",
            characteristic,
            graph.concept_count(),
            graph.relationship_count()
        );
        let roots = store.check_single_root(characteristic);
        println!("  parentless concepts: {}", roots.len());
    }

    println!("\n── Hierarchy ──────────────────────────────────────────────");
    let closure = ancestors(store.graph(INFERRED), LEFT_LUNG).unwrap();
    println!("  ancestors of {}: {:?}", LEFT_LUNG, closure);

    println!("\n── Exact vs tolerant matching ─────────────────────────────");
    // The stated view says |Finding site| -> |Lung| in group 1; the
    // classifier narrowed the site to |Left lung|.
    let exact = store
        .find_by_triple_in_group(INFERRED, DISORDER, FINDING_SITE, LUNG, 1, Tolerance::exact())
        .unwrap();
    println!("  exact matches in inferred group 1: {}", exact.len());

    let tolerant = store
        .find_by_triple_in_group(
            INFERRED,
            DISORDER,
            FINDING_SITE,
            LUNG,
            1,
            Tolerance {
                child_of_destination: true,
                child_of_type: false,
            },
        )
        .unwrap();
    for relationship in &tolerant {
        println!("  destination-tolerant match: {}", relationship);
    }

    println!("\n── Group relocation by content hash ───────────────────────");
    // The classifier also renumbered the stated group; its content hash
    // finds it again regardless of the label.
    let stated_concept = store.concept(DISORDER, STATED).unwrap();
    let hash = stated_concept.triples_hash(1);
    println!("  stated group 1 hash: {}", hash);

    let reference = Relationship::new(DISORDER, LUNG, FINDING_SITE, 1, STATED);
    match store.find_equivalent_group(INFERRED, DISORDER, &hash, &reference) {
        Ok(matches) => {
            for relationship in &matches {
                println!("  relocated to: {}", relationship);
            }
        }
        Err(error) => println!("  no equivalent group: {}", error),
    }

    println!("\n── Replacement numbering ──────────────────────────────────");
    let first = store.next_replacement_number(DISORDER, STATED).unwrap();
    let second = store.next_replacement_number(DISORDER, STATED).unwrap();
    println!("  minted replacement numbers: {}, {}", first, second);
}

/// Classifier output: narrowed finding site, renumbered morphology group.
fn load_inferred(store: &mut GraphStore) {
    store.register_relationship(Relationship::isa(DISORDER, CLINICAL_FINDING, INFERRED));
    store.register_relationship(Relationship::isa(LUNG, BODY_STRUCTURE, INFERRED));
    store.register_relationship(Relationship::isa(LEFT_LUNG, LUNG, INFERRED));

    store.register_relationship(Relationship::new(
        DISORDER,
        LEFT_LUNG,
        FINDING_SITE,
        1,
        INFERRED,
    ));
    store.register_relationship(Relationship::new(
        DISORDER,
        INFLAMMATION,
        ASSOC_MORPHOLOGY,
        1,
        INFERRED,
    ));

    // The stated group's exact content, under a different number.
    store.register_relationship(Relationship::new(DISORDER, LUNG, FINDING_SITE, 2, INFERRED));
    store.register_relationship(Relationship::new(
        DISORDER,
        INFLAMMATION,
        ASSOC_MORPHOLOGY,
        2,
        INFERRED,
    ));
}

/// Authored view of the same disorder.
fn load_stated(store: &mut GraphStore) {
    store.register_relationship(Relationship::isa(DISORDER, CLINICAL_FINDING, STATED));
    store.register_relationship(Relationship::new(DISORDER, LUNG, FINDING_SITE, 1, STATED));
    store.register_relationship(Relationship::new(
        DISORDER,
        INFLAMMATION,
        ASSOC_MORPHOLOGY,
        1,
        STATED,
    ));
}
