//! Concept Graph - terminology graph matching and reconciliation.
//!
//! This crate provides:
//! - Dual stated/inferred concept registries with lazy concept creation
//! - Bounded, cycle-safe ancestor traversal over `|Is a|` hierarchies
//! - Graduated relationship matching (exact through specificity-tolerant)
//! - Content-hash identification of relationship groups across renumbering
//!
//! # Example
//!
//! ```
//! use concept_graph::{Characteristic, ConceptId, GraphStore, Relationship};
//!
//! let mut store = GraphStore::new();
//! let disorder = ConceptId(233_604_007);
//! let finding_site = ConceptId(363_698_007);
//! let lung = ConceptId(39_607_008);
//!
//! store.register_relationship(Relationship::new(
//!     disorder,
//!     lung,
//!     finding_site,
//!     1,
//!     Characteristic::Inferred,
//! ));
//!
//! let matches = store.find_by_type(Characteristic::Inferred, disorder, finding_site);
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].destination, lung);
//! ```

pub mod ontology;
pub mod graph;
pub mod traversal;
pub mod matching;
pub mod hashing;

pub use graph::{Concept, ConceptGraph, GraphError, GraphStore, Result, DEFAULT_ANCESTOR_LIMIT};
pub use hashing::{group_content_hash, GroupHash};
pub use matching::Tolerance;
pub use ontology::{Characteristic, ConceptId, Relationship, IS_A};
pub use traversal::{ancestors, has_ancestor};
