//! Terminology graph storage and registration.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::hashing::{self, GroupHash};
use crate::ontology::{Characteristic, ConceptId, Relationship};

/// Error types for terminology graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Concept not found: {0}")]
    ConceptNotFound(ConceptId),

    #[error("Ancestor closure of {concept} exceeded the limit of {limit}")]
    AncestorLimitExceeded { concept: ConceptId, limit: usize },

    #[error("No group with a matching content hash")]
    NoEquivalentGroup,
}

pub type Result<T> = std::result::Result<T, GraphError>;

/// Default bound on the size of a single concept's ancestor closure.
pub const DEFAULT_ANCESTOR_LIMIT: usize = 500;

/// A concept node in one characteristic's registry.
///
/// Holds the parent set derived from `|Is a|` facts and the full attribute
/// list (every registered fact with this concept as source), kept sorted
/// by group, then type, then destination.
#[derive(Debug, Clone)]
pub struct Concept {
    id: ConceptId,
    parents: BTreeSet<ConceptId>,
    attributes: Vec<Relationship>,
    max_group: u32,
    replacement_seq: u32,
}

impl Concept {
    fn new(id: ConceptId) -> Self {
        Self {
            id,
            parents: BTreeSet::new(),
            attributes: Vec::new(),
            max_group: 0,
            replacement_seq: 0,
        }
    }

    /// The concept's SCTID.
    pub fn id(&self) -> ConceptId {
        self.id
    }

    /// Direct parents from `|Is a|` facts, in id order.
    pub fn parents(&self) -> &BTreeSet<ConceptId> {
        &self.parents
    }

    /// All facts with this concept as source, in attribute order.
    pub fn attributes(&self) -> &[Relationship] {
        &self.attributes
    }

    /// Highest role group number seen on any attribute.
    pub fn max_group(&self) -> u32 {
        self.max_group
    }

    /// True if any attribute is flagged for or as a replacement.
    pub fn has_replacement_activity(&self) -> bool {
        self.attributes
            .iter()
            .any(|r| r.needs_replacement || r.is_replacement)
    }

    /// Content identity of one role group, over members in attribute order.
    pub fn triples_hash(&self, group: u32) -> GroupHash {
        hashing::group_content_hash(self.attributes.iter().filter(|r| r.in_group(group)))
    }

    fn add_attribute(&mut self, relationship: Relationship) {
        // Ceiling update first; it is not gated on the insert happening.
        if relationship.group > self.max_group {
            self.max_group = relationship.group;
        }
        if let Err(position) = self.attributes.binary_search(&relationship) {
            self.attributes.insert(position, relationship);
        }
    }
}

impl PartialEq for Concept {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Concept {}

impl PartialOrd for Concept {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Concept {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)?;
        if self.has_replacement_activity() {
            write!(f, " *")?;
        }
        Ok(())
    }
}

/// One characteristic's registry: concepts in registration order plus an
/// id index.
#[derive(Debug, Clone)]
pub struct ConceptGraph {
    characteristic: Characteristic,
    concepts: Vec<Concept>,
    by_id: HashMap<ConceptId, usize>,
    ancestor_limit: usize,
}

impl ConceptGraph {
    fn new(characteristic: Characteristic, ancestor_limit: usize) -> Self {
        Self {
            characteristic,
            concepts: Vec::new(),
            by_id: HashMap::new(),
            ancestor_limit,
        }
    }

    /// Which view this registry holds.
    pub fn characteristic(&self) -> Characteristic {
        self.characteristic
    }

    /// Bound applied to ancestor traversals over this registry.
    pub fn ancestor_limit(&self) -> usize {
        self.ancestor_limit
    }

    /// Look up a concept by id.
    pub fn concept(&self, id: ConceptId) -> Option<&Concept> {
        self.by_id.get(&id).map(|&index| &self.concepts[index])
    }

    /// Iterate concepts in registration order.
    pub fn concepts(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.iter()
    }

    /// Number of concepts in this registry.
    pub fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    /// Number of distinct facts in this registry.
    pub fn relationship_count(&self) -> usize {
        self.concepts.iter().map(|c| c.attributes.len()).sum()
    }

    /// True if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    fn concept_mut(&mut self, id: ConceptId) -> Option<&mut Concept> {
        self.by_id.get(&id).map(|&index| &mut self.concepts[index])
    }

    fn intern(&mut self, id: ConceptId) -> usize {
        if let Some(&index) = self.by_id.get(&id) {
            return index;
        }
        let index = self.concepts.len();
        self.concepts.push(Concept::new(id));
        self.by_id.insert(id, index);
        index
    }

    fn register(&mut self, relationship: Relationship) {
        let source_index = self.intern(relationship.source);
        self.intern(relationship.destination);
        if relationship.is_isa() {
            self.concepts[source_index]
                .parents
                .insert(relationship.destination);
        }
        self.concepts[source_index].add_attribute(relationship);
    }
}

/// Dual-registry store holding the stated and inferred graphs.
///
/// Concepts are created lazily on first reference: registering a fact
/// interns both its source and destination in the fact's own registry.
/// Relationship types are never interned by themselves; a type concept
/// exists only once some fact names it as source or destination.
#[derive(Debug, Clone)]
pub struct GraphStore {
    stated: ConceptGraph,
    inferred: ConceptGraph,
}

impl GraphStore {
    /// Create an empty store with the default ancestor limit.
    pub fn new() -> Self {
        Self::with_ancestor_limit(DEFAULT_ANCESTOR_LIMIT)
    }

    /// Create an empty store with an explicit ancestor limit.
    pub fn with_ancestor_limit(limit: usize) -> Self {
        Self {
            stated: ConceptGraph::new(Characteristic::Stated, limit),
            inferred: ConceptGraph::new(Characteristic::Inferred, limit),
        }
    }

    /// The registry for one characteristic.
    pub fn graph(&self, characteristic: Characteristic) -> &ConceptGraph {
        match characteristic {
            Characteristic::Stated => &self.stated,
            Characteristic::Inferred => &self.inferred,
        }
    }

    fn graph_mut(&mut self, characteristic: Characteristic) -> &mut ConceptGraph {
        match characteristic {
            Characteristic::Stated => &mut self.stated,
            Characteristic::Inferred => &mut self.inferred,
        }
    }

    /// Register a fact in the registry named by its characteristic.
    ///
    /// Source and destination concepts are interned on first reference.
    /// An `|Is a|` fact also records the destination in the source's
    /// parent set. A fact whose identity tuple is already present is
    /// dropped; the stored copy keeps its original flags.
    pub fn register_relationship(&mut self, relationship: Relationship) {
        self.graph_mut(relationship.characteristic)
            .register(relationship);
    }

    /// Look up a concept in one registry.
    pub fn concept(&self, id: ConceptId, characteristic: Characteristic) -> Option<&Concept> {
        self.graph(characteristic).concept(id)
    }

    /// Report concepts with no parents in one registry, in registration
    /// order. A well-formed snapshot has the hierarchy root and little
    /// else here; attribute type and destination concepts that never
    /// appear as an `|Is a|` source also qualify.
    pub fn check_single_root(&self, characteristic: Characteristic) -> Vec<ConceptId> {
        let mut parentless = Vec::new();
        for concept in self.graph(characteristic).concepts() {
            if concept.parents.is_empty() {
                tracing::debug!("no parents in {} graph: {}", characteristic, concept);
                parentless.push(concept.id);
            }
        }
        tracing::debug!(
            "{} parentless concepts in the {} graph",
            parentless.len(),
            characteristic
        );
        parentless
    }

    /// Next replacement number for a concept, starting at 1.
    pub fn next_replacement_number(
        &mut self,
        concept: ConceptId,
        characteristic: Characteristic,
    ) -> Result<u32> {
        let node = self
            .graph_mut(characteristic)
            .concept_mut(concept)
            .ok_or(GraphError::ConceptNotFound(concept))?;
        node.replacement_seq += 1;
        Ok(node.replacement_seq)
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::group_content_hash;

    fn fact(source: u64, destination: u64, relation_type: u64, group: u32) -> Relationship {
        Relationship::new(
            ConceptId(source),
            ConceptId(destination),
            ConceptId(relation_type),
            group,
            Characteristic::Inferred,
        )
    }

    #[test]
    fn test_register_creates_concepts_lazily() {
        let mut store = GraphStore::new();
        store.register_relationship(fact(1, 2, 3, 0));

        let graph = store.graph(Characteristic::Inferred);
        assert_eq!(graph.concept_count(), 2);
        assert!(graph.concept(ConceptId(1)).is_some());
        assert!(graph.concept(ConceptId(2)).is_some());
        // The type concept is not interned.
        assert!(graph.concept(ConceptId(3)).is_none());
    }

    #[test]
    fn test_registries_are_disjoint() {
        let mut store = GraphStore::new();
        let mut stated = fact(1, 2, 3, 0);
        stated.characteristic = Characteristic::Stated;
        store.register_relationship(stated);

        assert!(store.concept(ConceptId(1), Characteristic::Stated).is_some());
        assert!(store.concept(ConceptId(1), Characteristic::Inferred).is_none());
        assert!(store.graph(Characteristic::Inferred).is_empty());
    }

    #[test]
    fn test_duplicate_registration_is_dropped() {
        let mut store = GraphStore::new();
        store.register_relationship(fact(1, 2, 3, 1));
        store.register_relationship(fact(1, 2, 3, 1));

        assert_eq!(store.graph(Characteristic::Inferred).relationship_count(), 1);
    }

    #[test]
    fn test_duplicate_keeps_original_flags() {
        let mut store = GraphStore::new();
        store.register_relationship(fact(1, 2, 3, 1));
        store.register_relationship(fact(1, 2, 3, 1).with_needs_replacement());

        let concept = store.concept(ConceptId(1), Characteristic::Inferred).unwrap();
        assert_eq!(concept.attributes().len(), 1);
        assert!(!concept.attributes()[0].needs_replacement);
    }

    #[test]
    fn test_duplicate_isa_single_parent_edge() {
        let mut store = GraphStore::new();
        let edge = Relationship::isa(ConceptId(10), ConceptId(20), Characteristic::Stated);
        store.register_relationship(edge.clone());
        store.register_relationship(edge);

        let child = store.concept(ConceptId(10), Characteristic::Stated).unwrap();
        assert_eq!(child.parents().len(), 1);
        assert_eq!(child.attributes().len(), 1);
    }

    #[test]
    fn test_isa_populates_parents() {
        let mut store = GraphStore::new();
        store.register_relationship(Relationship::isa(
            ConceptId(10),
            ConceptId(20),
            Characteristic::Inferred,
        ));

        let child = store.concept(ConceptId(10), Characteristic::Inferred).unwrap();
        let parent = store.concept(ConceptId(20), Characteristic::Inferred).unwrap();
        assert!(child.parents().contains(&ConceptId(20)));
        assert!(parent.parents().is_empty());
    }

    #[test]
    fn test_non_isa_does_not_touch_parents() {
        let mut store = GraphStore::new();
        store.register_relationship(fact(10, 20, 30, 1));

        let source = store.concept(ConceptId(10), Characteristic::Inferred).unwrap();
        assert!(source.parents().is_empty());
    }

    #[test]
    fn test_attributes_stay_sorted() {
        let mut store = GraphStore::new();
        store.register_relationship(fact(1, 9, 9, 2));
        store.register_relationship(fact(1, 5, 5, 1));
        store.register_relationship(fact(1, 7, 5, 1));

        let concept = store.concept(ConceptId(1), Characteristic::Inferred).unwrap();
        let groups: Vec<u32> = concept.attributes().iter().map(|r| r.group).collect();
        assert_eq!(groups, vec![1, 1, 2]);
        assert_eq!(concept.attributes()[0].destination, ConceptId(5));
    }

    #[test]
    fn test_max_group_tracks_ceiling() {
        let mut store = GraphStore::new();
        store.register_relationship(fact(1, 2, 3, 0));
        store.register_relationship(fact(1, 4, 5, 3));
        store.register_relationship(fact(1, 6, 7, 1));

        let concept = store.concept(ConceptId(1), Characteristic::Inferred).unwrap();
        assert_eq!(concept.max_group(), 3);
    }

    #[test]
    fn test_replacement_numbers_are_sequential() {
        let mut store = GraphStore::new();
        store.register_relationship(fact(1, 2, 3, 0));
        store.register_relationship(fact(4, 2, 3, 0));

        let c1 = ConceptId(1);
        let c4 = ConceptId(4);
        assert_eq!(store.next_replacement_number(c1, Characteristic::Inferred).unwrap(), 1);
        assert_eq!(store.next_replacement_number(c1, Characteristic::Inferred).unwrap(), 2);
        // Counters are per concept.
        assert_eq!(store.next_replacement_number(c4, Characteristic::Inferred).unwrap(), 1);
    }

    #[test]
    fn test_replacement_number_for_unknown_concept() {
        let mut store = GraphStore::new();
        let result = store.next_replacement_number(ConceptId(99), Characteristic::Stated);
        assert!(matches!(result, Err(GraphError::ConceptNotFound(ConceptId(99)))));
    }

    #[test]
    fn test_check_single_root_reports_parentless() {
        let mut store = GraphStore::new();
        let root = ConceptId(100);
        let mid = ConceptId(200);
        let leaf = ConceptId(300);
        store.register_relationship(Relationship::isa(mid, root, Characteristic::Inferred));
        store.register_relationship(Relationship::isa(leaf, mid, Characteristic::Inferred));

        let parentless = store.check_single_root(Characteristic::Inferred);
        assert_eq!(parentless, vec![root]);
    }

    #[test]
    fn test_concept_display_marks_replacement_activity() {
        let mut store = GraphStore::new();
        store.register_relationship(fact(1, 2, 3, 0));
        store.register_relationship(fact(7, 2, 3, 0).with_needs_replacement());

        let plain = store.concept(ConceptId(1), Characteristic::Inferred).unwrap();
        let flagged = store.concept(ConceptId(7), Characteristic::Inferred).unwrap();
        assert_eq!(plain.to_string(), "1");
        assert_eq!(flagged.to_string(), "7 *");
    }

    #[test]
    fn test_triples_hash_over_group_members() {
        let mut store = GraphStore::new();
        store.register_relationship(fact(1, 4, 5, 1));
        store.register_relationship(fact(1, 2, 3, 1));
        store.register_relationship(fact(1, 8, 9, 2));

        let concept = store.concept(ConceptId(1), Characteristic::Inferred).unwrap();
        let members: Vec<&Relationship> = concept
            .attributes()
            .iter()
            .filter(|r| r.in_group(1))
            .collect();
        assert_eq!(members.len(), 2);
        assert_eq!(
            concept.triples_hash(1),
            group_content_hash(members.into_iter())
        );
    }
}
