//! Relationship matching engine.
//!
//! A family of graduated query operations over one concept's outgoing
//! relationships, each trading exactness for tolerance of extra
//! specificity in type or destination. Purely exact operations are
//! infallible; operations whose tolerant branches walk ancestry return
//! `Result` because the walk is bounded.
//!
//! Tolerant branches resolve descent targets against the inferred
//! registry whatever characteristic is being queried; an id the inferred
//! registry has never seen makes its branch contribute nothing.

use crate::graph::{GraphError, GraphStore, Result};
use crate::hashing::GroupHash;
use crate::ontology::{Characteristic, ConceptId, Relationship};
use crate::traversal::has_ancestor;

/// Specificity tolerances for triple matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tolerance {
    /// Accept destinations that are descendants of the requested one.
    pub child_of_destination: bool,
    /// Accept types that are descendants of the requested one.
    pub child_of_type: bool,
}

impl Tolerance {
    /// Exact matching only.
    pub const fn exact() -> Self {
        Self {
            child_of_destination: false,
            child_of_type: false,
        }
    }

    /// Both tolerances enabled.
    pub const fn full() -> Self {
        Self {
            child_of_destination: true,
            child_of_type: true,
        }
    }
}

impl GraphStore {
    fn attributes_of(&self, characteristic: Characteristic, source: ConceptId) -> &[Relationship] {
        self.graph(characteristic)
            .concept(source)
            .map(|c| c.attributes())
            .unwrap_or(&[])
    }

    fn exact_triple_matches(
        attributes: &[Relationship],
        relation_type: ConceptId,
        destination: ConceptId,
        group: u32,
    ) -> Vec<Relationship> {
        attributes
            .iter()
            .filter(|r| {
                r.in_group(group) && r.has_type(relation_type) && r.destination == destination
            })
            .cloned()
            .collect()
    }

    /// All attributes of `source` with the given relationship type.
    pub fn find_by_type(
        &self,
        characteristic: Characteristic,
        source: ConceptId,
        relation_type: ConceptId,
    ) -> Vec<Relationship> {
        self.attributes_of(characteristic, source)
            .iter()
            .filter(|r| r.has_type(relation_type))
            .cloned()
            .collect()
    }

    /// Attributes matching type and destination, preferring the exact
    /// destination but falling back to more specific ones.
    ///
    /// The fallback accepts type-matched attributes whose destination is
    /// a descendant of the requested destination, resolved within the
    /// queried registry itself.
    pub fn find_by_type_and_destination(
        &self,
        characteristic: Characteristic,
        source: ConceptId,
        relation_type: ConceptId,
        destination: ConceptId,
    ) -> Result<Vec<Relationship>> {
        let graph = self.graph(characteristic);
        let typed = self.find_by_type(characteristic, source, relation_type);
        let mut matches: Vec<Relationship> = typed
            .iter()
            .filter(|r| r.destination == destination)
            .cloned()
            .collect();
        if matches.is_empty() {
            for relationship in &typed {
                if has_ancestor(graph, relationship.destination, destination)? {
                    matches.push(relationship.clone());
                }
            }
        }
        Ok(matches)
    }

    /// Attributes with the given type in the given group.
    pub fn find_by_type_in_group(
        &self,
        characteristic: Characteristic,
        source: ConceptId,
        relation_type: ConceptId,
        group: u32,
    ) -> Vec<Relationship> {
        self.attributes_of(characteristic, source)
            .iter()
            .filter(|r| r.has_type(relation_type) && r.in_group(group))
            .cloned()
            .collect()
    }

    /// Attributes in one group matching a triple, with graduated fallback.
    ///
    /// Exact matches win outright. Otherwise destination tolerance admits
    /// type-matched group members whose destination descends from the
    /// requested destination; only if that too produced nothing does type
    /// tolerance run, admitting group members with the exact destination
    /// and a type descending from the requested type. The two tolerances
    /// never combine within one pass.
    pub fn find_by_triple_in_group(
        &self,
        characteristic: Characteristic,
        source: ConceptId,
        relation_type: ConceptId,
        destination: ConceptId,
        group: u32,
        tolerance: Tolerance,
    ) -> Result<Vec<Relationship>> {
        let attributes = self.attributes_of(characteristic, source);
        let mut matches =
            Self::exact_triple_matches(attributes, relation_type, destination, group);

        let destination_known = self
            .graph(Characteristic::Inferred)
            .concept(destination)
            .is_some();

        if matches.is_empty() && tolerance.child_of_destination && destination_known {
            let own = self.graph(characteristic);
            for relationship in attributes {
                if relationship.in_group(group)
                    && relationship.has_type(relation_type)
                    && has_ancestor(own, relationship.destination, destination)?
                {
                    matches.push(relationship.clone());
                }
            }
        }

        if matches.is_empty() && tolerance.child_of_type && destination_known {
            let inferred = self.graph(Characteristic::Inferred);
            for relationship in attributes {
                if relationship.in_group(group)
                    && relationship.destination == destination
                    && has_ancestor(inferred, relationship.relation_type, relation_type)?
                {
                    matches.push(relationship.clone());
                }
            }
        }

        Ok(matches)
    }

    /// Attributes matching a triple anywhere on the concept, accumulated
    /// across tolerance passes.
    ///
    /// Unlike [`GraphStore::find_by_triple_in_group`] this does not fall
    /// back: the exact pass always contributes, then each enabled
    /// tolerance appends its own pass over all attributes (type tolerant,
    /// destination tolerant, then both at once when both flags are set).
    /// An attribute satisfying several passes appears once per pass;
    /// callers that need distinct results must deduplicate.
    pub fn find_by_triple(
        &self,
        characteristic: Characteristic,
        source: ConceptId,
        relation_type: ConceptId,
        destination: ConceptId,
        tolerance: Tolerance,
    ) -> Result<Vec<Relationship>> {
        let attributes = self.attributes_of(characteristic, source);
        let own = self.graph(characteristic);
        let inferred = self.graph(Characteristic::Inferred);
        let destination_known = inferred.concept(destination).is_some();

        let mut matches: Vec<Relationship> = attributes
            .iter()
            .filter(|r| r.has_type(relation_type) && r.destination == destination)
            .cloned()
            .collect();

        if tolerance.child_of_type && destination_known {
            for relationship in attributes {
                if relationship.destination == destination
                    && has_ancestor(inferred, relationship.relation_type, relation_type)?
                {
                    matches.push(relationship.clone());
                }
            }
        }

        if tolerance.child_of_destination && destination_known {
            for relationship in attributes {
                if relationship.has_type(relation_type)
                    && has_ancestor(own, relationship.destination, destination)?
                {
                    matches.push(relationship.clone());
                }
            }
        }

        if tolerance.child_of_destination && tolerance.child_of_type && destination_known {
            for relationship in attributes {
                if has_ancestor(inferred, relationship.relation_type, relation_type)?
                    && has_ancestor(own, relationship.destination, destination)?
                {
                    matches.push(relationship.clone());
                }
            }
        }

        Ok(matches)
    }

    /// All attributes in one group, optionally omitting hierarchy edges.
    pub fn find_in_group(
        &self,
        characteristic: Characteristic,
        source: ConceptId,
        group: u32,
        exclude_isa: bool,
    ) -> Vec<Relationship> {
        self.attributes_of(characteristic, source)
            .iter()
            .filter(|r| r.in_group(group) && !(exclude_isa && r.is_isa()))
            .cloned()
            .collect()
    }

    /// Locate the group whose content hash matches, then run the exact
    /// triple lookup for `reference` inside it.
    ///
    /// Scans groups `1..=max_group`; group 0 is never a candidate. No
    /// group hashing to the target at all is
    /// [`GraphError::NoEquivalentGroup`], distinct from finding the group
    /// and matching nothing inside it.
    pub fn find_equivalent_group(
        &self,
        characteristic: Characteristic,
        source: ConceptId,
        triples_hash: &GroupHash,
        reference: &Relationship,
    ) -> Result<Vec<Relationship>> {
        let Some(concept) = self.graph(characteristic).concept(source) else {
            return Err(GraphError::NoEquivalentGroup);
        };
        for group in 1..=concept.max_group() {
            if concept.triples_hash(group) == *triples_hash {
                return Ok(Self::exact_triple_matches(
                    concept.attributes(),
                    reference.relation_type,
                    reference.destination,
                    group,
                ));
            }
        }
        Err(GraphError::NoEquivalentGroup)
    }

    /// Union of all groups that contain every required type.
    ///
    /// A group qualifies only if each required type appears on at least
    /// one of its members; a qualifying group contributes all its
    /// members, any other contributes nothing. Group 0 is never scanned.
    pub fn find_with_group_types(
        &self,
        characteristic: Characteristic,
        source: ConceptId,
        required_types: &[ConceptId],
    ) -> Vec<Relationship> {
        let Some(concept) = self.graph(characteristic).concept(source) else {
            return Vec::new();
        };
        let mut matches = Vec::new();
        for group in 1..=concept.max_group() {
            let members: Vec<Relationship> = concept
                .attributes()
                .iter()
                .filter(|r| r.in_group(group))
                .cloned()
                .collect();
            let qualifies = required_types
                .iter()
                .all(|required| members.iter().any(|r| r.has_type(*required)));
            if qualifies {
                matches.extend(members);
            }
        }
        matches
    }

    /// Attributes whose type matches or descends from the given type.
    ///
    /// Hierarchy edges only ever match exactly; an `|Is a|` attribute
    /// never enters the descendant check. Type descent resolves in the
    /// inferred registry.
    pub fn find_by_type_or_descendant(
        &self,
        characteristic: Characteristic,
        source: ConceptId,
        relation_type: ConceptId,
    ) -> Result<Vec<Relationship>> {
        let inferred = self.graph(Characteristic::Inferred);
        let mut matches = Vec::new();
        for relationship in self.attributes_of(characteristic, source) {
            if relationship.has_type(relation_type) {
                matches.push(relationship.clone());
            } else if !relationship.is_isa()
                && has_ancestor(inferred, relationship.relation_type, relation_type)?
            {
                matches.push(relationship.clone());
            }
        }
        Ok(matches)
    }

    /// Exact triple-in-group lookup for a reference relationship.
    pub fn find_exact(
        &self,
        characteristic: Characteristic,
        source: ConceptId,
        reference: &Relationship,
    ) -> Vec<Relationship> {
        Self::exact_triple_matches(
            self.attributes_of(characteristic, source),
            reference.relation_type,
            reference.destination,
            reference.group,
        )
    }
}
