//! Ontology types for the terminology graph.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// SCTID of the `|Is a|` relationship type, the hierarchy edge.
pub const IS_A: ConceptId = ConceptId(116_680_003);

/// A concept identifier (SCTID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(pub u64);

impl ConceptId {
    /// Raw numeric value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ConceptId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Which view of the terminology a fact belongs to.
///
/// Stated and inferred facts live in disjoint registries; the same SCTID
/// names an independent concept node in each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Characteristic {
    /// Authored form of a concept's definition.
    Stated,
    /// Classifier output after subsumption reasoning.
    Inferred,
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Characteristic::Stated => write!(f, "stated"),
            Characteristic::Inferred => write!(f, "inferred"),
        }
    }
}

/// A relationship fact: source concept, destination concept, relationship
/// type, role group number, and the view it was asserted in.
///
/// Identity (equality, ordering, hashing) covers the
/// `(source, group, relation_type, destination, characteristic)` tuple.
/// The replacement flags are reconciliation bookkeeping and do not
/// participate, so refiling a flagged fact never creates a second copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// Source concept.
    pub source: ConceptId,
    /// Destination concept.
    pub destination: ConceptId,
    /// Relationship type concept.
    pub relation_type: ConceptId,
    /// Role group number; 0 means ungrouped.
    pub group: u32,
    /// View this fact was asserted in.
    pub characteristic: Characteristic,
    /// Marked for replacement during reconciliation.
    pub needs_replacement: bool,
    /// Introduced as a replacement during reconciliation.
    pub is_replacement: bool,
}

impl Relationship {
    /// Create a new relationship fact with clear replacement flags.
    pub fn new(
        source: ConceptId,
        destination: ConceptId,
        relation_type: ConceptId,
        group: u32,
        characteristic: Characteristic,
    ) -> Self {
        Self {
            source,
            destination,
            relation_type,
            group,
            characteristic,
            needs_replacement: false,
            is_replacement: false,
        }
    }

    /// Create an ungrouped `|Is a|` hierarchy edge.
    pub fn isa(source: ConceptId, destination: ConceptId, characteristic: Characteristic) -> Self {
        Self::new(source, destination, IS_A, 0, characteristic)
    }

    /// Mark as needing replacement.
    pub fn with_needs_replacement(mut self) -> Self {
        self.needs_replacement = true;
        self
    }

    /// Mark as being a replacement.
    pub fn with_is_replacement(mut self) -> Self {
        self.is_replacement = true;
        self
    }

    /// True if this is a hierarchy edge.
    pub fn is_isa(&self) -> bool {
        self.relation_type == IS_A
    }

    /// True if the relationship type matches.
    pub fn has_type(&self, relation_type: ConceptId) -> bool {
        self.relation_type == relation_type
    }

    /// True if the role group number matches.
    pub fn in_group(&self, group: u32) -> bool {
        self.group == group
    }

    /// Triple rendering used for group content hashing: the decimal source,
    /// destination, and type identifiers concatenated with no separator.
    pub fn triple_string(&self) -> String {
        format!("{}{}{}", self.source, self.destination, self.relation_type)
    }

    fn identity(&self) -> (ConceptId, u32, ConceptId, ConceptId, Characteristic) {
        (
            self.source,
            self.group,
            self.relation_type,
            self.destination,
            self.characteristic,
        )
    }
}

impl PartialEq for Relationship {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Relationship {}

impl Hash for Relationship {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for Relationship {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Relationship {
    fn cmp(&self, other: &Self) -> Ordering {
        // Sorts a concept's attributes by group, then type, then destination.
        self.identity().cmp(&other.identity())
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} -> {} (type {}, group {})",
            self.characteristic, self.source, self.destination, self.relation_type, self.group
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isa_constant() {
        let rel = Relationship::isa(
            ConceptId(10),
            ConceptId(20),
            Characteristic::Stated,
        );
        assert!(rel.is_isa());
        assert!(rel.has_type(IS_A));
        assert_eq!(rel.group, 0);
    }

    #[test]
    fn test_identity_ignores_flags() {
        let plain = Relationship::new(
            ConceptId(1),
            ConceptId(2),
            ConceptId(3),
            1,
            Characteristic::Inferred,
        );
        let flagged = plain.clone().with_needs_replacement().with_is_replacement();

        assert_eq!(plain, flagged);
        assert_eq!(plain.cmp(&flagged), Ordering::Equal);
    }

    #[test]
    fn test_identity_distinguishes_characteristic() {
        let stated = Relationship::new(
            ConceptId(1),
            ConceptId(2),
            ConceptId(3),
            1,
            Characteristic::Stated,
        );
        let mut inferred = stated.clone();
        inferred.characteristic = Characteristic::Inferred;

        assert_ne!(stated, inferred);
    }

    #[test]
    fn test_ordering_is_group_major() {
        let group_two = Relationship::new(
            ConceptId(1),
            ConceptId(2),
            ConceptId(3),
            2,
            Characteristic::Stated,
        );
        let group_one = Relationship::new(
            ConceptId(1),
            ConceptId(9),
            ConceptId(9),
            1,
            Characteristic::Stated,
        );

        assert!(group_one < group_two);
    }

    #[test]
    fn test_triple_string_has_no_separator() {
        let rel = Relationship::new(
            ConceptId(123),
            ConceptId(456),
            ConceptId(789),
            1,
            Characteristic::Inferred,
        );
        assert_eq!(rel.triple_string(), "123456789");
    }
}
