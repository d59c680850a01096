//! Ancestor traversal over a characteristic's registry.
//!
//! Both walks follow parent edges iteratively with an explicit stack and
//! visited set, so shared ancestors are expanded once and cyclic input
//! terminates instead of overflowing. The closure walk is bounded by the
//! registry's ancestor limit to catch runaway hierarchies.

use std::collections::HashSet;

use crate::graph::{ConceptGraph, GraphError, Result};
use crate::ontology::ConceptId;

/// True if `candidate` is a transitive ancestor of `concept`.
///
/// Never true for the concept itself on acyclic input; a concept on a
/// parent cycle does reach itself. An id unknown to the registry has no
/// ancestors.
pub fn has_ancestor(
    graph: &ConceptGraph,
    concept: ConceptId,
    candidate: ConceptId,
) -> Result<bool> {
    let Some(start) = graph.concept(concept) else {
        return Ok(false);
    };
    let limit = graph.ancestor_limit();
    let mut visited: HashSet<ConceptId> = HashSet::new();
    let mut stack: Vec<ConceptId> = start.parents().iter().copied().collect();

    while let Some(current) = stack.pop() {
        if current == candidate {
            return Ok(true);
        }
        if !visited.insert(current) {
            continue;
        }
        if visited.len() > limit {
            return Err(GraphError::AncestorLimitExceeded { concept, limit });
        }
        if let Some(node) = graph.concept(current) {
            stack.extend(node.parents().iter().copied());
        }
    }
    Ok(false)
}

/// Collect the full ancestor closure of `concept`, in discovery order.
///
/// Fails with [`GraphError::AncestorLimitExceeded`] once the closure
/// grows strictly larger than the registry's ancestor limit. An id
/// unknown to the registry yields an empty closure.
pub fn ancestors(graph: &ConceptGraph, concept: ConceptId) -> Result<Vec<ConceptId>> {
    let Some(start) = graph.concept(concept) else {
        return Ok(Vec::new());
    };
    let limit = graph.ancestor_limit();
    let mut seen: HashSet<ConceptId> = HashSet::new();
    let mut closure: Vec<ConceptId> = Vec::new();
    let mut stack: Vec<ConceptId> = start.parents().iter().copied().collect();

    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        closure.push(current);
        if closure.len() > limit {
            return Err(GraphError::AncestorLimitExceeded { concept, limit });
        }
        if let Some(node) = graph.concept(current) {
            stack.extend(node.parents().iter().copied());
        }
    }
    Ok(closure)
}
