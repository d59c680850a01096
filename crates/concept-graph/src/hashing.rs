//! Group content identity hashing.
//!
//! A role group is identified by the name-based UUID (version 5, OID
//! namespace) of its members' triple strings concatenated in attribute
//! order. Group numbers are arbitrary labels, so renumbering a group
//! never changes its hash; changing any member always does.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ontology::Relationship;

/// Content identity of a role group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupHash(Uuid);

impl GroupHash {
    /// The underlying UUID.
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for GroupHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Canonical hyphenated form, e.g. 8-4-4-4-12 hex digits.
        write!(f, "{}", self.0)
    }
}

/// Hash a group's members into their content identity.
///
/// Triples are concatenated with no separator, so members are only
/// distinguishable by position in the iteration order. Callers must pass
/// members in a concept's attribute order for stable results.
pub fn group_content_hash<'a, I>(members: I) -> GroupHash
where
    I: IntoIterator<Item = &'a Relationship>,
{
    let mut concatenated = String::new();
    for relationship in members {
        concatenated.push_str(&relationship.triple_string());
    }
    GroupHash(Uuid::new_v5(&Uuid::NAMESPACE_OID, concatenated.as_bytes()))
}
