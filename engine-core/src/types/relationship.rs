//! Typed relationship edges between chunks, and their static metadata table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

use super::enums::RelationshipOrigin;

#[cfg(feature = "proptest-arbitrary")]
use proptest::prelude::*;

/// The typed edge kinds a [`super::Relationship`] may carry.
///
/// `contradicts` and `related_to` are symmetric; `builds_on`, `requires`,
/// `depends_on`, `part_of`, `precedes`, and `caused_by` are transitive;
/// `requires` and `depends_on` are mutual inverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// `from` provides evidence for `to`.
    Supports,
    /// `from` and `to` assert mutually incompatible claims (symmetric).
    Contradicts,
    /// `from` extends or elaborates `to`.
    BuildsOn,
    /// `from` is a newer chunk that supersedes `to`.
    Replaces,
    /// `from` cannot be acted on without `to`.
    Requires,
    /// General association (symmetric); the only type materialized implicitly.
    RelatedTo,
    /// `from` exists because `to` happened.
    CausedBy,
    /// `from` needs `to` to be true or complete first.
    DependsOn,
    /// `from` is a concrete instance of `to`.
    ExampleOf,
    /// `from` is a component of `to`.
    PartOf,
    /// `from` was derived from `to`.
    DerivedFrom,
    /// `from` happens before `to`.
    Precedes,
}

/// Static per-type traversal metadata (§3's "relationship type metadata").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelationshipTypeMeta {
    /// Whether the edge has a meaningful direction.
    pub directed: bool,
    /// Whether the edge composes across a path during traversal.
    pub transitive: bool,
    /// The type traversed when walking the edge backwards, if any.
    pub inverse_type: Option<RelationshipType>,
    /// Weight applied per hop when accumulating a traversal score.
    pub traversal_weight: f32,
}

impl RelationshipType {
    /// All variants, in declaration order.
    #[must_use]
    pub fn all() -> &'static [RelationshipType] {
        &[
            RelationshipType::Supports,
            RelationshipType::Contradicts,
            RelationshipType::BuildsOn,
            RelationshipType::Replaces,
            RelationshipType::Requires,
            RelationshipType::RelatedTo,
            RelationshipType::CausedBy,
            RelationshipType::DependsOn,
            RelationshipType::ExampleOf,
            RelationshipType::PartOf,
            RelationshipType::DerivedFrom,
            RelationshipType::Precedes,
        ]
    }

    /// The static metadata table entry for this type.
    #[must_use]
    pub fn meta(self) -> RelationshipTypeMeta {
        use RelationshipType::{
            BuildsOn, CausedBy, Contradicts, DependsOn, DerivedFrom, ExampleOf, PartOf, Precedes,
            RelatedTo, Replaces, Requires, Supports,
        };
        match self {
            Supports => RelationshipTypeMeta {
                directed: true,
                transitive: false,
                inverse_type: None,
                traversal_weight: 0.8,
            },
            Contradicts => RelationshipTypeMeta {
                directed: false,
                transitive: false,
                inverse_type: None,
                traversal_weight: 0.5,
            },
            BuildsOn => RelationshipTypeMeta {
                directed: true,
                transitive: true,
                inverse_type: None,
                traversal_weight: 0.9,
            },
            Replaces => RelationshipTypeMeta {
                directed: true,
                transitive: false,
                inverse_type: Some(Replaces),
                traversal_weight: 0.6,
            },
            Requires => RelationshipTypeMeta {
                directed: true,
                transitive: true,
                inverse_type: Some(DependsOn),
                traversal_weight: 0.85,
            },
            RelatedTo => RelationshipTypeMeta {
                directed: false,
                transitive: false,
                inverse_type: None,
                traversal_weight: 0.6,
            },
            CausedBy => RelationshipTypeMeta {
                directed: true,
                transitive: true,
                inverse_type: Some(CausedBy),
                traversal_weight: 0.7,
            },
            DependsOn => RelationshipTypeMeta {
                directed: true,
                transitive: true,
                inverse_type: Some(Requires),
                traversal_weight: 0.85,
            },
            ExampleOf => RelationshipTypeMeta {
                directed: true,
                transitive: false,
                inverse_type: None,
                traversal_weight: 0.7,
            },
            PartOf => RelationshipTypeMeta {
                directed: true,
                transitive: true,
                inverse_type: None,
                traversal_weight: 0.9,
            },
            DerivedFrom => RelationshipTypeMeta {
                directed: true,
                transitive: false,
                inverse_type: None,
                traversal_weight: 0.75,
            },
            Precedes => RelationshipTypeMeta {
                directed: true,
                transitive: true,
                inverse_type: None,
                traversal_weight: 0.6,
            },
        }
    }

    /// Whether this type is symmetric (`directed == false`).
    #[must_use]
    pub fn is_symmetric(self) -> bool {
        !self.meta().directed
    }

    /// Whether this type composes across multi-hop paths during traversal.
    #[must_use]
    pub fn is_transitive(self) -> bool {
        self.meta().transitive
    }

    /// The type walked when traversing this edge backwards, if defined.
    #[must_use]
    pub fn inverse(self) -> Option<RelationshipType> {
        self.meta().inverse_type
    }

    /// Parse from the type's snake_case wire representation.
    ///
    /// # Errors
    ///
    /// Returns an error string if `s` does not match a known type.
    pub fn parse(s: &str) -> Result<Self, String> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown relationship type: {s}"))
    }

    /// The type's snake_case wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipType::Supports => "supports",
            RelationshipType::Contradicts => "contradicts",
            RelationshipType::BuildsOn => "builds_on",
            RelationshipType::Replaces => "replaces",
            RelationshipType::Requires => "requires",
            RelationshipType::RelatedTo => "related_to",
            RelationshipType::CausedBy => "caused_by",
            RelationshipType::DependsOn => "depends_on",
            RelationshipType::ExampleOf => "example_of",
            RelationshipType::PartOf => "part_of",
            RelationshipType::DerivedFrom => "derived_from",
            RelationshipType::Precedes => "precedes",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "proptest-arbitrary")]
impl Arbitrary for RelationshipType {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((): ()) -> Self::Strategy {
        prop_oneof![
            Just(RelationshipType::Supports),
            Just(RelationshipType::Contradicts),
            Just(RelationshipType::BuildsOn),
            Just(RelationshipType::Replaces),
            Just(RelationshipType::Requires),
            Just(RelationshipType::RelatedTo),
            Just(RelationshipType::CausedBy),
            Just(RelationshipType::DependsOn),
            Just(RelationshipType::ExampleOf),
            Just(RelationshipType::PartOf),
            Just(RelationshipType::DerivedFrom),
            Just(RelationshipType::Precedes),
        ]
        .boxed()
    }
}

/// A directed (or, for symmetric types, effectively undirected) typed edge
/// between two chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique identity of the edge.
    pub id: Uuid,
    /// Source chunk.
    pub from: Uuid,
    /// Target chunk.
    pub to: Uuid,
    /// The edge's type.
    pub rel_type: RelationshipType,
    /// Where the edge came from.
    pub origin: RelationshipOrigin,
    /// Edge strength in `[0, 1]`.
    pub weight: f32,
    /// Number of times this edge has been traversed or reinforced.
    pub activation_count: u32,
    /// When the edge was last activated.
    pub last_activated: Option<DateTime<Utc>>,
    /// Tags copied from the retrieval query context that created or last
    /// strengthened the edge.
    pub context_tags: HashSet<String>,
}

impl Relationship {
    /// Construct a new explicit edge with the given weight, defaulting
    /// `activation_count` to zero and `last_activated` to the creation time.
    #[must_use]
    pub fn new(
        from: Uuid,
        to: Uuid,
        rel_type: RelationshipType,
        origin: RelationshipOrigin,
        weight: f32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            rel_type,
            origin,
            weight: weight.clamp(0.0, 1.0),
            activation_count: 0,
            last_activated: Some(Utc::now()),
            context_tags: HashSet::new(),
        }
    }

    /// The unordered pair key used to dedupe symmetric edges and to key
    /// co-retrieval counters.
    #[must_use]
    pub fn unordered_key(&self) -> (Uuid, Uuid) {
        if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        }
    }

    /// Strengthen the edge by `amount`, capping at `1.0`.
    pub fn strengthen(&mut self, amount: f32) {
        self.weight = (self.weight + amount).min(1.0);
        self.activation_count += 1;
        self.last_activated = Some(Utc::now());
    }

    /// Weaken the edge by `amount`, flooring at `0.0`.
    pub fn weaken(&mut self, amount: f32) {
        self.weight = (self.weight - amount).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_str_round_trips() {
        for t in RelationshipType::all() {
            assert_eq!(RelationshipType::parse(t.as_str()).unwrap(), *t);
        }
    }

    #[test]
    fn requires_and_depends_on_are_mutual_inverses() {
        assert_eq!(
            RelationshipType::Requires.inverse(),
            Some(RelationshipType::DependsOn)
        );
        assert_eq!(
            RelationshipType::DependsOn.inverse(),
            Some(RelationshipType::Requires)
        );
    }

    #[test]
    fn contradicts_and_related_to_are_symmetric() {
        assert!(RelationshipType::Contradicts.is_symmetric());
        assert!(RelationshipType::RelatedTo.is_symmetric());
        assert!(!RelationshipType::Supports.is_symmetric());
    }

    #[test]
    fn strengthen_caps_at_one() {
        let mut r = Relationship::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            RelationshipType::RelatedTo,
            RelationshipOrigin::Implicit,
            0.9,
        );
        r.strengthen(0.5);
        assert_eq!(r.weight, 1.0);
    }

    #[test]
    fn weaken_floors_at_zero() {
        let mut r = Relationship::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            RelationshipType::Contradicts,
            RelationshipOrigin::Explicit,
            0.1,
        );
        r.weaken(0.5);
        assert_eq!(r.weight, 0.0);
    }

    #[test]
    fn unordered_key_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let r1 = Relationship::new(a, b, RelationshipType::RelatedTo, RelationshipOrigin::Implicit, 0.5);
        let r2 = Relationship::new(b, a, RelationshipType::RelatedTo, RelationshipOrigin::Implicit, 0.5);
        assert_eq!(r1.unordered_key(), r2.unordered_key());
    }
}
