//! Classification enums for chunks and relationships.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "proptest-arbitrary")]
use proptest::prelude::*;

/// What kind of knowledge fragment a chunk represents.
///
/// Determines the default decay function and rate applied at ingestion
/// time when the caller does not override them.
///
/// # Examples
///
/// ```
/// use engine_core::types::ChunkKind;
///
/// assert_eq!(ChunkKind::Decision.to_string(), "decision");
/// assert_eq!("attempt".parse::<ChunkKind>().unwrap(), ChunkKind::Attempt);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// Knowledge gathered via research.
    Research,
    /// A realization derived from prior experience.
    Insight,
    /// A decision made by the agent or the user.
    Decision,
    /// A pointer to an external resource.
    Resource,
    /// A record of an attempted action and its (possibly unknown) outcome.
    Attempt,
    /// Verbatim input supplied by the user.
    UserInput,
}

impl ChunkKind {
    /// All variants, in declaration order.
    #[must_use]
    pub fn all() -> &'static [ChunkKind] {
        &[
            ChunkKind::Research,
            ChunkKind::Insight,
            ChunkKind::Decision,
            ChunkKind::Resource,
            ChunkKind::Attempt,
            ChunkKind::UserInput,
        ]
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChunkKind::Research => "research",
            ChunkKind::Insight => "insight",
            ChunkKind::Decision => "decision",
            ChunkKind::Resource => "resource",
            ChunkKind::Attempt => "attempt",
            ChunkKind::UserInput => "user_input",
        };
        f.write_str(s)
    }
}

impl FromStr for ChunkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "research" => Ok(ChunkKind::Research),
            "insight" => Ok(ChunkKind::Insight),
            "decision" => Ok(ChunkKind::Decision),
            "resource" => Ok(ChunkKind::Resource),
            "attempt" => Ok(ChunkKind::Attempt),
            "user_input" => Ok(ChunkKind::UserInput),
            other => Err(format!("unknown chunk kind: {other}")),
        }
    }
}

#[cfg(feature = "proptest-arbitrary")]
impl Arbitrary for ChunkKind {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((): ()) -> Self::Strategy {
        prop_oneof![
            Just(ChunkKind::Research),
            Just(ChunkKind::Insight),
            Just(ChunkKind::Decision),
            Just(ChunkKind::Resource),
            Just(ChunkKind::Attempt),
            Just(ChunkKind::UserInput),
        ]
        .boxed()
    }
}

/// How certain the agent is of a chunk's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Confirmed true, e.g. by running code or direct observation.
    Verified,
    /// Derived by reasoning from other facts.
    Inferred,
    /// A guess, not yet checked.
    Speculative,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::Verified => "verified",
            Confidence::Inferred => "inferred",
            Confidence::Speculative => "speculative",
        };
        f.write_str(s)
    }
}

#[cfg(feature = "proptest-arbitrary")]
impl Arbitrary for Confidence {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((): ()) -> Self::Strategy {
        prop_oneof![
            Just(Confidence::Verified),
            Just(Confidence::Inferred),
            Just(Confidence::Speculative),
        ]
        .boxed()
    }
}

/// Where a chunk's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Produced by a research step.
    Research,
    /// Supplied directly by the user.
    User,
    /// Derived by logical deduction from other chunks.
    Deduction,
    /// Observed as the result of an experiment or tool call.
    Experiment,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Source::Research => "research",
            Source::User => "user",
            Source::Deduction => "deduction",
            Source::Experiment => "experiment",
        };
        f.write_str(s)
    }
}

#[cfg(feature = "proptest-arbitrary")]
impl Arbitrary for Source {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((): ()) -> Self::Strategy {
        prop_oneof![
            Just(Source::Research),
            Just(Source::User),
            Just(Source::Deduction),
            Just(Source::Experiment),
        ]
        .boxed()
    }
}

/// Coarse categorical summary of a chunk's strength.
///
/// Status only ever demotes via decay; the only path back up is
/// reinforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStatus {
    /// Freshly created or recently reinforced.
    Active,
    /// One decay tier below active.
    Warm,
    /// Two decay tiers below active.
    Cool,
    /// Three decay tiers below active; an archival candidate.
    Cold,
    /// Moved to the archive; excluded from retrieval.
    Archived,
    /// Archived and pending compaction; excluded from retrieval.
    Tombstone,
}

impl ChunkStatus {
    /// Whether retrieval must exclude chunks in this status.
    #[must_use]
    pub fn is_retrievable(self) -> bool {
        !matches!(self, ChunkStatus::Archived | ChunkStatus::Tombstone)
    }

    /// The status one tier below `self`, or `self` if already at the floor.
    #[must_use]
    pub fn demote(self) -> Self {
        match self {
            ChunkStatus::Active => ChunkStatus::Warm,
            ChunkStatus::Warm => ChunkStatus::Cool,
            ChunkStatus::Cool | ChunkStatus::Cold => ChunkStatus::Cold,
            ChunkStatus::Archived | ChunkStatus::Tombstone => self,
        }
    }

    /// The status one tier above `self`, or `self` if already at the ceiling.
    #[must_use]
    pub fn promote(self) -> Self {
        match self {
            ChunkStatus::Warm => ChunkStatus::Active,
            ChunkStatus::Cool => ChunkStatus::Warm,
            ChunkStatus::Cold => ChunkStatus::Cool,
            ChunkStatus::Active | ChunkStatus::Archived | ChunkStatus::Tombstone => self,
        }
    }
}

impl fmt::Display for ChunkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChunkStatus::Active => "active",
            ChunkStatus::Warm => "warm",
            ChunkStatus::Cool => "cool",
            ChunkStatus::Cold => "cold",
            ChunkStatus::Archived => "archived",
            ChunkStatus::Tombstone => "tombstone",
        };
        f.write_str(s)
    }
}

/// Where a relationship edge came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipOrigin {
    /// Asserted directly by ingestion or an external caller.
    Explicit,
    /// Materialized from co-retrieval counters crossing the promotion threshold.
    Implicit,
    /// Derived by the engine from other relationships (e.g. transitive closure).
    Inferred,
    /// Created automatically as a side effect of another operation (e.g. `replaces`).
    Auto,
}

impl fmt::Display for RelationshipOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelationshipOrigin::Explicit => "explicit",
            RelationshipOrigin::Implicit => "implicit",
            RelationshipOrigin::Inferred => "inferred",
            RelationshipOrigin::Auto => "auto",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_kind_round_trips_through_str() {
        for kind in ChunkKind::all() {
            let s = kind.to_string();
            assert_eq!(&s.parse::<ChunkKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_string_errors() {
        assert!("bogus".parse::<ChunkKind>().is_err());
    }

    #[test]
    fn status_demote_never_skips_a_tier() {
        assert_eq!(ChunkStatus::Active.demote(), ChunkStatus::Warm);
        assert_eq!(ChunkStatus::Warm.demote(), ChunkStatus::Cool);
        assert_eq!(ChunkStatus::Cool.demote(), ChunkStatus::Cold);
        assert_eq!(ChunkStatus::Cold.demote(), ChunkStatus::Cold);
    }

    #[test]
    fn archived_and_tombstone_are_not_retrievable() {
        assert!(!ChunkStatus::Archived.is_retrievable());
        assert!(!ChunkStatus::Tombstone.is_retrievable());
        assert!(ChunkStatus::Active.is_retrievable());
    }

    #[test]
    fn status_ordering_follows_decay_direction() {
        assert!(ChunkStatus::Active < ChunkStatus::Warm);
        assert!(ChunkStatus::Cold < ChunkStatus::Archived);
    }
}
