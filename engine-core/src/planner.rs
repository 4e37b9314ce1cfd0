//! Classifies a query into a retrieval route by simple syntactic cues.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which pipeline a query should run through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Delegates to the external working-layer API; the engine returns a
    /// deferral rather than executing a pipeline itself.
    Operational,
    /// Tag filter plus recency ordering.
    Lookup,
    /// Semantic-search-only.
    Exploration,
    /// Graph-centric traversal from a seed.
    Connection,
    /// The full fused pipeline; the default route.
    Hybrid,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Route::Operational => "operational",
            Route::Lookup => "lookup",
            Route::Exploration => "exploration",
            Route::Connection => "connection",
            Route::Hybrid => "hybrid",
        };
        f.write_str(s)
    }
}

const OPERATIONAL_CUES: &[&str] = &["blocked", "show tasks", "what's next", "todo"];
const LOOKUP_CUES: &[&str] = &["what did we decide", "decided about", "what was decided"];
const EXPLORATION_CUES: &[&str] = &["what do we know about", "tell me about"];
const CONNECTION_CUES: &[&str] = &["what contradicts", "related to", "connects to"];

/// Classify free-text `query` into a [`Route`] using simple cue matching.
/// Callers may bypass this entirely by requesting a route explicitly.
#[must_use]
pub fn classify(query: &str) -> Route {
    let q = query.to_lowercase();
    if OPERATIONAL_CUES.iter().any(|cue| q.contains(cue)) {
        Route::Operational
    } else if LOOKUP_CUES.iter().any(|cue| q.contains(cue)) {
        Route::Lookup
    } else if CONNECTION_CUES.iter().any(|cue| q.contains(cue)) {
        Route::Connection
    } else if EXPLORATION_CUES.iter().any(|cue| q.contains(cue)) {
        Route::Exploration
    } else {
        Route::Hybrid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_each_named_cue() {
        assert_eq!(classify("what's blocked right now"), Route::Operational);
        assert_eq!(classify("what did we decide about caching"), Route::Lookup);
        assert_eq!(classify("what do we know about rust"), Route::Exploration);
        assert_eq!(classify("what contradicts the plan"), Route::Connection);
    }

    #[test]
    fn unmatched_query_defaults_to_hybrid() {
        assert_eq!(classify("anything else entirely"), Route::Hybrid);
    }
}
