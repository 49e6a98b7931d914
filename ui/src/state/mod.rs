//! Global stores for the search pipeline.
//!
//! Each store is an owned state container with an enumerated set of
//! mutation methods; components subscribe through yewdux and derived
//! computation re-runs from the current snapshot.

pub mod filters;
pub mod location;
pub mod stocks;

pub use filters::Filters;
pub use location::LocationCache;
pub use stocks::{
    FetchDecision, Stats, StockCache, StockParams, VisibleRange,
};

/// Lifecycle of one cached remote resource, parameterized by the request
/// fingerprint recorded at fetch time.
///
/// The skip policy reads directly off this machine: a `Failed` attempt
/// suppresses automatic retries until the parameters change or the caller
/// forces a refetch.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum FetchPhase<P> {
    #[default]
    Idle,
    Loading(P),
    Ready(P),
    Failed(P),
}

impl<P: PartialEq> FetchPhase<P> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The fingerprint of the most recent attempt, whatever its outcome.
    pub fn params(&self) -> Option<&P> {
        match self {
            Self::Idle => None,
            Self::Loading(p) | Self::Ready(p) | Self::Failed(p) => Some(p),
        }
    }

    /// True when the last attempt failed with exactly these parameters.
    pub fn failed_with(&self, params: &P) -> bool {
        matches!(self, Self::Failed(p) if p == params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_cover_every_non_idle_phase() {
        assert_eq!(FetchPhase::<u32>::Idle.params(), None);
        assert_eq!(FetchPhase::Loading(1).params(), Some(&1));
        assert_eq!(FetchPhase::Ready(2).params(), Some(&2));
        assert_eq!(FetchPhase::Failed(3).params(), Some(&3));
    }

    #[test]
    fn failed_with_requires_matching_params() {
        let phase = FetchPhase::Failed("a".to_string());
        assert!(phase.failed_with(&"a".to_string()));
        assert!(!phase.failed_with(&"b".to_string()));
        assert!(!FetchPhase::Ready("a".to_string())
            .failed_with(&"a".to_string()));
    }
}
