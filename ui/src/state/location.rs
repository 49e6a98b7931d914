use payloads::{District, State};
use yewdux::prelude::*;

use super::FetchPhase;

/// Cache of fetched states and districts.
///
/// States are fetched once per session unless forced. Districts are keyed
/// by the owning state: switching states drops the previous list before the
/// replacement request is even issued, so stale cross-state entries are
/// never visible. Each resource carries an epoch so a response from a
/// superseded request is discarded instead of overwriting newer data.
#[derive(Clone, PartialEq, Store, Default)]
pub struct LocationCache {
    pub states: Vec<State>,
    pub districts: Vec<District>,
    pub states_phase: FetchPhase<()>,
    pub districts_phase: FetchPhase<String>,
    pub error: Option<String>,
    states_epoch: u64,
    districts_epoch: u64,
}

impl LocationCache {
    /// Start a states fetch, or `None` when the cache already answers:
    /// loaded, in flight, or failed without a forced retry.
    pub fn begin_states(&mut self, force: bool) -> Option<u64> {
        if !force
            && (self.states_phase.is_ready()
                || self.states_phase.is_loading()
                || self.states_phase.is_failed())
        {
            return None;
        }
        self.error = None;
        self.states_phase = FetchPhase::Loading(());
        self.states_epoch += 1;
        Some(self.states_epoch)
    }

    /// Apply a states outcome. Ignored when a newer fetch superseded the
    /// one that produced it.
    pub fn finish_states(
        &mut self,
        epoch: u64,
        result: Result<Vec<State>, String>,
    ) {
        if epoch != self.states_epoch {
            tracing::debug!(epoch, "discarding superseded states response");
            return;
        }
        match result {
            Ok(states) => {
                self.states = states;
                self.states_phase = FetchPhase::Ready(());
            }
            Err(message) => {
                self.error = Some(message);
                self.states_phase = FetchPhase::Failed(());
            }
        }
    }

    /// Start a districts fetch for `state_id`.
    ///
    /// An empty id clears the list synchronously with no request. A changed
    /// id unconditionally drops the old list and the failed latch before
    /// fetching. A failed attempt for the same id is not retried unless
    /// forced.
    pub fn begin_districts(
        &mut self,
        state_id: &str,
        force: bool,
    ) -> Option<u64> {
        if state_id.is_empty() {
            self.clear_districts();
            return None;
        }

        let state_changed =
            self.districts_phase.params().map(String::as_str) != Some(state_id);

        if !force && !state_changed {
            if self.districts_phase.is_failed()
                || self.districts_phase.is_loading()
            {
                return None;
            }
        }

        if state_changed {
            self.districts.clear();
        }
        self.error = None;
        self.districts_phase = FetchPhase::Loading(state_id.to_string());
        self.districts_epoch += 1;
        Some(self.districts_epoch)
    }

    /// Apply a districts outcome; the epoch and the state id must both
    /// still be current.
    pub fn finish_districts(
        &mut self,
        epoch: u64,
        state_id: &str,
        result: Result<Vec<District>, String>,
    ) {
        if epoch != self.districts_epoch
            || self.districts_phase.params().map(String::as_str)
                != Some(state_id)
        {
            tracing::debug!(
                epoch,
                state_id,
                "discarding superseded districts response"
            );
            return;
        }
        match result {
            Ok(districts) => {
                self.districts = districts;
                self.districts_phase =
                    FetchPhase::Ready(state_id.to_string());
            }
            Err(message) => {
                self.districts.clear();
                self.error = Some(message);
                self.districts_phase =
                    FetchPhase::Failed(state_id.to_string());
            }
        }
    }

    pub fn clear_districts(&mut self) {
        self.districts.clear();
        self.districts_phase = FetchPhase::Idle;
        self.error = None;
        // Invalidate any in-flight request.
        self.districts_epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(id: &str) -> State {
        State {
            state_id: id.to_string(),
            state_name: format!("State {id}"),
            state_code: format!("S{id}"),
        }
    }

    fn district(id: &str, state_id: &str) -> District {
        District {
            district_id: id.to_string(),
            district_name: format!("District {id}"),
            district_code: format!("D{id}"),
            state_id: state_id.to_string(),
        }
    }

    #[test]
    fn states_fetch_once_unless_forced() {
        let mut cache = LocationCache::default();

        let epoch = cache.begin_states(false).expect("first fetch starts");
        cache.finish_states(epoch, Ok(vec![state("1")]));
        assert!(cache.states_phase.is_ready());

        assert_eq!(cache.begin_states(false), None);
        assert!(cache.begin_states(true).is_some());
    }

    #[test]
    fn failed_states_are_not_retried_without_force() {
        let mut cache = LocationCache::default();

        let epoch = cache.begin_states(false).unwrap();
        cache.finish_states(epoch, Err("boom".into()));
        assert!(cache.states_phase.is_failed());
        assert_eq!(cache.error.as_deref(), Some("boom"));

        assert_eq!(cache.begin_states(false), None);
        let epoch = cache.begin_states(true).expect("force retries");
        assert!(cache.error.is_none());
        cache.finish_states(epoch, Ok(vec![state("1")]));
        assert_eq!(cache.states.len(), 1);
    }

    #[test]
    fn stale_states_response_is_discarded() {
        let mut cache = LocationCache::default();

        let first = cache.begin_states(false).unwrap();
        let second = cache.begin_states(true).unwrap();
        assert_ne!(first, second);

        cache.finish_states(second, Ok(vec![state("2")]));
        // The slower first request resolves afterwards and must not win.
        cache.finish_states(first, Ok(vec![state("1")]));
        assert_eq!(cache.states[0].state_id, "2");
    }

    #[test]
    fn switching_states_clears_districts_immediately() {
        let mut cache = LocationCache::default();

        let epoch = cache.begin_districts("A", false).unwrap();
        cache.finish_districts(epoch, "A", Ok(vec![district("1", "A")]));
        assert_eq!(cache.districts.len(), 1);

        // Old list is gone before the new response arrives.
        let epoch_b = cache.begin_districts("B", false).unwrap();
        assert!(cache.districts.is_empty());

        cache.finish_districts(epoch_b, "B", Ok(vec![district("2", "B")]));
        assert!(cache.districts.iter().all(|d| d.state_id == "B"));
    }

    #[test]
    fn late_response_for_previous_state_never_leaks() {
        let mut cache = LocationCache::default();

        let epoch_a = cache.begin_districts("A", false).unwrap();
        let epoch_b = cache.begin_districts("B", false).unwrap();

        cache.finish_districts(epoch_b, "B", Ok(vec![district("2", "B")]));
        // State A's request resolves after the switch to B.
        cache.finish_districts(epoch_a, "A", Ok(vec![district("1", "A")]));

        assert_eq!(cache.districts.len(), 1);
        assert_eq!(cache.districts[0].state_id, "B");
    }

    #[test]
    fn failed_districts_skip_only_for_the_same_state() {
        let mut cache = LocationCache::default();

        let epoch = cache.begin_districts("A", false).unwrap();
        cache.finish_districts(epoch, "A", Err("down".into()));
        assert!(cache.districts_phase.is_failed());

        assert_eq!(cache.begin_districts("A", false), None);
        assert!(cache.begin_districts("A", true).is_some());

        let mut cache = LocationCache::default();
        let epoch = cache.begin_districts("A", false).unwrap();
        cache.finish_districts(epoch, "A", Err("down".into()));
        // A different state re-enables fetching without force.
        assert!(cache.begin_districts("B", false).is_some());
        assert!(cache.error.is_none());
    }

    #[test]
    fn empty_state_clears_synchronously() {
        let mut cache = LocationCache::default();
        let epoch = cache.begin_districts("A", false).unwrap();
        cache.finish_districts(epoch, "A", Ok(vec![district("1", "A")]));

        assert_eq!(cache.begin_districts("", false), None);
        assert!(cache.districts.is_empty());
        assert_eq!(cache.districts_phase, FetchPhase::Idle);

        // The cleared epoch also orphans any in-flight response.
        cache.finish_districts(epoch, "A", Ok(vec![district("1", "A")]));
        assert!(cache.districts.is_empty());
    }
}
