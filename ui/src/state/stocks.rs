use std::collections::BTreeSet;

use payloads::{BloodStock, display_blood_type};
use yewdux::prelude::*;

use super::FetchPhase;

/// Request fingerprint for one stock fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StockParams {
    pub state_id: String,
    pub district_id: String,
    pub blood_type: String,
}

/// Half-open index window over the filtered list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
}

impl Default for VisibleRange {
    fn default() -> Self {
        Self { start: 0, end: 10 }
    }
}

/// Outcome of asking the cache whether a fetch should run.
#[derive(Debug, PartialEq, Eq)]
pub enum FetchDecision {
    /// Failed before with the same parameters and not forced.
    Skip,
    /// No state selected; the cache was emptied with no request.
    Cleared,
    /// Issue the request and report back with this epoch.
    Start(u64),
}

/// Cache of the remote stock list plus the locally filtered view of it.
///
/// Only the fetch is network-bound; the filter pass, the blood type catalog
/// and the stats are derived in full from the cached snapshot.
#[derive(Clone, PartialEq, Store, Default)]
pub struct StockCache {
    pub stocks: Vec<BloodStock>,
    pub filtered: Vec<BloodStock>,
    pub visible_range: VisibleRange,
    pub phase: FetchPhase<StockParams>,
    pub error: Option<String>,
    epoch: u64,
}

/// Aggregates over the filtered list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Stats {
    pub total_units: u64,
    pub available_banks: usize,
    pub unique_blood_types: usize,
}

impl StockCache {
    /// Decide whether a fetch for `params` should run.
    ///
    /// An empty state clears the cache outright. A previous failure with
    /// unchanged parameters suppresses the request unless forced; any
    /// parameter change re-enables fetching.
    pub fn begin_fetch(
        &mut self,
        params: StockParams,
        force: bool,
    ) -> FetchDecision {
        if params.state_id.is_empty() {
            self.stocks.clear();
            self.filtered.clear();
            self.visible_range = VisibleRange::default();
            self.phase = FetchPhase::Idle;
            self.error = None;
            self.epoch += 1;
            return FetchDecision::Cleared;
        }

        let params_unchanged = self.phase.params() == Some(&params);
        if !force && params_unchanged {
            if self.phase.is_failed() {
                return FetchDecision::Skip;
            }
            if self.phase.is_loading() {
                return FetchDecision::Skip;
            }
        }

        self.error = None;
        self.phase = FetchPhase::Loading(params);
        self.epoch += 1;
        FetchDecision::Start(self.epoch)
    }

    /// Apply a fetch outcome. A response from a superseded request is
    /// discarded; the newest request always owns the cache.
    pub fn finish_fetch(
        &mut self,
        epoch: u64,
        params: &StockParams,
        result: Result<Vec<BloodStock>, String>,
    ) {
        if epoch != self.epoch {
            tracing::debug!(epoch, "discarding superseded stock response");
            return;
        }
        match result {
            Ok(stocks) => {
                self.filtered = stocks.clone();
                self.stocks = stocks;
                self.visible_range = VisibleRange::default();
                self.phase = FetchPhase::Ready(params.clone());
            }
            Err(message) => {
                self.stocks.clear();
                self.filtered.clear();
                self.error = Some(message);
                self.phase = FetchPhase::Failed(params.clone());
            }
        }
    }

    /// Recompute the filtered view from the raw list.
    ///
    /// Search text matches bank name or address, case-insensitively. A
    /// positive minimum quantity keeps only stocks whose summed units reach
    /// it, which excludes banks that reported no component data at all. The
    /// window resets so it can never point past the fresh list.
    pub fn apply_filter(&mut self, search_text: &str, min_quantity: u32) {
        let needle = search_text.to_lowercase();
        self.filtered = self
            .stocks
            .iter()
            .filter(|stock| {
                needle.is_empty()
                    || stock
                        .blood_bank_name
                        .to_lowercase()
                        .contains(&needle)
                    || stock.address.to_lowercase().contains(&needle)
            })
            .filter(|stock| {
                min_quantity == 0 || stock.total_units() >= min_quantity
            })
            .cloned()
            .collect();
        self.visible_range = VisibleRange::default();
    }

    /// Sorted, de-duplicated display labels over the raw list, independent
    /// of the current filtering, for the type selector.
    pub fn blood_type_catalog(&self) -> Vec<String> {
        let labels: BTreeSet<String> = self
            .stocks
            .iter()
            .filter_map(|stock| stock.blood_groups.as_ref())
            .flat_map(|groups| groups.keys())
            .map(|label| display_blood_type(label))
            .collect();
        labels.into_iter().collect()
    }

    /// Aggregates over the filtered list. The distinct type count uses the
    /// raw component labels.
    pub fn stats(&self) -> Stats {
        let total_units = self
            .filtered
            .iter()
            .map(|stock| u64::from(stock.total_units()))
            .sum();
        let unique: BTreeSet<&str> = self
            .filtered
            .iter()
            .filter_map(|stock| stock.blood_groups.as_ref())
            .flat_map(|groups| groups.keys())
            .map(String::as_str)
            .collect();
        Stats {
            total_units,
            available_banks: self.filtered.len(),
            unique_blood_types: unique.len(),
        }
    }

    pub fn set_visible_range(&mut self, range: VisibleRange) {
        self.visible_range = range;
    }

    pub fn is_loading(&self) -> bool {
        self.phase.is_loading()
    }

    pub fn is_failed(&self) -> bool {
        self.phase.is_failed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(state: &str) -> StockParams {
        StockParams {
            state_id: state.to_string(),
            district_id: "-1".to_string(),
            blood_type: "all".to_string(),
        }
    }

    fn stock(name: &str, address: &str, groups: &[(&str, u32)]) -> BloodStock {
        BloodStock {
            blood_bank_name: name.to_string(),
            address: address.to_string(),
            contact: "000".to_string(),
            blood_groups: if groups.is_empty() {
                None
            } else {
                Some(
                    groups
                        .iter()
                        .map(|(k, v)| (k.to_string(), *v))
                        .collect(),
                )
            },
            ..Default::default()
        }
    }

    #[test]
    fn empty_state_clears_without_a_request() {
        let mut cache = StockCache::default();
        let epoch = match cache.begin_fetch(params("12"), false) {
            FetchDecision::Start(epoch) => epoch,
            other => panic!("expected start, got {other:?}"),
        };
        cache.finish_fetch(
            epoch,
            &params("12"),
            Ok(vec![stock("A", "addr", &[("O+Ve", 1)])]),
        );
        assert_eq!(cache.filtered.len(), 1);

        assert_eq!(
            cache.begin_fetch(params(""), false),
            FetchDecision::Cleared
        );
        assert!(cache.stocks.is_empty());
        assert!(cache.filtered.is_empty());
        assert_eq!(cache.phase, FetchPhase::Idle);
    }

    #[test]
    fn failure_with_same_params_is_not_retried() {
        let mut cache = StockCache::default();

        let FetchDecision::Start(epoch) =
            cache.begin_fetch(params("12"), false)
        else {
            panic!("expected start");
        };
        cache.finish_fetch(epoch, &params("12"), Err("500".into()));
        assert!(cache.is_failed());
        assert_eq!(cache.error.as_deref(), Some("500"));
        assert!(cache.stocks.is_empty());

        // Identical params, unforced: exactly zero further requests.
        assert_eq!(
            cache.begin_fetch(params("12"), false),
            FetchDecision::Skip
        );
        // Forced: fetch regardless of failure history.
        assert!(matches!(
            cache.begin_fetch(params("12"), true),
            FetchDecision::Start(_)
        ));
    }

    #[test]
    fn changed_params_clear_the_failed_latch() {
        let mut cache = StockCache::default();
        let FetchDecision::Start(epoch) =
            cache.begin_fetch(params("12"), false)
        else {
            panic!("expected start");
        };
        cache.finish_fetch(epoch, &params("12"), Err("500".into()));

        let next = StockParams {
            blood_type: "A+".to_string(),
            ..params("12")
        };
        assert!(matches!(
            cache.begin_fetch(next, false),
            FetchDecision::Start(_)
        ));
        assert!(cache.error.is_none());
    }

    #[test]
    fn success_resets_the_window() {
        let mut cache = StockCache::default();
        cache.set_visible_range(VisibleRange { start: 40, end: 55 });

        let FetchDecision::Start(epoch) =
            cache.begin_fetch(params("12"), false)
        else {
            panic!("expected start");
        };
        cache.finish_fetch(
            epoch,
            &params("12"),
            Ok(vec![stock("A", "addr", &[("O+Ve", 1)])]),
        );
        assert_eq!(cache.visible_range, VisibleRange::default());
    }

    #[test]
    fn stale_stock_response_is_discarded() {
        let mut cache = StockCache::default();
        let FetchDecision::Start(first) =
            cache.begin_fetch(params("12"), false)
        else {
            panic!("expected start");
        };
        let FetchDecision::Start(second) =
            cache.begin_fetch(params("34"), false)
        else {
            panic!("expected start");
        };

        cache.finish_fetch(
            second,
            &params("34"),
            Ok(vec![stock("New", "addr", &[])]),
        );
        cache.finish_fetch(
            first,
            &params("12"),
            Ok(vec![stock("Old", "addr", &[])]),
        );
        assert_eq!(cache.stocks[0].blood_bank_name, "New");
        assert_eq!(cache.phase.params(), Some(&params("34")));
    }

    #[test]
    fn search_matches_name_or_address() {
        let mut cache = StockCache::default();
        cache.stocks = vec![
            stock(
                "Apollo Blood Center",
                "Apollo Hospital, Sector 5",
                &[("O+Ve", 5)],
            ),
            stock("Red Cross Blood Bank", "Main Street", &[("A+Ve", 2)]),
        ];

        cache.apply_filter("apollo", 0);
        assert_eq!(cache.filtered.len(), 1);
        assert_eq!(cache.filtered[0].blood_bank_name, "Apollo Blood Center");

        // Matching the address alone is enough.
        cache.apply_filter("main street", 0);
        assert_eq!(cache.filtered.len(), 1);
        assert_eq!(cache.filtered[0].blood_bank_name, "Red Cross Blood Bank");
    }

    #[test]
    fn min_quantity_excludes_small_and_groupless_stocks() {
        let mut cache = StockCache::default();
        cache.stocks = vec![
            stock("Big", "a", &[("O+Ve", 5), ("A+Ve", 2)]),
            stock("Small", "b", &[("B+Ve", 1)]),
            stock("Unknown", "c", &[]),
        ];

        cache.apply_filter("", 2);
        let names: Vec<_> = cache
            .filtered
            .iter()
            .map(|s| s.blood_bank_name.as_str())
            .collect();
        assert_eq!(names, vec!["Big"]);

        // Without a minimum, groupless stocks stay visible.
        cache.apply_filter("", 0);
        assert_eq!(cache.filtered.len(), 3);
    }

    #[test]
    fn filtering_resets_the_window() {
        let mut cache = StockCache::default();
        cache.stocks =
            vec![stock("Big", "a", &[("O+Ve", 5)]); 40];
        cache.set_visible_range(VisibleRange { start: 20, end: 35 });
        cache.apply_filter("big", 0);
        assert_eq!(cache.visible_range, VisibleRange::default());
    }

    #[test]
    fn catalog_is_normalized_sorted_and_deduplicated() {
        let mut cache = StockCache::default();
        cache.stocks = vec![
            stock("A", "a", &[("O+Ve", 5), ("A+Ve", 2)]),
            stock("B", "b", &[("A+Ve", 1), ("AB-Ve", 1)]),
            stock("C", "c", &[]),
        ];
        // Filtering does not narrow the catalog.
        cache.apply_filter("nothing-matches", 0);
        assert_eq!(cache.blood_type_catalog(), vec!["A+", "AB-", "O+"]);
    }

    #[test]
    fn stats_cover_the_filtered_list() {
        let mut cache = StockCache::default();
        cache.stocks = vec![
            stock("A", "a", &[("O+Ve", 5), ("A+Ve", 2)]),
            stock("B", "b", &[("B+Ve", 1)]),
        ];
        cache.apply_filter("", 0);
        let stats = cache.stats();
        assert_eq!(stats.total_units, 8);
        assert_eq!(stats.available_banks, 2);
        assert_eq!(stats.unique_blood_types, 3);

        cache.apply_filter("A", 0);
        assert_eq!(cache.stats().available_banks, 1);
    }
}
