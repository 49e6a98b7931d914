use payloads::{BLOOD_TYPE_ALL, DISTRICT_ANY};
use yewdux::prelude::*;

use super::StockParams;

/// User-selected search criteria.
///
/// Defaults mean "no filtering": empty strings for text fields, the "-1"
/// sentinel for the district, zero for the minimum quantity.
#[derive(Clone, PartialEq, Eq, Store)]
pub struct Filters {
    pub search_text: String,
    pub blood_type: String,
    pub state_id: String,
    pub district_id: String,
    pub min_quantity: u32,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            blood_type: String::new(),
            state_id: String::new(),
            district_id: DISTRICT_ANY.to_string(),
            min_quantity: 0,
        }
    }
}

impl Filters {
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    pub fn set_blood_type(&mut self, blood_type: impl Into<String>) {
        self.blood_type = blood_type.into();
    }

    pub fn set_district_id(&mut self, district_id: impl Into<String>) {
        self.district_id = district_id.into();
    }

    pub fn set_min_quantity(&mut self, min_quantity: u32) {
        self.min_quantity = min_quantity;
    }

    /// Select a state. Choosing a state invalidates any district choice, so
    /// the district resets to the sentinel in the same mutation.
    pub fn set_state_id(&mut self, state_id: impl Into<String>) {
        self.state_id = state_id.into();
        if !self.state_id.is_empty() {
            self.district_id = DISTRICT_ANY.to_string();
        }
    }

    /// Reset everything to defaults, optionally preserving the selected
    /// state so the stock list stays populated.
    pub fn clear(&mut self, keep_state: bool) {
        let state_id = if keep_state {
            std::mem::take(&mut self.state_id)
        } else {
            String::new()
        };
        *self = Self {
            state_id,
            ..Self::default()
        };
    }

    /// A state selection alone counts as active: it drives a server fetch.
    pub fn has_active_filters(&self) -> bool {
        !self.search_text.is_empty()
            || !self.blood_type.is_empty()
            || !self.state_id.is_empty()
            || self.district_id != DISTRICT_ANY
            || self.min_quantity > 0
    }

    /// The stock request fingerprint for the current selection, with the
    /// wire defaults filled in for unset fields.
    pub fn stock_params(&self) -> StockParams {
        StockParams {
            state_id: self.state_id.clone(),
            district_id: if self.district_id.is_empty() {
                DISTRICT_ANY.to_string()
            } else {
                self.district_id.clone()
            },
            blood_type: if self.blood_type.is_empty() {
                BLOOD_TYPE_ALL.to_string()
            } else {
                self.blood_type.clone()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selecting_a_state_resets_the_district() {
        let mut filters = Filters::default();
        filters.set_state_id("12");
        filters.set_district_id("34");
        assert_eq!(filters.district_id, "34");

        filters.set_state_id("56");
        assert_eq!(filters.state_id, "56");
        assert_eq!(filters.district_id, DISTRICT_ANY);
    }

    #[test]
    fn clearing_the_state_leaves_the_district_alone() {
        let mut filters = Filters::default();
        filters.set_state_id("12");
        filters.set_district_id("34");
        filters.set_state_id("");
        assert_eq!(filters.district_id, "34");
    }

    #[test]
    fn clear_can_keep_the_selected_state() {
        let mut filters = Filters::default();
        filters.set_state_id("12");
        filters.set_district_id("34");
        filters.set_search_text("apollo");
        filters.set_min_quantity(5);
        filters.set_blood_type("A+");

        filters.clear(true);
        assert_eq!(filters.state_id, "12");
        assert_eq!(filters.district_id, DISTRICT_ANY);
        assert!(filters.search_text.is_empty());
        assert!(filters.blood_type.is_empty());
        assert_eq!(filters.min_quantity, 0);

        filters.clear(false);
        assert!(filters.state_id.is_empty());
    }

    #[test]
    fn active_filter_detection() {
        let mut filters = Filters::default();
        assert!(!filters.has_active_filters());

        filters.set_state_id("12");
        assert!(filters.has_active_filters());

        let mut filters = Filters::default();
        filters.set_district_id("7");
        assert!(filters.has_active_filters());

        let mut filters = Filters::default();
        filters.set_min_quantity(1);
        assert!(filters.has_active_filters());
    }

    #[test]
    fn stock_params_fill_wire_defaults() {
        let mut filters = Filters::default();
        filters.set_state_id("12");
        let params = filters.stock_params();
        assert_eq!(params.state_id, "12");
        assert_eq!(params.district_id, DISTRICT_ANY);
        assert_eq!(params.blood_type, BLOOD_TYPE_ALL);

        filters.set_blood_type("A+");
        assert_eq!(filters.stock_params().blood_type, "A+");
    }
}
