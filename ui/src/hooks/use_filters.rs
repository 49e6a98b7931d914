use yew::prelude::*;
use yewdux::prelude::*;

use crate::state::Filters;

/// Hook return type exposing the filter criteria and their mutations
pub struct FiltersHandle {
    pub search_text: String,
    pub blood_type: String,
    pub state_id: String,
    pub district_id: String,
    pub min_quantity: u32,
    pub has_active_filters: bool,

    pub set_search_text: Callback<String>,
    pub set_blood_type: Callback<String>,
    pub set_state_id: Callback<String>,
    pub set_district_id: Callback<String>,
    pub set_min_quantity: Callback<u32>,
    /// Reset the criteria; `true` keeps the selected state.
    pub clear: Callback<bool>,
}

/// Hook to manage the filter criteria store.
#[hook]
pub fn use_filters() -> FiltersHandle {
    let (filters, dispatch) = use_store::<Filters>();

    FiltersHandle {
        search_text: filters.search_text.clone(),
        blood_type: filters.blood_type.clone(),
        state_id: filters.state_id.clone(),
        district_id: filters.district_id.clone(),
        min_quantity: filters.min_quantity,
        has_active_filters: filters.has_active_filters(),

        set_search_text: dispatch.reduce_mut_callback_with(
            |filters, text: String| filters.set_search_text(text),
        ),
        set_blood_type: dispatch.reduce_mut_callback_with(
            |filters, blood_type: String| {
                filters.set_blood_type(blood_type)
            },
        ),
        set_state_id: dispatch.reduce_mut_callback_with(
            |filters, state_id: String| filters.set_state_id(state_id),
        ),
        set_district_id: dispatch.reduce_mut_callback_with(
            |filters, district_id: String| {
                filters.set_district_id(district_id)
            },
        ),
        set_min_quantity: dispatch.reduce_mut_callback_with(
            |filters, min_quantity: u32| {
                filters.set_min_quantity(min_quantity)
            },
        ),
        clear: dispatch.reduce_mut_callback_with(
            |filters, keep_state: bool| filters.clear(keep_state),
        ),
    }
}
