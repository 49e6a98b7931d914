use payloads::District;
use yew::prelude::*;
use yewdux::prelude::*;

use crate::get_directory_client;
use crate::state::LocationCache;

/// Hook return type for the districts of the selected state
pub struct DistrictsHookReturn {
    pub districts: Vec<District>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub failed: bool,
    pub refetch: Callback<()>,
}

/// Hook to manage districts for the given state.
///
/// Refetches whenever the state changes; the store drops the previous
/// state's districts before the request goes out. An empty state id clears
/// the list with no request.
#[hook]
pub fn use_districts(state_id: String) -> DistrictsHookReturn {
    let (cache, dispatch) = use_store::<LocationCache>();

    let fetch = {
        let dispatch = dispatch.clone();
        use_callback(state_id.clone(), move |force: bool, state_id| {
            let state_id = state_id.clone();
            let mut token = None;
            dispatch.reduce_mut(|cache| {
                token = cache.begin_districts(&state_id, force);
            });
            let Some(epoch) = token else {
                return;
            };

            let dispatch = dispatch.clone();
            yew::platform::spawn_local(async move {
                let api_client = get_directory_client();
                let result = api_client
                    .list_districts(&state_id)
                    .await
                    .map(|response| response.districts)
                    .map_err(|e| e.to_string());
                dispatch.reduce_mut(|cache| {
                    cache.finish_districts(epoch, &state_id, result);
                });
            });
        })
    };

    {
        let fetch = fetch.clone();
        use_effect_with(state_id, move |_| {
            fetch.emit(false);
        });
    }

    DistrictsHookReturn {
        districts: cache.districts.clone(),
        is_loading: cache.districts_phase.is_loading(),
        error: cache.error.clone(),
        failed: cache.districts_phase.is_failed(),
        refetch: Callback::from(move |_| fetch.emit(true)),
    }
}
