use payloads::State;
use yew::prelude::*;
use yewdux::prelude::*;

use crate::get_directory_client;
use crate::state::LocationCache;

/// Hook return type for the states list
pub struct StatesHookReturn {
    pub states: Vec<State>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub failed: bool,
    pub refetch: Callback<()>,
}

/// Hook to manage the states list with fetch-once caching.
///
/// Fetches on first mount; a failed attempt is not retried automatically.
/// `refetch` forces a fresh request regardless of history.
#[hook]
pub fn use_states() -> StatesHookReturn {
    let (cache, dispatch) = use_store::<LocationCache>();

    let fetch = {
        let dispatch = dispatch.clone();
        use_callback((), move |force: bool, _| {
            let mut token = None;
            dispatch.reduce_mut(|cache| token = cache.begin_states(force));
            let Some(epoch) = token else {
                return;
            };

            let dispatch = dispatch.clone();
            yew::platform::spawn_local(async move {
                let api_client = get_directory_client();
                let result = api_client
                    .list_states()
                    .await
                    .map(|response| response.states)
                    .map_err(|e| e.to_string());
                dispatch
                    .reduce_mut(|cache| cache.finish_states(epoch, result));
            });
        })
    };

    {
        let fetch = fetch.clone();
        use_effect_with((), move |_| {
            fetch.emit(false);
        });
    }

    StatesHookReturn {
        states: cache.states.clone(),
        is_loading: cache.states_phase.is_loading(),
        error: cache.error.clone(),
        failed: cache.states_phase.is_failed(),
        refetch: Callback::from(move |_| fetch.emit(true)),
    }
}
