use payloads::BloodStock;
use yew::prelude::*;
use yewdux::prelude::*;

use crate::get_directory_client;
use crate::state::{
    FetchDecision, Filters, StockCache, StockParams, Stats, VisibleRange,
};

/// Hook return type for the stock list pipeline
pub struct StocksHookReturn {
    /// The locally filtered list driving the rendered cards.
    pub stocks: Vec<BloodStock>,
    pub visible_range: VisibleRange,
    pub is_loading: bool,
    pub error: Option<String>,
    pub failed: bool,
    /// Selector options derived from the raw (unfiltered) list.
    pub blood_types: Vec<String>,
    pub stats: Stats,
    pub refetch: Callback<()>,
    pub set_visible_range: Callback<VisibleRange>,
}

/// Hook driving the stock cache and the local filter pipeline.
///
/// Refetches when the server-side selection (state, district, blood type)
/// changes and re-runs the pure filter pass when the search text, the
/// minimum quantity, or the raw list change. Everything else is derived
/// per render from the cached snapshot.
#[hook]
pub fn use_stocks() -> StocksHookReturn {
    let (filters, _) = use_store::<Filters>();
    let (cache, dispatch) = use_store::<StockCache>();

    let params = filters.stock_params();

    let fetch = {
        let dispatch = dispatch.clone();
        use_callback(params.clone(), move |force: bool, params| {
            let params: StockParams = params.clone();
            let mut decision = FetchDecision::Skip;
            dispatch.reduce_mut(|cache| {
                decision = cache.begin_fetch(params.clone(), force);
            });
            let FetchDecision::Start(epoch) = decision else {
                return;
            };

            let dispatch = dispatch.clone();
            yew::platform::spawn_local(async move {
                let api_client = get_directory_client();
                let result = api_client
                    .list_stock_nearby(
                        &params.state_id,
                        &params.district_id,
                        &params.blood_type,
                    )
                    .await
                    .map(|response| response.stocks)
                    .map_err(|e| e.to_string());
                dispatch.reduce_mut(|cache| {
                    cache.finish_fetch(epoch, &params, result);
                });
            });
        })
    };

    // Fetch when the server-side selection changes.
    {
        let fetch = fetch.clone();
        use_effect_with(params, move |_| {
            fetch.emit(false);
        });
    }

    // Local filter pass: no network involved.
    {
        let dispatch = dispatch.clone();
        use_effect_with(
            (
                filters.search_text.clone(),
                filters.min_quantity,
                cache.stocks.clone(),
            ),
            move |(search_text, min_quantity, _)| {
                let search_text = search_text.clone();
                let min_quantity = *min_quantity;
                dispatch.reduce_mut(|cache| {
                    cache.apply_filter(&search_text, min_quantity);
                });
            },
        );
    }

    let set_visible_range = {
        let dispatch = dispatch.clone();
        dispatch.reduce_mut_callback_with(
            |cache, range: VisibleRange| cache.set_visible_range(range),
        )
    };

    StocksHookReturn {
        stocks: cache.filtered.clone(),
        visible_range: cache.visible_range,
        is_loading: cache.is_loading(),
        error: cache.error.clone(),
        failed: cache.is_failed(),
        blood_types: cache.blood_type_catalog(),
        stats: cache.stats(),
        refetch: Callback::from(move |_| fetch.emit(true)),
        set_visible_range,
    }
}
