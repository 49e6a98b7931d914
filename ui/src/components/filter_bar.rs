use payloads::DISTRICT_ANY;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::hooks::{use_districts, use_filters, use_states};

#[derive(Properties, PartialEq)]
pub struct Props {
    /// Selector options derived from the current stock list.
    pub blood_types: Vec<String>,
}

/// The search criteria bar: free-text search, state, district, blood type
/// and minimum quantity, plus a clear action.
#[function_component]
pub fn FilterBar(props: &Props) -> Html {
    let filters = use_filters();
    let states_hook = use_states();
    let districts_hook = use_districts(filters.state_id.clone());

    let on_search_input = {
        let set_search_text = filters.set_search_text.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            set_search_text.emit(input.value());
        })
    };

    let on_state_change = {
        let set_state_id = filters.set_state_id.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            set_state_id.emit(select.value());
        })
    };

    let on_district_change = {
        let set_district_id = filters.set_district_id.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            set_district_id.emit(select.value());
        })
    };

    let on_blood_type_change = {
        let set_blood_type = filters.set_blood_type.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            set_blood_type.emit(select.value());
        })
    };

    let on_min_quantity_input = {
        let set_min_quantity = filters.set_min_quantity.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            set_min_quantity.emit(input.value().parse().unwrap_or(0));
        })
    };

    let on_clear = {
        let clear = filters.clear.clone();
        Callback::from(move |_: MouseEvent| clear.emit(true))
    };

    let input_class = "w-full px-3 py-2 rounded-md border \
                       border-neutral-300 dark:border-neutral-600 \
                       bg-white dark:bg-neutral-800 text-sm \
                       text-neutral-900 dark:text-neutral-100";

    html! {
        <div class="p-4 rounded-lg border border-neutral-200 \
                    dark:border-neutral-700 bg-white dark:bg-neutral-800/50">
            <div class="grid grid-cols-1 md:grid-cols-5 gap-3">
                <input
                    type="text"
                    class={input_class}
                    placeholder="Search bank or address..."
                    value={filters.search_text.clone()}
                    oninput={on_search_input}
                />

                <select
                    class={input_class}
                    onchange={on_state_change}
                    value={filters.state_id.clone()}
                >
                    <option value="" selected={filters.state_id.is_empty()}>
                        {"Select state"}
                    </option>
                    { for states_hook.states.iter().map(|state| html! {
                        <option
                            value={state.state_id.clone()}
                            selected={state.state_id == filters.state_id}
                        >
                            {&state.state_name}
                        </option>
                    })}
                </select>

                <select
                    class={input_class}
                    onchange={on_district_change}
                    disabled={filters.state_id.is_empty()}
                >
                    <option
                        value={DISTRICT_ANY}
                        selected={filters.district_id == DISTRICT_ANY}
                    >
                        {"All districts"}
                    </option>
                    { for districts_hook.districts.iter().map(|district| html! {
                        <option
                            value={district.district_id.clone()}
                            selected={district.district_id == filters.district_id}
                        >
                            {&district.district_name}
                        </option>
                    })}
                </select>

                <select class={input_class} onchange={on_blood_type_change}>
                    <option value="" selected={filters.blood_type.is_empty()}>
                        {"All blood types"}
                    </option>
                    { for props.blood_types.iter().map(|blood_type| html! {
                        <option
                            value={blood_type.clone()}
                            selected={*blood_type == filters.blood_type}
                        >
                            {blood_type}
                        </option>
                    })}
                </select>

                <input
                    type="number"
                    min="0"
                    class={input_class}
                    placeholder="Min units"
                    value={filters.min_quantity.to_string()}
                    oninput={on_min_quantity_input}
                />
            </div>

            <div class="flex items-center justify-between mt-3">
                <div class="text-xs text-neutral-500 dark:text-neutral-400">
                    { if states_hook.is_loading {
                        html! { <span>{"Loading states..."}</span> }
                    } else if districts_hook.is_loading {
                        html! { <span>{"Loading districts..."}</span> }
                    } else if states_hook.failed || districts_hook.failed {
                        let refetch = if states_hook.failed {
                            states_hook.refetch.clone()
                        } else {
                            districts_hook.refetch.clone()
                        };
                        let on_retry = Callback::from(move |_: MouseEvent| {
                            refetch.emit(());
                        });
                        html! {
                            <span class="text-red-600 dark:text-red-400">
                                {"Couldn't load locations. "}
                                <button
                                    class="underline"
                                    onclick={on_retry}
                                >
                                    {"Retry"}
                                </button>
                            </span>
                        }
                    } else {
                        html! {}
                    }}
                </div>
                { if filters.has_active_filters {
                    html! {
                        <button
                            onclick={on_clear}
                            class="px-3 py-1.5 text-sm font-medium rounded-md \
                                   border border-neutral-300 \
                                   dark:border-neutral-600 \
                                   text-neutral-700 dark:text-neutral-300 \
                                   hover:bg-neutral-50 \
                                   dark:hover:bg-neutral-700"
                        >
                            {"Clear filters"}
                        </button>
                    }
                } else {
                    html! {}
                }}
            </div>
        </div>
    }
}
