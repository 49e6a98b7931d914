use payloads::{BloodStock, LOW_STOCK_THRESHOLD, display_blood_type};
use yew::prelude::*;

use crate::components::FilterBar;
use crate::hooks::{use_filters, use_stocks};
use crate::windowing::{clamp, compute_window};

/// Every card is rendered at exactly this height so the scroll geometry
/// stays arithmetic.
const CARD_HEIGHT: u32 = 280;
const SCROLL_BUFFER: usize = 2;

/// The searchable, virtualized blood bank inventory page.
#[function_component]
pub fn InventoryPage() -> Html {
    let stocks_hook = use_stocks();
    let filters = use_filters();

    let onscroll = {
        let set_visible_range = stocks_hook.set_visible_range.clone();
        Callback::from(move |event: Event| {
            let Some(element) =
                event.target_dyn_into::<web_sys::Element>()
            else {
                return;
            };
            let scroll_top = element.scroll_top().max(0.0) as u32;
            let viewport_height = element.client_height().max(0) as u32;
            set_visible_range.emit(compute_window(
                viewport_height,
                scroll_top,
                CARD_HEIGHT,
                SCROLL_BUFFER,
            ));
        })
    };

    let total = stocks_hook.stocks.len();
    let range = clamp(stocks_hook.visible_range, total);
    let visible = &stocks_hook.stocks[range.start..range.end];
    let offset_y = range.start as u32 * CARD_HEIGHT;
    let total_height = total as u32 * CARD_HEIGHT;

    let stats = stocks_hook.stats;

    let on_retry = {
        let refetch = stocks_hook.refetch.clone();
        Callback::from(move |_: MouseEvent| refetch.emit(()))
    };

    html! {
        <div class="space-y-8">
            <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
                <StatCard
                    label="Total Units"
                    value={stats.total_units.to_string()}
                />
                <StatCard
                    label="Blood Banks"
                    value={stats.available_banks.to_string()}
                />
                <StatCard
                    label="Blood Types"
                    value={stats.unique_blood_types.to_string()}
                />
            </div>

            <FilterBar blood_types={stocks_hook.blood_types.clone()} />

            <div>
                <h2 class="text-lg font-semibold text-neutral-900 \
                           dark:text-neutral-100">
                    {"Available Blood Banks"}
                </h2>
                <p class="text-sm text-neutral-600 dark:text-neutral-400 mt-1">
                    {format!(
                        "Showing {} of {} result{}",
                        visible.len(),
                        total,
                        if total == 1 { "" } else { "s" }
                    )}
                </p>
            </div>

            { if stocks_hook.is_loading {
                html! {
                    <div class="text-center py-12">
                        <p class="text-neutral-600 dark:text-neutral-400">
                            {"Loading blood banks..."}
                        </p>
                    </div>
                }
            } else if let Some(error) = &stocks_hook.error {
                html! {
                    <div class="p-4 rounded-md bg-red-50 dark:bg-red-900/20 \
                                border border-red-200 dark:border-red-800">
                        <p class="text-sm font-semibold text-red-700 \
                                  dark:text-red-400">
                            {"Error loading blood banks"}
                        </p>
                        <p class="text-sm text-red-700 dark:text-red-400 mt-1">
                            {error.clone()}
                        </p>
                        <button
                            onclick={on_retry}
                            class="mt-3 px-3 py-1.5 text-sm font-medium \
                                   rounded-md border border-red-300 \
                                   dark:border-red-700 text-red-700 \
                                   dark:text-red-300"
                        >
                            {"Try again"}
                        </button>
                    </div>
                }
            } else {
                html! {
                    <div
                        onscroll={onscroll}
                        class="h-[600px] overflow-y-auto rounded-lg border \
                               border-neutral-200 dark:border-neutral-700 \
                               bg-white/50 dark:bg-neutral-900/50"
                    >
                        { if total > 0 {
                            html! {
                                <div style={format!("height: {total_height}px;")}>
                                    <div style={format!(
                                        "transform: translateY({offset_y}px);"
                                    )}>
                                        { for visible.iter().map(|stock| html! {
                                            <StockCard stock={stock.clone()} />
                                        })}
                                    </div>
                                </div>
                            }
                        } else {
                            html! {
                                <div class="h-full flex items-center \
                                            justify-center text-center">
                                    <div>
                                        <p class="font-semibold text-neutral-600 \
                                                  dark:text-neutral-400">
                                            {"No blood banks found"}
                                        </p>
                                        <p class="text-sm text-neutral-500 \
                                                  dark:text-neutral-500 mt-2">
                                            { if filters.state_id.is_empty() {
                                                "Please select a state to view \
                                                 available blood banks"
                                            } else {
                                                "Try adjusting your filters or \
                                                 search terms"
                                            }}
                                        </p>
                                    </div>
                                </div>
                            }
                        }}
                    </div>
                }
            }}
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct StatCardProps {
    label: &'static str,
    value: String,
}

#[function_component]
fn StatCard(props: &StatCardProps) -> Html {
    html! {
        <div class="p-6 rounded-lg border border-neutral-200 \
                    dark:border-neutral-700 bg-white dark:bg-neutral-800/50">
            <p class="text-sm font-medium text-neutral-500 \
                      dark:text-neutral-400">
                {props.label}
            </p>
            <p class="text-3xl font-bold text-neutral-900 \
                      dark:text-neutral-100 mt-2">
                {&props.value}
            </p>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct StockCardProps {
    stock: BloodStock,
}

#[function_component]
fn StockCard(props: &StockCardProps) -> Html {
    let stock = &props.stock;
    let total_quantity = stock.total_units();
    let groups = stock.blood_groups.clone().unwrap_or_default();

    html! {
        <div
            class="px-4 py-2"
            style={format!("height: {CARD_HEIGHT}px;")}
        >
            <div class="h-full overflow-hidden rounded-lg border \
                        border-neutral-200 dark:border-neutral-700 \
                        bg-white dark:bg-neutral-800 p-4">
                <div class="flex items-start justify-between gap-4">
                    <div>
                        <h3 class="text-lg font-semibold text-neutral-900 \
                                   dark:text-neutral-100">
                            {&stock.blood_bank_name}
                        </h3>
                        <p class="text-sm text-neutral-600 \
                                  dark:text-neutral-400 mt-1">
                            {&stock.address}
                        </p>
                    </div>
                    { if total_quantity > 0 {
                        html! {
                            <span class="shrink-0 px-3 py-1.5 rounded-md \
                                         text-sm font-bold bg-red-50 \
                                         dark:bg-red-900/20 text-red-700 \
                                         dark:text-red-400 border \
                                         border-red-200 dark:border-red-800">
                                {format!("{total_quantity} Units")}
                            </span>
                        }
                    } else {
                        html! {}
                    }}
                </div>

                { if groups.is_empty() {
                    html! {
                        <p class="text-sm text-neutral-500 \
                                  dark:text-neutral-500 mt-4">
                            {"No blood group information available"}
                        </p>
                    }
                } else {
                    html! {
                        <div class="grid grid-cols-4 gap-2 mt-4">
                            { for groups.iter().map(|(label, quantity)| {
                                let low = *quantity < LOW_STOCK_THRESHOLD;
                                html! {
                                    <div class="p-2 rounded-md border \
                                                border-neutral-200 \
                                                dark:border-neutral-700 \
                                                text-center">
                                        <p class="font-bold text-neutral-900 \
                                                  dark:text-neutral-100">
                                            {display_blood_type(label)}
                                        </p>
                                        <p class="text-xs text-neutral-600 \
                                                  dark:text-neutral-400">
                                            {format!("{quantity} units")}
                                        </p>
                                        { if low {
                                            html! {
                                                <p class="text-xs font-semibold \
                                                          text-red-600 \
                                                          dark:text-red-400">
                                                    {"Low"}
                                                </p>
                                            }
                                        } else {
                                            html! {}
                                        }}
                                    </div>
                                }
                            })}
                        </div>
                    }
                }}

                <div class="flex items-center justify-between mt-4">
                    { if stock.contact.is_empty() {
                        html! { <span /> }
                    } else {
                        html! {
                            <a
                                href={format!("tel:{}", stock.contact)}
                                class="text-sm font-medium text-red-700 \
                                       dark:text-red-400 hover:underline"
                            >
                                {&stock.contact}
                            </a>
                        }
                    }}
                    { if stock.has_low_stock() {
                        html! {
                            <span class="text-xs font-semibold px-2 py-1 \
                                         rounded bg-amber-50 \
                                         dark:bg-amber-900/20 text-amber-700 \
                                         dark:text-amber-400 border \
                                         border-amber-200 \
                                         dark:border-amber-800">
                                {"Low stock alert"}
                            </span>
                        }
                    } else {
                        html! {}
                    }}
                </div>
            </div>
        </div>
    }
}
