use payloads::chat::{
    BankRow, DistrictRow, StateRow, StockRow, Structured, generic_columns,
    stock_columns,
};
use serde_json::Value;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct Props {
    pub structured: Structured,
}

/// Render an inbound chat payload by its pre-decided variant.
#[function_component]
pub fn StructuredView(props: &Props) -> Html {
    match &props.structured {
        Structured::PlainText(text) => html! {
            <div class="whitespace-pre-wrap leading-relaxed">{text}</div>
        },
        Structured::Raw(value) => html! {
            <pre class="p-3 rounded bg-neutral-100 dark:bg-neutral-900 \
                        font-mono text-xs overflow-auto max-h-72">
                { serde_json::to_string_pretty(value)
                    .unwrap_or_else(|_| value.to_string()) }
            </pre>
        },
        Structured::BankList { banks, total } => html! {
            <div>
                { banner(format!(
                    "Found {} blood bank(s)",
                    total.unwrap_or(banks.len() as u64)
                )) }
                { bank_table(banks) }
            </div>
        },
        Structured::StateList { states, total } => html! {
            <div>
                { banner(format!(
                    "Found {} state(s)",
                    total.unwrap_or(states.len() as u64)
                )) }
                { state_table(states) }
            </div>
        },
        Structured::DistrictList {
            districts,
            total,
            state_name,
        } => html! {
            <div>
                { banner(format!(
                    "Found {} district(s) in {}",
                    total.unwrap_or(districts.len() as u64),
                    state_name.as_deref().unwrap_or("the state")
                )) }
                { district_table(districts) }
            </div>
        },
        Structured::StockTable { stocks, total } => html! {
            <div>
                { banner(format!(
                    "Found {} blood stock entr{}",
                    total.unwrap_or(stocks.len() as u64),
                    if total.unwrap_or(stocks.len() as u64) == 1 {
                        "y"
                    } else {
                        "ies"
                    }
                )) }
                { stock_table(stocks) }
            </div>
        },
        Structured::GenericTable(rows) => generic_table(rows),
    }
}

fn banner(text: String) -> Html {
    html! {
        <div class="p-2 mb-2 rounded bg-blue-50 dark:bg-blue-950/30 \
                    border-l-4 border-blue-500 text-sm">
            {text}
        </div>
    }
}

fn table(header: Html, body: Html) -> Html {
    html! {
        <div class="overflow-x-auto rounded-lg border border-neutral-200 \
                    dark:border-neutral-700">
            <table class="w-full text-sm">
                <thead class="bg-neutral-100 dark:bg-neutral-800 text-left">
                    <tr>{header}</tr>
                </thead>
                <tbody>{body}</tbody>
            </table>
        </div>
    }
}

fn th(label: &str) -> Html {
    html! { <th class="px-3 py-2 font-semibold">{label}</th> }
}

fn td(value: Option<&str>) -> Html {
    html! { <td class="px-3 py-2">{value.unwrap_or("N/A")}</td> }
}

fn empty() -> Html {
    html! {
        <div class="p-4 text-center italic text-neutral-500">
            {"No data available"}
        </div>
    }
}

fn bank_table(banks: &[BankRow]) -> Html {
    if banks.is_empty() {
        return empty();
    }
    let header = html! {
        <>
            { th("Name") }{ th("Address") }{ th("City") }
            { th("State") }{ th("Phone") }{ th("Email") }
        </>
    };
    let body = banks
        .iter()
        .map(|bank| {
            html! {
                <tr class="border-t border-neutral-200 \
                           dark:border-neutral-700">
                    { td(bank.name.as_deref()) }
                    { td(bank.address.as_deref()) }
                    { td(bank.city.as_deref()) }
                    { td(bank.state.as_deref()) }
                    { td(bank.phone.as_deref()) }
                    { td(bank.email.as_deref()) }
                </tr>
            }
        })
        .collect::<Html>();
    table(header, body)
}

fn state_table(states: &[StateRow]) -> Html {
    if states.is_empty() {
        return empty();
    }
    let header = html! {
        <>{ th("State ID") }{ th("State Name") }{ th("State Code") }</>
    };
    let body = states
        .iter()
        .map(|state| {
            html! {
                <tr class="border-t border-neutral-200 \
                           dark:border-neutral-700">
                    { td(state.state_id.as_deref()) }
                    { td(state.state_name.as_deref()) }
                    { td(state.state_code.as_deref()) }
                </tr>
            }
        })
        .collect::<Html>();
    table(header, body)
}

fn district_table(districts: &[DistrictRow]) -> Html {
    if districts.is_empty() {
        return empty();
    }
    let header = html! {
        <>
            { th("District ID") }{ th("District Name") }
            { th("District Code") }
        </>
    };
    let body = districts
        .iter()
        .map(|district| {
            html! {
                <tr class="border-t border-neutral-200 \
                           dark:border-neutral-700">
                    { td(district.district_id.as_deref()) }
                    { td(district.district_name.as_deref()) }
                    { td(district.district_code.as_deref()) }
                </tr>
            }
        })
        .collect::<Html>();
    table(header, body)
}

fn stock_table(stocks: &[StockRow]) -> Html {
    if stocks.is_empty() {
        return empty();
    }
    let columns = stock_columns(stocks);
    let has_distance = stocks.iter().any(|stock| stock.distance.is_some());

    let header = html! {
        <>
            { th("Blood Bank") }{ th("Address") }{ th("Contact") }
            { for columns.iter().map(|label| th(label)) }
            { if has_distance { th("Distance (km)") } else { html! {} } }
        </>
    };
    let body = stocks
        .iter()
        .map(|stock| {
            html! {
                <tr class="border-t border-neutral-200 \
                           dark:border-neutral-700">
                    { td(stock.name.as_deref()) }
                    { td(stock.address.as_deref()) }
                    { td(stock.contact.as_deref()) }
                    { for columns.iter().map(|label| {
                        let units = stock
                            .blood_groups
                            .as_ref()
                            .and_then(|groups| groups.get(label));
                        match units {
                            Some(units) => html! {
                                <td class="px-3 py-2 text-center font-bold">
                                    {units.to_string()}
                                </td>
                            },
                            None => html! {
                                <td class="px-3 py-2 text-center \
                                           text-neutral-400">
                                    {"-"}
                                </td>
                            },
                        }
                    })}
                    { if has_distance {
                        let distance = stock
                            .distance
                            .map(|d| format!("{d:.2}"))
                            .unwrap_or_else(|| "-".to_string());
                        html! {
                            <td class="px-3 py-2 text-center">{distance}</td>
                        }
                    } else {
                        html! {}
                    }}
                </tr>
            }
        })
        .collect::<Html>();
    table(header, body)
}

fn generic_table(rows: &[serde_json::Map<String, Value>]) -> Html {
    if rows.is_empty() {
        return empty();
    }
    let columns = generic_columns(rows);
    let header = columns
        .iter()
        .map(|column| th(column))
        .collect::<Html>();
    let body = rows
        .iter()
        .map(|row| {
            html! {
                <tr class="border-t border-neutral-200 \
                           dark:border-neutral-700">
                    { for columns.iter().map(|column| {
                        let text = match row.get(column) {
                            None | Some(Value::Null) => "N/A".to_string(),
                            Some(Value::String(s)) => s.clone(),
                            Some(other) => other.to_string(),
                        };
                        html! { <td class="px-3 py-2">{text}</td> }
                    })}
                </tr>
            }
        })
        .collect::<Html>();
    table(header, body)
}
