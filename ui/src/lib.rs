use payloads::{AssistantClient, DirectoryClient};
use yew::prelude::*;
use yew_router::prelude::*;

mod chat;
mod components;
mod geo;
mod hooks;
mod logs;
mod state;
mod windowing;

use components::{AssistantChat, InventoryPage, LiveChat};

// Global API clients - configurable via environment or same-origin fallback
pub fn get_directory_client() -> DirectoryClient {
    // Try environment variable first (set at build time)
    let address = option_env!("DIRECTORY_API_URL")
        .map(|url| url.to_string())
        .unwrap_or_else(|| {
            // Fallback to same origin
            let window = web_sys::window().unwrap();
            let location = window.location();
            let origin = location.origin().unwrap();
            format!("{origin}/api/blood-banks")
        });

    DirectoryClient {
        address,
        inner_client: reqwest::Client::new(),
    }
}

pub fn get_assistant_client() -> AssistantClient {
    let base_path = option_env!("ASSISTANT_BASE_PATH")
        .map(|url| url.to_string())
        .unwrap_or_else(|| {
            let window = web_sys::window().unwrap();
            let location = window.location();
            location.origin().unwrap()
        });

    AssistantClient {
        base_path,
        inner_client: reqwest::Client::new(),
    }
}

/// SockJS-style base URL of the chat backend.
pub fn chat_ws_url() -> String {
    option_env!("CHAT_WS_URL")
        .map(|url| url.to_string())
        .unwrap_or_else(|| {
            let window = web_sys::window().unwrap();
            let location = window.location();
            let origin = location.origin().unwrap();
            format!("{origin}/ws")
        })
}

/// Display name attached to outbound chat messages.
pub fn chat_username() -> String {
    option_env!("CHAT_USERNAME").unwrap_or("User").to_string()
}

#[derive(Clone, Routable, PartialEq)]
enum Route {
    #[at("/")]
    Home,
    #[at("/support")]
    Support,
    #[not_found]
    #[at("/404")]
    NotFound,
}

#[function_component]
pub fn App() -> Html {
    logs::init_logging();
    html! {
        <BrowserRouter>
            <div class="min-h-screen bg-white dark:bg-neutral-900 \
                        text-neutral-900 dark:text-neutral-100">
                <Header />
                <Switch<Route> render={switch} />
            </div>
        </BrowserRouter>
    }
}

#[function_component]
fn Header() -> Html {
    html! {
        <header class="sticky top-0 z-40 border-b border-neutral-200 \
                       dark:border-neutral-700 bg-white/95 \
                       dark:bg-neutral-900/95 backdrop-blur">
            <div class="max-w-7xl mx-auto px-4 py-4 flex items-center \
                        justify-between">
                <div>
                    <h1 class="text-2xl font-bold tracking-tight">
                        {"BloodLink"}
                    </h1>
                    <p class="text-xs text-neutral-500 dark:text-neutral-400">
                        {"Find blood units instantly"}
                    </p>
                </div>
                <nav class="flex gap-4 text-sm font-medium">
                    <Link<Route> to={Route::Home} classes="hover:underline">
                        {"Inventory"}
                    </Link<Route>>
                    <Link<Route>
                        to={Route::Support}
                        classes="hover:underline"
                    >
                        {"Live support"}
                    </Link<Route>>
                </nav>
            </div>
        </header>
    }
}

#[function_component]
fn Home() -> Html {
    let show_assistant = use_state(|| false);

    let on_toggle = {
        let show_assistant = show_assistant.clone();
        Callback::from(move |_: MouseEvent| {
            show_assistant.set(!*show_assistant);
        })
    };
    let on_close = {
        let show_assistant = show_assistant.clone();
        Callback::from(move |_: MouseEvent| show_assistant.set(false))
    };

    html! {
        <main class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 py-8 space-y-8">
            <div class="flex justify-end">
                <button
                    onclick={on_toggle}
                    class="px-4 py-2 rounded-md text-sm font-semibold \
                           bg-red-600 text-white shadow hover:bg-red-700"
                >
                    { if *show_assistant {
                        "Hide assistant"
                    } else {
                        "Ask the assistant"
                    }}
                </button>
            </div>
            { if *show_assistant {
                html! { <AssistantChat on_close={on_close} /> }
            } else {
                html! {}
            }}
            <InventoryPage />
        </main>
    }
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Home => html! { <Home /> },
        Route::Support => html! {
            <main class="max-w-5xl mx-auto px-4 sm:px-6 lg:px-8 py-8">
                <LiveChat />
            </main>
        },
        Route::NotFound => html! {
            <main class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 py-8">
                <div class="text-center">
                    <h1 class="text-4xl font-bold">{"404"}</h1>
                    <p class="text-neutral-600 dark:text-neutral-300">
                        {"Page not found"}
                    </p>
                </div>
            </main>
        },
    }
}
