use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use jiff::Timestamp;
use payloads::chat::{ChatMessage, MessageKind};
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::chat::{
    ChatLog, ChatLogAction, ConnectionStatus, Handlers, JOIN_DESTINATION,
    PUBLIC_TOPIC, SEND_DESTINATION, StompClient, StompConfig,
    TYPING_TIMEOUT_MS, needs_location, stomp::Frame,
};
use crate::components::StructuredView;
use crate::geo::{self, GeoFix};
use crate::hooks::use_speech;
use crate::{chat_username, chat_ws_url};

/// The persistent support chat page: a STOMP session with reconnection,
/// structured answers, and location-aware queries.
#[function_component]
pub fn LiveChat() -> Html {
    let log = use_reducer(ChatLog::default);
    let status = use_state(ConnectionStatus::default);
    let text_input = use_state(String::new);
    let typing_timer = use_mut_ref(|| None::<Timeout>);
    let geo_cache = use_mut_ref(|| None::<GeoFix>);
    let client_ref = use_mut_ref(|| None::<StompClient>);
    let speech = use_speech();

    {
        let log = log.clone();
        let status = status.clone();
        let typing_timer = typing_timer.clone();
        let client_ref = client_ref.clone();
        use_effect_with((), move |_| {
            log.dispatch(ChatLogAction::System(
                "Welcome to BloodLink Support! Connecting you now."
                    .to_string(),
            ));

            let handlers = Handlers {
                on_status: {
                    let status = status.clone();
                    Callback::from(move |next| status.set(next))
                },
                on_connected: {
                    let log = log.clone();
                    let client_ref = client_ref.clone();
                    Callback::from(move |()| {
                        if let Some(client) = &*client_ref.borrow() {
                            let join = ChatMessage::text(
                                String::new(),
                                chat_username(),
                            );
                            match serde_json::to_string(&join) {
                                Ok(body) => {
                                    client.publish(JOIN_DESTINATION, &body);
                                }
                                Err(err) => {
                                    tracing::error!(
                                        ?err,
                                        "failed to encode join event"
                                    );
                                }
                            }
                            client.subscribe(PUBLIC_TOPIC);
                        }
                        log.dispatch(ChatLogAction::System(
                            "Connected! How can I help you today?"
                                .to_string(),
                        ));
                    })
                },
                on_message: {
                    let log = log.clone();
                    let typing_timer = typing_timer.clone();
                    Callback::from(move |frame: Frame| {
                        handle_frame(&frame, &log, &typing_timer);
                    })
                },
                on_error: {
                    let log = log.clone();
                    Callback::from(move |message: String| {
                        log.dispatch(ChatLogAction::Error(format!(
                            "Connection error: {message}"
                        )));
                    })
                },
            };

            let client =
                StompClient::new(StompConfig::new(chat_ws_url()), handlers);
            client.activate();
            *client_ref.borrow_mut() = Some(client);

            let client_ref = client_ref.clone();
            move || {
                if let Some(client) = client_ref.borrow_mut().take() {
                    client.deactivate();
                }
            }
        });
    }

    let connected = *status == ConnectionStatus::Connected;

    let send_text = {
        let log = log.clone();
        let client_ref = client_ref.clone();
        let geo_cache = geo_cache.clone();
        Callback::from(move |content: String| {
            let content = content.trim().to_string();
            if content.is_empty() {
                return;
            }
            let client = match &*client_ref.borrow() {
                Some(client)
                    if client.status() == ConnectionStatus::Connected =>
                {
                    client.clone()
                }
                _ => return,
            };

            if needs_location(&content) {
                let log = log.clone();
                let geo_cache = geo_cache.clone();
                yew::platform::spawn_local(async move {
                    match resolve_fix(&geo_cache).await {
                        Ok(fix) => {
                            publish_message(&client, &content, Some(&fix));
                        }
                        Err(err) => {
                            // Still send; the backend just loses the
                            // coordinates.
                            log.dispatch(ChatLogAction::Error(
                                err.to_string(),
                            ));
                            publish_message(&client, &content, None);
                        }
                    }
                });
            } else {
                publish_message(&client, &content, None);
            }
        })
    };

    let submit = {
        let send_text = send_text.clone();
        let text_input = text_input.clone();
        Callback::from(move |()| {
            send_text.emit((*text_input).clone());
            text_input.set(String::new());
        })
    };

    let on_input = {
        let text_input = text_input.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            text_input.set(input.value());
        })
    };

    let on_keydown = {
        let submit = submit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                submit.emit(());
            }
        })
    };

    let on_send_click = {
        let submit = submit.clone();
        Callback::from(move |_: MouseEvent| submit.emit(()))
    };

    let on_voice_toggle = {
        let send_text = send_text.clone();
        let listening = speech.listening;
        let transcript = speech.transcript.clone();
        let start = speech.start.clone();
        let stop = speech.stop.clone();
        Callback::from(move |_: MouseEvent| {
            if listening {
                stop.emit(());
                if !transcript.trim().is_empty() {
                    send_text.emit(transcript.clone());
                }
            } else {
                start.emit(());
            }
        })
    };

    let username = chat_username();
    let status_label = status.to_string();

    html! {
        <div class="flex flex-col rounded-lg border border-neutral-200 \
                    dark:border-neutral-700 bg-white dark:bg-neutral-800 \
                    shadow-lg">
            <div class="flex items-center justify-between px-6 py-4 \
                        border-b border-neutral-200 dark:border-neutral-700">
                <h2 class="text-xl font-semibold flex items-center gap-2">
                    {"BloodLink Support"}
                    <span class={classes!(
                        "text-xs", "font-medium", "px-2", "py-0.5",
                        "rounded-full",
                        match *status {
                            ConnectionStatus::Connected =>
                                "bg-green-100 text-green-700",
                            ConnectionStatus::Connecting =>
                                "bg-yellow-100 text-yellow-700",
                            ConnectionStatus::Disconnected =>
                                "bg-red-100 text-red-700",
                        }
                    )}>
                        {status_label}
                    </span>
                </h2>
            </div>

            <div class="flex-1 overflow-y-auto p-6 space-y-4 max-h-[560px]">
                { for log.entries.iter().map(|entry| {
                    let author = entry.author(&username);
                    let is_user = author == crate::chat::EntryAuthor::User;
                    let is_system =
                        author == crate::chat::EntryAuthor::System;
                    let bubble = if is_user {
                        "bg-red-600 text-white rounded-br-none"
                    } else if entry.is_error() {
                        "bg-red-50 dark:bg-red-950/30 text-red-900 \
                         dark:text-red-100 border border-red-200 \
                         dark:border-red-800"
                    } else if is_system {
                        "bg-yellow-50 dark:bg-yellow-950/30 \
                         text-yellow-900 dark:text-yellow-100 border \
                         border-yellow-200 dark:border-yellow-800"
                    } else {
                        "bg-neutral-100 dark:bg-neutral-700 \
                         text-neutral-900 dark:text-neutral-100 \
                         rounded-bl-none"
                    };
                    html! {
                        <div
                            key={entry.id.to_string()}
                            class={classes!(
                                "flex",
                                if is_user {
                                    "justify-end"
                                } else {
                                    "justify-start"
                                }
                            )}
                        >
                            <div class={classes!(
                                "max-w-4xl", "px-4", "py-3", "rounded-lg",
                                "text-sm", bubble
                            )}>
                                <StructuredView
                                    structured={entry.structured.clone()}
                                />
                                <p class="text-xs mt-2 opacity-60">
                                    { entry
                                        .received_at
                                        .strftime("%H:%M")
                                        .to_string() }
                                </p>
                            </div>
                        </div>
                    }
                })}
                { if log.typing {
                    html! {
                        <div class="flex justify-start">
                            <div class="px-4 py-3 rounded-lg rounded-bl-none \
                                        bg-neutral-100 dark:bg-neutral-700 \
                                        text-sm italic \
                                        text-neutral-500">
                                {"Assistant is typing..."}
                            </div>
                        </div>
                    }
                } else {
                    html! {}
                }}
            </div>

            { if speech.listening && !speech.transcript.is_empty() {
                html! {
                    <div class="mx-6 mb-2 p-3 rounded-lg bg-blue-50 \
                                dark:bg-blue-950/30 border border-blue-200 \
                                dark:border-blue-800 text-sm">
                        <strong>{"Listening: "}</strong>
                        {&speech.transcript}
                    </div>
                }
            } else {
                html! {}
            }}

            <div class="flex gap-2 p-4 border-t border-neutral-200 \
                        dark:border-neutral-700">
                <button
                    onclick={on_voice_toggle}
                    disabled={!connected || !speech.supported}
                    class={classes!(
                        "px-4", "py-2", "rounded-md", "text-sm",
                        "font-semibold",
                        if speech.listening {
                            "bg-red-600 text-white"
                        } else {
                            "bg-neutral-100 dark:bg-neutral-700"
                        }
                    )}
                >
                    { if speech.listening { "Stop" } else { "Voice" } }
                </button>
                <input
                    type="text"
                    class="flex-1 px-4 py-2 rounded-md border \
                           border-neutral-300 dark:border-neutral-600 \
                           bg-white dark:bg-neutral-800 text-sm"
                    placeholder="Type your message... (e.g. 'Find blood \
                                 banks near me')"
                    value={(*text_input).clone()}
                    oninput={on_input}
                    onkeydown={on_keydown}
                    disabled={!connected}
                />
                <button
                    onclick={on_send_click}
                    disabled={!connected || text_input.trim().is_empty()}
                    class="px-4 py-2 rounded-md text-sm font-semibold \
                           bg-red-600 text-white disabled:opacity-50"
                >
                    {"Send"}
                </button>
            </div>
        </div>
    }
}

fn handle_frame(
    frame: &Frame,
    log: &UseReducerHandle<ChatLog>,
    typing_timer: &Rc<RefCell<Option<Timeout>>>,
) {
    let message: ChatMessage = match serde_json::from_str(&frame.body) {
        Ok(message) => message,
        Err(err) => {
            tracing::warn!(?err, "undecodable chat payload");
            return;
        }
    };
    if let Some(kind) = message.kind {
        tracing::debug!(%kind, "chat event");
    }
    if message.is_typing() {
        log.dispatch(ChatLogAction::TypingStarted);
        let log = log.clone();
        let timer = Timeout::new(TYPING_TIMEOUT_MS, move || {
            log.dispatch(ChatLogAction::TypingStopped);
        });
        *typing_timer.borrow_mut() = Some(timer);
    } else {
        *typing_timer.borrow_mut() = None;
        log.dispatch(ChatLogAction::Incoming(message));
    }
}

/// Reuse a fresh cached fix or resolve a new one. Geocoding failure only
/// costs the place names.
async fn resolve_fix(
    cache: &Rc<RefCell<Option<GeoFix>>>,
) -> Result<GeoFix, geo::GeoError> {
    let now = Timestamp::now();
    if let Some(fix) = &*cache.borrow() {
        if fix.is_fresh(now) {
            return Ok(fix.clone());
        }
    }

    let (latitude, longitude) = geo::current_position().await?;
    let (city, state) = match geo::reverse_geocode(latitude, longitude).await
    {
        Ok(place) => place,
        Err(err) => {
            tracing::warn!(?err, "reverse geocoding failed");
            (None, None)
        }
    };
    let fix = GeoFix {
        latitude,
        longitude,
        city,
        state,
        obtained_at: now,
    };
    *cache.borrow_mut() = Some(fix.clone());
    Ok(fix)
}

fn publish_message(client: &StompClient, content: &str, fix: Option<&GeoFix>) {
    let message = ChatMessage {
        content: Some(content.to_string()),
        sender: Some(chat_username()),
        kind: Some(MessageKind::Message),
        latitude: fix.map(|f| f.latitude),
        longitude: fix.map(|f| f.longitude),
        city: fix.and_then(|f| f.city.clone()),
        state: fix.and_then(|f| f.state.clone()),
        ..Default::default()
    };
    match serde_json::to_string(&message) {
        Ok(body) => client.publish(SEND_DESTINATION, &body),
        Err(err) => tracing::error!(?err, "failed to encode chat message"),
    }
}
