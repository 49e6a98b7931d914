use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::hooks::use_assistant::ChatRole;
use crate::hooks::{use_assistant, use_speech};

#[derive(Properties, PartialEq)]
pub struct Props {
    #[prop_or_default]
    pub on_close: Option<Callback<MouseEvent>>,
}

/// The request/response assistant widget: one backend call per question,
/// optional voice input, spoken replies when the browser can.
#[function_component]
pub fn AssistantChat(props: &Props) -> Html {
    let assistant = use_assistant();
    let speech = use_speech();
    let text_input = use_state(String::new);

    let submit = {
        let send = assistant.send.clone();
        let text_input = text_input.clone();
        Callback::from(move |()| {
            let text = (*text_input).clone();
            if !text.trim().is_empty() {
                send.emit(text);
                text_input.set(String::new());
            }
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
        let send = assistant.send.clone();
        let listening = speech.listening;
        let transcript = speech.transcript.clone();
        let start = speech.start.clone();
        let stop = speech.stop.clone();
        Callback::from(move |_: MouseEvent| {
            if listening {
                stop.emit(());
                if !transcript.trim().is_empty() {
                    send.emit(transcript.clone());
                }
            } else {
                start.emit(());
            }
        })
    };

    html! {
        <div class="flex flex-col rounded-lg border border-neutral-200 \
                    dark:border-neutral-700 bg-white dark:bg-neutral-800 \
                    shadow-lg">
            <div class="flex items-center justify-between px-6 py-4 \
                        border-b border-neutral-200 dark:border-neutral-700">
                <div>
                    <h2 class="text-xl font-semibold">
                        {"AI Voice Assistant"}
                    </h2>
                    <p class="text-sm text-neutral-500 dark:text-neutral-400">
                        {"Ask about blood availability and locations"}
                    </p>
                </div>
                { if let Some(on_close) = props.on_close.clone() {
                    html! {
                        <button
                            onclick={on_close}
                            class="h-8 w-8 rounded hover:bg-neutral-100 \
                                   dark:hover:bg-neutral-700"
                        >
                            {"✕"}
                        </button>
                    }
                } else {
                    html! {}
                }}
            </div>

            <div class="flex-1 overflow-y-auto p-6 space-y-4 max-h-[480px]">
                { for assistant.entries.iter().map(|entry| {
                    let is_user = entry.role == ChatRole::User;
                    let bubble = if is_user {
                        "bg-red-600 text-white rounded-br-none"
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
                                "max-w-md", "px-4", "py-3", "rounded-lg",
                                bubble
                            )}>
                                <p class="text-sm leading-relaxed">
                                    {&entry.text}
                                </p>
                                <p class="text-xs mt-2 opacity-60">
                                    { entry
                                        .timestamp
                                        .strftime("%H:%M")
                                        .to_string() }
                                </p>
                            </div>
                        </div>
                    }
                })}
                { if assistant.processing {
                    html! {
                        <div class="flex justify-start">
                            <div class="px-4 py-3 rounded-lg rounded-bl-none \
                                        bg-neutral-100 dark:bg-neutral-700 \
                                        text-sm italic">
                                {"Thinking..."}
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
                    disabled={assistant.processing || !speech.supported}
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
                    { if speech.listening {
                        "Stop listening"
                    } else {
                        "Start voice"
                    }}
                </button>
                <input
                    type="text"
                    class="flex-1 px-4 py-2 rounded-md border \
                           border-neutral-300 dark:border-neutral-600 \
                           bg-white dark:bg-neutral-800 text-sm"
                    placeholder="Or type your question..."
                    value={(*text_input).clone()}
                    oninput={on_input}
                    onkeydown={on_keydown}
                    disabled={assistant.processing}
                />
                <button
                    onclick={on_send_click}
                    disabled={
                        assistant.processing
                            || text_input.trim().is_empty()
                    }
                    class="px-4 py-2 rounded-md text-sm font-semibold \
                           bg-red-600 text-white disabled:opacity-50"
                >
                    {"Send"}
                </button>
            </div>
        </div>
    }
}
