//! Browser speech engines: recognition for voice input, synthesis for
//! spoken replies. Everything degrades to a no-op when the engine is
//! missing; speech never affects message-log correctness.

use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::{
    SpeechRecognition, SpeechRecognitionEvent, SpeechSynthesisUtterance,
};
use yew::prelude::*;

/// True when some speech recognition engine exists, prefixed or not.
pub fn recognition_supported() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let has = |name: &str| {
        js_sys::Reflect::has(window.as_ref(), &JsValue::from_str(name))
            .unwrap_or(false)
    };
    has("SpeechRecognition") || has("webkitSpeechRecognition")
}

/// Construct a recognizer, falling back to the webkit-prefixed
/// constructor that Chromium still ships.
fn new_recognition() -> Option<SpeechRecognition> {
    if let Ok(recognition) = SpeechRecognition::new() {
        return Some(recognition);
    }
    let window = web_sys::window()?;
    let constructor = js_sys::Reflect::get(
        window.as_ref(),
        &JsValue::from_str("webkitSpeechRecognition"),
    )
    .ok()?;
    let constructor: js_sys::Function = constructor.dyn_into().ok()?;
    let instance =
        js_sys::Reflect::construct(&constructor, &js_sys::Array::new())
            .ok()?;
    Some(instance.unchecked_into())
}

/// Speak `text` if a synthesis engine is available.
pub fn speak(text: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(synthesis) = window.speech_synthesis() else {
        return;
    };
    match SpeechSynthesisUtterance::new_with_text(text) {
        Ok(utterance) => {
            utterance.set_rate(0.9);
            synthesis.speak(&utterance);
        }
        Err(err) => {
            tracing::debug!(?err, "speech synthesis unavailable");
        }
    }
}

struct RecognitionSession {
    recognition: SpeechRecognition,
    _on_result: Closure<dyn FnMut(SpeechRecognitionEvent)>,
    _on_end: Closure<dyn FnMut()>,
}

/// Hook return type for voice input
pub struct SpeechHandle {
    pub transcript: String,
    pub listening: bool,
    pub supported: bool,
    pub start: Callback<()>,
    pub stop: Callback<()>,
}

/// Hook wrapping the browser speech recognition engine.
///
/// `transcript` accumulates final results for the current listening
/// session. Starting a new session clears it.
#[hook]
pub fn use_speech() -> SpeechHandle {
    let transcript = use_state(String::new);
    let listening = use_state(|| false);
    let buffer = use_mut_ref(String::new);
    let session = use_mut_ref(|| None::<RecognitionSession>);

    let start = {
        let transcript = transcript.clone();
        let listening = listening.clone();
        let buffer = buffer.clone();
        let session = session.clone();
        use_callback((), move |(), _| {
            if let Some(previous) = session.borrow_mut().take() {
                previous.recognition.set_onresult(None);
                previous.recognition.set_onend(None);
                let _ = previous.recognition.stop();
            }
            let Some(recognition) = new_recognition() else {
                tracing::warn!("speech recognition is not supported");
                return;
            };
            recognition.set_lang("en-US");
            recognition.set_continuous(false);
            recognition.set_interim_results(false);

            buffer.borrow_mut().clear();
            transcript.set(String::new());

            let on_result = {
                let transcript = transcript.clone();
                let buffer = buffer.clone();
                Closure::<dyn FnMut(SpeechRecognitionEvent)>::new(
                    move |event: SpeechRecognitionEvent| {
                        let Some(results) = event.results() else {
                            return;
                        };
                        let mut text = buffer.borrow_mut();
                        for index in event.result_index()..results.length()
                        {
                            let Some(result) = results.get(index) else {
                                continue;
                            };
                            if !result.is_final() {
                                continue;
                            }
                            if let Some(alternative) = result.get(0) {
                                text.push_str(&alternative.transcript());
                            }
                        }
                        transcript.set(text.clone());
                    },
                )
            };
            let on_end = {
                let listening = listening.clone();
                Closure::<dyn FnMut()>::new(move || {
                    listening.set(false);
                })
            };

            recognition
                .set_onresult(Some(on_result.as_ref().unchecked_ref()));
            recognition.set_onend(Some(on_end.as_ref().unchecked_ref()));

            if let Err(err) = recognition.start() {
                tracing::warn!(?err, "failed to start speech recognition");
                return;
            }
            listening.set(true);
            *session.borrow_mut() = Some(RecognitionSession {
                recognition,
                _on_result: on_result,
                _on_end: on_end,
            });
        })
    };

    let stop = {
        let session = session.clone();
        let listening = listening.clone();
        use_callback((), move |(), _| {
            if let Some(active) = session.borrow_mut().take() {
                // Detach before dropping the closures; the engine may
                // still fire a final event.
                active.recognition.set_onresult(None);
                active.recognition.set_onend(None);
                let _ = active.recognition.stop();
            }
            listening.set(false);
        })
    };

    SpeechHandle {
        transcript: (*transcript).clone(),
        listening: *listening,
        supported: recognition_supported(),
        start,
        stop,
    }
}
