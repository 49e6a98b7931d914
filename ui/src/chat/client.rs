//! STOMP session driver over a browser WebSocket.
//!
//! Owns the socket lifecycle: connect, heartbeat, and automatic reconnect
//! with a fixed delay after transport close. Frames and connection status
//! changes are delivered through [`Handlers`] callbacks; the session never
//! surfaces an error to the caller directly.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::{JsCast, closure::Closure};
use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};
use yew::Callback;

use super::stomp::{self, Frame};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Default, derive_more::Display,
)]
pub enum ConnectionStatus {
    #[default]
    #[display("disconnected")]
    Disconnected,
    #[display("connecting")]
    Connecting,
    #[display("connected")]
    Connected,
}

#[derive(Clone, PartialEq)]
pub struct StompConfig {
    pub url: String,
    pub reconnect_delay_ms: u32,
    pub heartbeat_ms: u32,
}

impl StompConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_delay_ms: 5_000,
            heartbeat_ms: 4_000,
        }
    }
}

/// Component-side observers for session events.
#[derive(Clone)]
pub struct Handlers {
    pub on_status: Callback<ConnectionStatus>,
    /// Fired once per successful CONNECT handshake; the component joins
    /// and subscribes from here.
    pub on_connected: Callback<()>,
    pub on_message: Callback<Frame>,
    pub on_error: Callback<String>,
}

struct Inner {
    config: StompConfig,
    handlers: Handlers,
    socket: Option<WebSocket>,
    status: ConnectionStatus,
    active: bool,
    subscriptions: usize,
    heartbeat: Option<Interval>,
    reconnect: Option<Timeout>,
    on_open: Option<Closure<dyn FnMut()>>,
    on_message: Option<Closure<dyn FnMut(MessageEvent)>>,
    on_close: Option<Closure<dyn FnMut(CloseEvent)>>,
    on_error: Option<Closure<dyn FnMut(ErrorEvent)>>,
}

#[derive(Clone)]
pub struct StompClient {
    inner: Rc<RefCell<Inner>>,
}

impl StompClient {
    pub fn new(config: StompConfig, handlers: Handlers) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                config,
                handlers,
                socket: None,
                status: ConnectionStatus::Disconnected,
                active: false,
                subscriptions: 0,
                heartbeat: None,
                reconnect: None,
                on_open: None,
                on_message: None,
                on_close: None,
                on_error: None,
            })),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.inner.borrow().status
    }

    /// Open the session and keep it open until [`deactivate`].
    pub fn activate(&self) {
        self.inner.borrow_mut().active = true;
        self.open_socket();
    }

    /// Tear the session down; no further reconnects are attempted.
    pub fn deactivate(&self) {
        let socket = {
            let mut inner = self.inner.borrow_mut();
            inner.active = false;
            inner.reconnect = None;
            inner.heartbeat = None;
            inner.status = ConnectionStatus::Disconnected;
            inner.on_open = None;
            inner.on_message = None;
            inner.on_close = None;
            inner.on_error = None;
            inner.socket.take()
        };
        if let Some(socket) = socket {
            socket.set_onopen(None);
            socket.set_onmessage(None);
            socket.set_onclose(None);
            socket.set_onerror(None);
            let _ = socket.close();
        }
    }

    /// Send a JSON payload to an application destination. Dropped with a
    /// log line when the session is not connected.
    pub fn publish(&self, destination: &str, body: &str) {
        if self.status() != ConnectionStatus::Connected {
            tracing::warn!(destination, "publish while disconnected, dropped");
            return;
        }
        self.send_frame(&stomp::send_frame(destination, body));
    }

    pub fn subscribe(&self, destination: &str) {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = format!("sub-{}", inner.subscriptions);
            inner.subscriptions += 1;
            id
        };
        self.send_frame(&stomp::subscribe_frame(&id, destination));
    }

    fn send_frame(&self, frame: &Frame) {
        self.send_raw(&frame.marshal());
    }

    fn send_raw(&self, data: &str) {
        let inner = self.inner.borrow();
        if let Some(socket) = &inner.socket {
            if let Err(err) = socket.send_with_str(data) {
                tracing::warn!(?err, "websocket send failed");
            }
        }
    }

    fn open_socket(&self) {
        let (url, handlers) = {
            let inner = self.inner.borrow();
            (
                stomp::websocket_url(&inner.config.url),
                inner.handlers.clone(),
            )
        };

        let socket = match WebSocket::new(&url) {
            Ok(socket) => socket,
            Err(err) => {
                tracing::error!(?err, %url, "failed to open websocket");
                handlers
                    .on_error
                    .emit("Connection failed".to_string());
                self.schedule_reconnect();
                return;
            }
        };

        let on_open = {
            let client = self.clone();
            Closure::<dyn FnMut()>::new(move || {
                let heartbeat_ms =
                    client.inner.borrow().config.heartbeat_ms;
                client.send_frame(&stomp::connect_frame(heartbeat_ms));
            })
        };
        let on_message = {
            let client = self.clone();
            Closure::<dyn FnMut(MessageEvent)>::new(
                move |event: MessageEvent| {
                    if let Some(text) = event.data().as_string() {
                        client.handle_text(&text);
                    }
                },
            )
        };
        let on_close = {
            let client = self.clone();
            Closure::<dyn FnMut(CloseEvent)>::new(
                move |event: CloseEvent| {
                    tracing::debug!(code = event.code(), "websocket closed");
                    client.handle_close();
                },
            )
        };
        let on_error = {
            let handlers = handlers.clone();
            Closure::<dyn FnMut(ErrorEvent)>::new(move |_: ErrorEvent| {
                // The paired close event drives reconnection; this is
                // informational only.
                handlers
                    .on_error
                    .emit("Connection error".to_string());
            })
        };

        socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        {
            let mut inner = self.inner.borrow_mut();
            inner.reconnect = None;
            inner.status = ConnectionStatus::Connecting;
            inner.socket = Some(socket);
            inner.on_open = Some(on_open);
            inner.on_message = Some(on_message);
            inner.on_close = Some(on_close);
            inner.on_error = Some(on_error);
        }
        handlers.on_status.emit(ConnectionStatus::Connecting);
    }

    fn handle_text(&self, text: &str) {
        let Some(frame) = Frame::parse(text) else {
            // Server heartbeat.
            return;
        };
        match frame.command.as_str() {
            "CONNECTED" => {
                let handlers = {
                    let mut inner = self.inner.borrow_mut();
                    inner.status = ConnectionStatus::Connected;
                    let client = self.clone();
                    inner.heartbeat = Some(Interval::new(
                        inner.config.heartbeat_ms,
                        move || client.send_raw(stomp::HEARTBEAT),
                    ));
                    inner.handlers.clone()
                };
                tracing::info!("chat session established");
                handlers.on_status.emit(ConnectionStatus::Connected);
                handlers.on_connected.emit(());
            }
            "MESSAGE" => {
                let handlers = self.inner.borrow().handlers.clone();
                handlers.on_message.emit(frame);
            }
            "ERROR" => {
                let handlers = self.inner.borrow().handlers.clone();
                let message = frame
                    .header_value("message")
                    .unwrap_or(&frame.body)
                    .to_string();
                tracing::error!(%message, "stomp error frame");
                handlers.on_error.emit(message);
            }
            other => {
                tracing::debug!(command = other, "ignoring stomp frame");
            }
        }
    }

    fn handle_close(&self) {
        let (handlers, reconnect) = {
            let mut inner = self.inner.borrow_mut();
            inner.heartbeat = None;
            inner.socket = None;
            // Listener closures stay alive until the next open_socket;
            // this runs from inside one of them.
            inner.status = ConnectionStatus::Disconnected;
            (inner.handlers.clone(), inner.active)
        };
        handlers.on_status.emit(ConnectionStatus::Disconnected);
        if reconnect {
            self.schedule_reconnect();
        }
    }

    fn schedule_reconnect(&self) {
        let mut inner = self.inner.borrow_mut();
        if !inner.active {
            return;
        }
        let delay = inner.config.reconnect_delay_ms;
        tracing::info!(delay, "scheduling chat reconnect");
        let client = self.clone();
        inner.reconnect =
            Some(Timeout::new(delay, move || client.open_socket()));
    }
}
