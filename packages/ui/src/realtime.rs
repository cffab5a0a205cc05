//! Change notifications for a backend table.
//!
//! [`use_table_changes`] returns a revision counter that bumps whenever a
//! row of the watched table is inserted, updated or deleted. Views read it
//! inside `use_resource` so every change triggers a full refetch.
//!
//! The socket is only opened in the browser and only for signed-in users.
//! It is closed when the component unmounts. Dropped sockets are re-opened
//! on the [`store::realtime::reconnect_delay`] schedule, counted from the
//! moment the drop is noticed.

use dioxus::prelude::*;

pub fn use_table_changes(table: &'static str) -> Signal<u64> {
    use_filtered_table_changes(table, || None)
}

/// Like [`use_table_changes`], narrowed by a `column=eq.value` row filter.
///
/// `row_filter` runs inside an effect: any signal it reads re-opens the
/// subscription when it changes, even if the returned filter stays the same.
pub fn use_filtered_table_changes(
    table: &'static str,
    row_filter: impl FnMut() -> Option<String> + 'static,
) -> Signal<u64> {
    let revision = use_signal(|| 0u64);

    #[cfg(target_arch = "wasm32")]
    {
        let mut row_filter = row_filter;
        let auth = crate::use_auth();
        let signed_in = use_memo(move || auth().user.is_some());
        let mut task = use_signal(|| Option::<Task>::None);

        use_effect(move || {
            let filter = row_filter();
            if let Some(previous) = task.take() {
                previous.cancel();
            }
            if signed_in() {
                task.set(Some(spawn(socket::watch(table, filter, revision))));
            }
        });

        use_drop(move || {
            if let Some(running) = task.take() {
                running.cancel();
            }
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    let _ = (table, row_filter);

    revision
}

#[cfg(target_arch = "wasm32")]
mod socket {
    use std::cell::RefCell;
    use std::rc::Rc;

    use dioxus::prelude::*;
    use futures::channel::mpsc;
    use futures::future::{select, Either};
    use futures::StreamExt;
    use store::realtime::{reconnect_delay, Channel, ChannelEvent, ChannelState, Message};
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::{CloseEvent, MessageEvent, WebSocket};

    /// An open socket with its handlers; leaving and closing on drop.
    struct Connection {
        socket: WebSocket,
        channel: Rc<RefCell<Channel>>,
        /// Wakes the heartbeat loop on close, socket error or a channel error frame.
        dropped: mpsc::UnboundedReceiver<()>,
        _onopen: Closure<dyn FnMut()>,
        _onmessage: Closure<dyn FnMut(MessageEvent)>,
        _onclose: Closure<dyn FnMut(CloseEvent)>,
        _onerror: Closure<dyn FnMut(web_sys::Event)>,
    }

    impl Drop for Connection {
        fn drop(&mut self) {
            if self.socket.ready_state() == WebSocket::OPEN {
                if let Some(leave) = self.channel.borrow_mut().leave() {
                    send(&self.socket, &leave);
                }
            }
            self.socket.set_onopen(None);
            self.socket.set_onmessage(None);
            self.socket.set_onclose(None);
            self.socket.set_onerror(None);
            let _ = self.socket.close();
        }
    }

    fn send(socket: &WebSocket, message: &Message) {
        match message.encode() {
            Ok(text) => {
                if let Err(e) = socket.send_with_str(&text) {
                    web_sys::console::warn_1(&e);
                }
            }
            Err(e) => tracing::warn!("Could not encode realtime frame: {}", e),
        }
    }

    fn connect(
        url: &str,
        channel: Channel,
        access_token: String,
        mut revision: Signal<u64>,
    ) -> Result<Connection, String> {
        let socket = WebSocket::new(url).map_err(|e| format!("{e:?}"))?;
        let channel = Rc::new(RefCell::new(channel));
        let (wake, dropped) = mpsc::unbounded::<()>();

        let onopen = {
            let socket = socket.clone();
            let channel = channel.clone();
            Closure::<dyn FnMut()>::new(move || {
                let join = channel.borrow_mut().join(Some(&access_token));
                send(&socket, &join);
            })
        };
        socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));

        let onmessage = {
            let channel = channel.clone();
            let wake = wake.clone();
            Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
                let Some(text) = event.data().as_string() else {
                    return;
                };
                let message = match Message::decode(&text) {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::debug!("Ignoring realtime frame: {}", e);
                        return;
                    }
                };
                let handled = channel.borrow_mut().handle(&message);
                match handled {
                    Some(ChannelEvent::Change(change)) => {
                        tracing::debug!("{:?} on {}", change.kind, change.table);
                        *revision.write() += 1;
                    }
                    Some(ChannelEvent::Error(reason)) => {
                        tracing::warn!("Realtime channel error: {}", reason);
                        let _ = wake.unbounded_send(());
                    }
                    _ => {}
                }
            })
        };
        socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

        let onclose = {
            let channel = channel.clone();
            let wake = wake.clone();
            Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
                tracing::debug!("Realtime socket closed with code {}", event.code());
                channel.borrow_mut().socket_closed();
                let _ = wake.unbounded_send(());
            })
        };
        socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        let onerror = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
            let _ = wake.unbounded_send(());
        });
        socket.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        Ok(Connection {
            socket,
            channel,
            dropped,
            _onopen: onopen,
            _onmessage: onmessage,
            _onclose: onclose,
            _onerror: onerror,
        })
    }

    pub(super) async fn watch(
        table: &'static str,
        row_filter: Option<String>,
        revision: Signal<u64>,
    ) {
        let mut attempt = 0u32;

        loop {
            let settings = match api::get_realtime_config().await {
                Ok(Some(settings)) => settings,
                Ok(None) => return,
                Err(e) => {
                    tracing::warn!("Realtime settings unavailable: {}", e);
                    gloo_timers::future::sleep(reconnect_delay(attempt)).await;
                    attempt += 1;
                    continue;
                }
            };

            let channel = Channel::new(table).with_filter(row_filter.clone());
            match connect(
                &settings.socket_url,
                channel,
                settings.access_token.clone(),
                revision,
            ) {
                Ok(mut connection) => {
                    let heartbeat =
                        std::time::Duration::from_secs(settings.heartbeat_secs.max(1) as u64);
                    loop {
                        let timer = gloo_timers::future::sleep(heartbeat);
                        let woken = match select(timer, connection.dropped.next()).await {
                            Either::Left(_) => false,
                            Either::Right(_) => true,
                        };
                        if connection.socket.ready_state() != WebSocket::OPEN {
                            break;
                        }
                        let state = connection.channel.borrow().state();
                        if state == ChannelState::Joined {
                            attempt = 0;
                        } else if state == ChannelState::Errored {
                            break;
                        }
                        if !woken {
                            let beat = connection.channel.borrow_mut().heartbeat();
                            send(&connection.socket, &beat);
                        }
                    }
                    connection.channel.borrow_mut().socket_closed();
                    tracing::info!("Realtime socket for {} closed, reconnecting", table);
                }
                Err(e) => tracing::warn!("Realtime socket failed to open: {}", e),
            }

            gloo_timers::future::sleep(reconnect_delay(attempt)).await;
            attempt += 1;
        }
    }
}
