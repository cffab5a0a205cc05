//! # Realtime change channel
//!
//! The hosted backend pushes row changes over a Phoenix-channel websocket.
//! This module holds the transport-independent half: the JSON frame codec
//! ([`Message`]), the per-table [`Channel`] state machine and the reconnect
//! schedule. The browser side owns the socket and feeds frames through
//! [`Channel::handle`].
//!
//! ## Lifecycle
//!
//! ```text
//! Closed --join--> Joining --phx_reply ok--> Joined --leave--> Leaving --reply/close--> Closed
//!                     \________ phx_reply error / phx_error / phx_close ________/--> Errored
//! ```
//!
//! An `Errored` channel is re-joined by the caller after
//! [`reconnect_delay`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Topic used for socket-level heartbeats.
pub const HEARTBEAT_TOPIC: &str = "phoenix";

/// One websocket frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

impl Message {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Kind of row change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A decoded `postgres_changes` notification.
#[derive(Clone, Debug, PartialEq)]
pub struct Change {
    pub kind: ChangeKind,
    pub table: String,
    /// New row for inserts and updates, `Null` for deletes.
    pub record: Value,
    pub old_record: Value,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelState {
    Closed,
    Joining,
    Joined,
    Leaving,
    Errored,
}

/// What an incoming frame meant for the channel.
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelEvent {
    Joined,
    Change(Change),
    Left,
    Error(String),
}

/// Subscription to every change on one `public` table.
#[derive(Clone, Debug)]
pub struct Channel {
    table: String,
    filter: Option<String>,
    topic: String,
    state: ChannelState,
    next_ref: u64,
    join_ref: Option<String>,
    leave_ref: Option<String>,
}

impl Channel {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filter: None,
            topic: format!("realtime:public:{table}"),
            state: ChannelState::Closed,
            next_ref: 1,
            join_ref: None,
            leave_ref: None,
        }
    }

    /// Narrow the subscription with a `column=eq.value` row filter.
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// `phx_join` asking for all changes on the table.
    pub fn join(&mut self, access_token: Option<&str>) -> Message {
        let reference = self.make_ref();
        self.join_ref = Some(reference.clone());
        self.state = ChannelState::Joining;

        let mut changes = json!({ "event": "*", "schema": "public", "table": self.table });
        if let Some(filter) = &self.filter {
            changes["filter"] = Value::String(filter.clone());
        }
        let mut payload = json!({
            "config": {
                "broadcast": { "self": false },
                "presence": { "key": "" },
                "postgres_changes": [changes],
            }
        });
        if let Some(token) = access_token {
            payload["access_token"] = Value::String(token.to_string());
        }

        Message {
            topic: self.topic.clone(),
            event: "phx_join".into(),
            payload,
            reference: Some(reference),
        }
    }

    pub fn heartbeat(&mut self) -> Message {
        Message {
            topic: HEARTBEAT_TOPIC.into(),
            event: "heartbeat".into(),
            payload: json!({}),
            reference: Some(self.make_ref()),
        }
    }

    /// `phx_leave`, or `None` when there is nothing to leave.
    pub fn leave(&mut self) -> Option<Message> {
        if !matches!(self.state, ChannelState::Joining | ChannelState::Joined) {
            self.state = ChannelState::Closed;
            return None;
        }
        let reference = self.make_ref();
        self.leave_ref = Some(reference.clone());
        self.state = ChannelState::Leaving;
        Some(Message {
            topic: self.topic.clone(),
            event: "phx_leave".into(),
            payload: json!({}),
            reference: Some(reference),
        })
    }

    /// The socket went away underneath the channel.
    pub fn socket_closed(&mut self) {
        self.state = match self.state {
            ChannelState::Leaving | ChannelState::Closed => ChannelState::Closed,
            _ => ChannelState::Errored,
        };
    }

    /// Apply an incoming frame. Frames for other topics and heartbeat
    /// replies yield `None`.
    pub fn handle(&mut self, message: &Message) -> Option<ChannelEvent> {
        if message.topic != self.topic {
            return None;
        }

        match message.event.as_str() {
            "phx_reply" => self.handle_reply(message),
            "postgres_changes" => {
                if self.state != ChannelState::Joined {
                    return None;
                }
                parse_change(&message.payload).map(ChannelEvent::Change)
            }
            "phx_error" => {
                self.state = ChannelState::Errored;
                Some(ChannelEvent::Error("channel error".into()))
            }
            "phx_close" => {
                if self.state == ChannelState::Leaving {
                    self.state = ChannelState::Closed;
                    Some(ChannelEvent::Left)
                } else {
                    self.state = ChannelState::Errored;
                    Some(ChannelEvent::Error("channel closed by server".into()))
                }
            }
            _ => None,
        }
    }

    fn handle_reply(&mut self, message: &Message) -> Option<ChannelEvent> {
        let ok = message.payload.get("status").and_then(Value::as_str) == Some("ok");
        let reference = message.reference.as_ref();

        if self.state == ChannelState::Joining && reference == self.join_ref.as_ref() {
            if ok {
                self.state = ChannelState::Joined;
                return Some(ChannelEvent::Joined);
            }
            self.state = ChannelState::Errored;
            let reason = message
                .payload
                .pointer("/response/reason")
                .and_then(Value::as_str)
                .unwrap_or("join refused");
            return Some(ChannelEvent::Error(reason.to_string()));
        }

        if self.state == ChannelState::Leaving && reference == self.leave_ref.as_ref() {
            self.state = ChannelState::Closed;
            return Some(ChannelEvent::Left);
        }

        None
    }

    fn make_ref(&mut self) -> String {
        let r = self.next_ref;
        self.next_ref += 1;
        r.to_string()
    }
}

fn parse_change(payload: &Value) -> Option<Change> {
    let data = payload.get("data")?;
    let kind = serde_json::from_value(data.get("type")?.clone()).ok()?;
    Some(Change {
        kind,
        table: data.get("table")?.as_str()?.to_string(),
        record: data.get("record").cloned().unwrap_or(Value::Null),
        old_record: data.get("old_record").cloned().unwrap_or(Value::Null),
    })
}

/// Delay before reconnect attempt `attempt` (0-based): 1s, 2s, 5s, then 10s.
pub fn reconnect_delay(attempt: u32) -> Duration {
    match attempt {
        0 => Duration::from_secs(1),
        1 => Duration::from_secs(2),
        2 => Duration::from_secs(5),
        _ => Duration::from_secs(10),
    }
}

/// Websocket URL for the backend at `base_url`.
pub fn socket_url(base_url: &str, anon_key: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    format!("{base}/realtime/v1/websocket?apikey={anon_key}&vsn=1.0.0")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(channel: &Channel, reference: &str, status: &str) -> Message {
        Message {
            topic: channel.topic().to_string(),
            event: "phx_reply".into(),
            payload: json!({ "status": status, "response": {} }),
            reference: Some(reference.to_string()),
        }
    }

    #[test]
    fn join_frame_subscribes_to_table() {
        let mut channel = Channel::new("events");
        let join = channel.join(Some("jwt"));
        let text = join.encode().unwrap();
        let back = Message::decode(&text).unwrap();

        assert_eq!(back.topic, "realtime:public:events");
        assert_eq!(back.event, "phx_join");
        assert_eq!(back.reference.as_deref(), Some("1"));
        assert_eq!(
            back.payload["config"]["postgres_changes"][0],
            json!({ "event": "*", "schema": "public", "table": "events" })
        );
        assert_eq!(back.payload["access_token"], "jwt");
        assert_eq!(channel.state(), ChannelState::Joining);
    }

    #[test]
    fn join_frame_carries_row_filter() {
        let mut channel =
            Channel::new("events").with_filter(Some("event_type=eq.workshop".into()));
        let join = channel.join(None);
        assert_eq!(
            join.payload["config"]["postgres_changes"][0],
            json!({
                "event": "*",
                "schema": "public",
                "table": "events",
                "filter": "event_type=eq.workshop",
            })
        );
        assert!(join.payload.get("access_token").is_none());
    }

    #[test]
    fn full_lifecycle() {
        let mut channel = Channel::new("events");
        channel.join(None);

        // Heartbeat replies arrive on the phoenix topic and are ignored.
        let hb = channel.heartbeat();
        assert_eq!(hb.topic, "phoenix");
        let hb_reply = Message {
            topic: "phoenix".into(),
            ..reply(&channel, "2", "ok")
        };
        assert_eq!(channel.handle(&hb_reply), None);

        assert_eq!(channel.handle(&reply(&channel, "1", "ok")), Some(ChannelEvent::Joined));
        assert_eq!(channel.state(), ChannelState::Joined);

        let change = Message {
            topic: channel.topic().to_string(),
            event: "postgres_changes".into(),
            payload: json!({
                "ids": [1],
                "data": {
                    "type": "UPDATE",
                    "table": "events",
                    "schema": "public",
                    "record": { "id": "e1", "title": "Renamed" },
                    "old_record": { "id": "e1" },
                }
            }),
            reference: None,
        };
        match channel.handle(&change) {
            Some(ChannelEvent::Change(c)) => {
                assert_eq!(c.kind, ChangeKind::Update);
                assert_eq!(c.table, "events");
                assert_eq!(c.record["title"], "Renamed");
            }
            other => panic!("unexpected {other:?}"),
        }

        let leave = channel.leave().unwrap();
        assert_eq!(leave.event, "phx_leave");
        assert_eq!(channel.state(), ChannelState::Leaving);
        let leave_ref = leave.reference.unwrap();
        assert_eq!(channel.handle(&reply(&channel, &leave_ref, "ok")), Some(ChannelEvent::Left));
        assert_eq!(channel.state(), ChannelState::Closed);
        assert!(channel.leave().is_none());
    }

    #[test]
    fn refused_join_and_server_close_error_the_channel() {
        let mut channel = Channel::new("events");
        channel.join(None);
        let mut refused = reply(&channel, "1", "error");
        refused.payload = json!({ "status": "error", "response": { "reason": "unauthorized" } });
        assert_eq!(
            channel.handle(&refused),
            Some(ChannelEvent::Error("unauthorized".into()))
        );
        assert_eq!(channel.state(), ChannelState::Errored);

        channel.join(None);
        let join_ref = "2";
        channel.handle(&reply(&channel, join_ref, "ok"));
        let close = Message {
            topic: channel.topic().to_string(),
            event: "phx_close".into(),
            payload: json!({}),
            reference: None,
        };
        assert!(matches!(channel.handle(&close), Some(ChannelEvent::Error(_))));
        assert_eq!(channel.state(), ChannelState::Errored);

        channel.socket_closed();
        assert_eq!(channel.state(), ChannelState::Errored);
    }

    #[test]
    fn changes_before_join_are_dropped() {
        let mut channel = Channel::new("events");
        channel.join(None);
        let change = Message {
            topic: channel.topic().to_string(),
            event: "postgres_changes".into(),
            payload: json!({ "data": { "type": "INSERT", "table": "events", "record": {} } }),
            reference: None,
        };
        assert_eq!(channel.handle(&change), None);
    }

    #[test]
    fn reconnect_schedule_and_url() {
        let delays: Vec<u64> = (0..5).map(|n| reconnect_delay(n).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 5, 10, 10]);
        assert_eq!(
            socket_url("https://abc.example.co/", "anon"),
            "wss://abc.example.co/realtime/v1/websocket?apikey=anon&vsn=1.0.0"
        );
    }
}
