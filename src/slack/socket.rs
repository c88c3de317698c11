//! Slack Socket Mode event feed.
//!
//! Events are dispatched one at a time: the next websocket frame is not
//! read until the bot has finished with the current one.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

use super::client::SlackClient;
use crate::core::ChatBot;
use crate::error::{Error, Result};
use crate::platform::{InboundEvent, TeamJoin};

#[derive(Debug, Clone, Deserialize)]
pub struct SocketEnvelope {
    #[serde(default)]
    pub envelope_id: String,
    #[serde(rename = "type")]
    pub envelope_type: String,
    #[serde(default)]
    pub payload: Value,
}

/// A decoded feed item.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Message(InboundEvent),
    TeamJoin(TeamJoin),
    /// Slack asked us to reconnect.
    Disconnect,
    Ignored,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    #[serde(default)]
    user: String,
    #[serde(default)]
    bot_id: Option<String>,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    channel: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct TeamJoinPayload {
    user: JoinedUser,
}

#[derive(Debug, Deserialize)]
struct JoinedUser {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    real_name: Option<String>,
}

pub fn parse_envelope(message: WsMessage) -> Result<Option<SocketEnvelope>> {
    let text = match message {
        WsMessage::Text(text) => text,
        WsMessage::Binary(bytes) => String::from_utf8(bytes)
            .map_err(|_| Error::Slack("invalid utf-8 socket payload".to_string()))?,
        WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Close(_) | WsMessage::Frame(_) => {
            return Ok(None)
        }
    };
    Ok(Some(serde_json::from_str(&text)?))
}

/// Turn an envelope into something the bot understands.
pub fn decode_event(envelope: &SocketEnvelope) -> Result<FeedEvent> {
    match envelope.envelope_type.as_str() {
        "disconnect" => return Ok(FeedEvent::Disconnect),
        "events_api" => {}
        _ => return Ok(FeedEvent::Ignored),
    }

    if envelope.payload.get("type").and_then(Value::as_str) != Some("event_callback") {
        return Ok(FeedEvent::Ignored);
    }
    let event = match envelope.payload.get("event") {
        Some(event) => event.clone(),
        None => return Ok(FeedEvent::Ignored),
    };

    match event.get("type").and_then(Value::as_str) {
        Some("message") => {
            let message: MessagePayload = serde_json::from_value(event)?;
            Ok(FeedEvent::Message(InboundEvent {
                user: message.user,
                is_bot: message.bot_id.is_some_and(|id| !id.is_empty()),
                subtype: message.subtype,
                channel: message.channel,
                text: message.text,
            }))
        }
        Some("team_join") => {
            let join: TeamJoinPayload = serde_json::from_value(event)?;
            let user_name = if join.user.name.is_empty() {
                join.user.real_name.unwrap_or_default()
            } else {
                join.user.name
            };
            Ok(FeedEvent::TeamJoin(TeamJoin {
                user_id: join.user.id,
                user_name,
            }))
        }
        _ => Ok(FeedEvent::Ignored),
    }
}

/// Run the feed until Ctrl-C, reconnecting after `reconnect_delay`.
pub async fn run_event_feed(
    client: &SlackClient,
    bot: Arc<ChatBot>,
    reconnect_delay: Duration,
) -> Result<()> {
    loop {
        match client.open_socket_connection().await {
            Ok(url) => {
                tracing::info!("Slack socket connected");
                match run_socket_session(&url, &bot).await {
                    Ok(SessionEnd::Shutdown) => return Ok(()),
                    Ok(SessionEnd::Reconnect) => tracing::info!("Slack requested reconnect"),
                    Err(e) => tracing::error!("Slack socket session error: {}", e),
                }
            }
            Err(e @ Error::Config(_)) => return Err(e),
            Err(e) => tracing::error!("Failed to open Slack socket connection: {}", e),
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested");
                return Ok(());
            }
            _ = tokio::time::sleep(reconnect_delay) => {}
        }
    }
}

enum SessionEnd {
    Shutdown,
    Reconnect,
}

async fn run_socket_session(url: &str, bot: &ChatBot) -> Result<SessionEnd> {
    let (stream, _response) = connect_async(url)
        .await
        .map_err(|e| Error::Slack(format!("failed to connect socket mode websocket: {}", e)))?;
    let (mut sink, mut source) = stream.split();

    loop {
        let message = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested");
                return Ok(SessionEnd::Shutdown);
            }
            next = source.next() => match next {
                Some(message) => message
                    .map_err(|e| Error::Slack(format!("failed reading websocket: {}", e)))?,
                None => return Ok(SessionEnd::Reconnect),
            },
        };

        let envelope = match parse_envelope(message) {
            Ok(Some(envelope)) => envelope,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!("Skipping undecodable socket frame: {}", e);
                continue;
            }
        };

        if !envelope.envelope_id.is_empty() {
            let ack = json!({ "envelope_id": envelope.envelope_id }).to_string();
            sink.send(WsMessage::Text(ack))
                .await
                .map_err(|e| Error::Slack(format!("failed to send socket ack: {}", e)))?;
        }

        match decode_event(&envelope) {
            Ok(FeedEvent::Message(event)) => match bot.handle_message(&event).await {
                Ok(outcome) => tracing::trace!("Dispatched event: {:?}", outcome),
                Err(e) => tracing::error!("Dispatch failed: {}", e),
            },
            Ok(FeedEvent::TeamJoin(join)) => {
                tracing::info!("New team member {} ({})", join.user_name, join.user_id);
                if let Err(e) = bot.team_joined(&join).await {
                    tracing::error!("Welcome failed: {}", e);
                }
            }
            Ok(FeedEvent::Disconnect) => return Ok(SessionEnd::Reconnect),
            Ok(FeedEvent::Ignored) => {}
            Err(e) => tracing::warn!("Skipping undecodable event: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(body: &str) -> SocketEnvelope {
        parse_envelope(WsMessage::Text(body.to_string()))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_decode_user_message() {
        let env = envelope(
            r#"{
                "envelope_id": "e1",
                "type": "events_api",
                "payload": {
                    "type": "event_callback",
                    "event": {"type": "message", "user": "U1", "channel": "D1", "text": "Help"}
                }
            }"#,
        );
        assert_eq!(env.envelope_id, "e1");
        assert_eq!(
            decode_event(&env).unwrap(),
            FeedEvent::Message(InboundEvent {
                user: "U1".to_string(),
                is_bot: false,
                subtype: None,
                channel: "D1".to_string(),
                text: "Help".to_string(),
            })
        );
    }

    #[test]
    fn test_decode_bot_message() {
        let env = envelope(
            r#"{
                "envelope_id": "e2",
                "type": "events_api",
                "payload": {
                    "type": "event_callback",
                    "event": {"type": "message", "subtype": "bot_message", "bot_id": "B9",
                              "channel": "C1", "text": "hi"}
                }
            }"#,
        );
        match decode_event(&env).unwrap() {
            FeedEvent::Message(event) => {
                assert!(event.is_bot);
                assert!(event.user.is_empty());
                assert_eq!(event.subtype.as_deref(), Some("bot_message"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_team_join() {
        let env = envelope(
            r#"{
                "envelope_id": "e3",
                "type": "events_api",
                "payload": {
                    "type": "event_callback",
                    "event": {"type": "team_join", "user": {"id": "U7", "name": "carol"}}
                }
            }"#,
        );
        assert_eq!(
            decode_event(&env).unwrap(),
            FeedEvent::TeamJoin(TeamJoin {
                user_id: "U7".to_string(),
                user_name: "carol".to_string(),
            })
        );
    }

    #[test]
    fn test_decode_control_envelopes() {
        let hello = envelope(r#"{"type": "hello", "num_connections": 1}"#);
        assert!(hello.envelope_id.is_empty());
        assert_eq!(decode_event(&hello).unwrap(), FeedEvent::Ignored);

        let disconnect = envelope(r#"{"type": "disconnect", "reason": "refresh_requested"}"#);
        assert_eq!(decode_event(&disconnect).unwrap(), FeedEvent::Disconnect);

        let reaction = envelope(
            r#"{"envelope_id": "e4", "type": "events_api",
                "payload": {"type": "event_callback", "event": {"type": "reaction_added"}}}"#,
        );
        assert_eq!(decode_event(&reaction).unwrap(), FeedEvent::Ignored);
    }

    #[test]
    fn test_control_frames_are_skipped() {
        assert!(parse_envelope(WsMessage::Ping(vec![1])).unwrap().is_none());
        assert!(parse_envelope(WsMessage::Text("not json".to_string())).is_err());
    }
}
