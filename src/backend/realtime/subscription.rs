/**
 * Real-time Subscription Handler
 *
 * `GET /api/realtime` opens a Server-Sent Events stream. One open stream is
 * one channel: opening it registers the channel as the user's current one
 * and broadcasts the new online set; dropping it unregisters that channel.
 *
 * # Event Stream
 *
 * ```http
 * HTTP/1.1 200 OK
 * Content-Type: text/event-stream
 *
 * event: onlineUsersChanged
 * data: {"type":"onlineUsersChanged","data":{"user_ids":["..."]}}
 *
 * event: newMessage
 * data: {"type":"newMessage","data":{"id":"...","text":"hi",...}}
 * ```
 *
 * A stream superseded by a newer connection of the same user ends on its own.
 * Lagged directory receivers are resynchronised with the current online set.
 */
use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::{stream, Stream};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::backend::middleware::AuthUser;
use crate::backend::realtime::dispatcher::EventDispatcher;
use crate::backend::realtime::presence::ChannelId;
use crate::shared::event::RealtimeEvent;

/// Unregisters its channel when the stream is dropped
struct PresenceSession {
    dispatcher: EventDispatcher,
    user_id: Uuid,
    channel_id: ChannelId,
}

impl Drop for PresenceSession {
    fn drop(&mut self) {
        self.dispatcher.disconnect(self.user_id, self.channel_id);
    }
}

fn sse_event(event: &RealtimeEvent) -> Result<Event, serde_json::Error> {
    let data = serde_json::to_string(event)?;
    Ok(Event::default().event(event.event_type().as_str()).data(data))
}

/// Handle real-time subscription (GET /api/realtime)
pub async fn handle_realtime_subscription(
    State(dispatcher): State<EventDispatcher>,
    AuthUser(user_id): AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let connection = dispatcher.connect(user_id);
    let session = PresenceSession {
        dispatcher,
        user_id,
        channel_id: connection.channel_id,
    };

    let stream = stream::unfold(
        (connection.events, connection.directory, session),
        |(mut events, mut directory, session)| async move {
            loop {
                let event = tokio::select! {
                    event = events.recv() => match event {
                        Some(event) => event,
                        None => {
                            tracing::info!(
                                user_id = %session.user_id,
                                channel_id = %session.channel_id,
                                "[Realtime] Channel superseded, ending stream"
                            );
                            return None;
                        }
                    },
                    event = directory.recv() => match event {
                        Ok(event) => event,
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(
                                user_id = %session.user_id,
                                skipped,
                                "[Realtime] Receiver lagged, resending online users"
                            );
                            RealtimeEvent::online_users(session.dispatcher.online_users())
                        }
                        Err(RecvError::Closed) => return None,
                    },
                };

                match sse_event(&event) {
                    Ok(sse) => return Some((Ok(sse), (events, directory, session))),
                    Err(e) => {
                        tracing::error!("[Realtime] Failed to serialize event: {:?}", e);
                        continue;
                    }
                }
            }
        },
    );

    Sse::new(stream).keep_alive(KeepAlive::default())
}

