//! Realtime Subscription
//!
//! `EventHub` owns the single event stream of a signed-in client. A background
//! task reads `GET /api/realtime`, tracks the online set, and fans events out
//! to the open `ConversationSubscription`s. Each subscription only yields the
//! events that can touch its conversation.
//!
//! Connection loss is retried with exponential backoff (1s doubling to 30s,
//! reset on a successful connect). While retrying the online set is empty.
//! Once a connection succeeds after a failure, every subscription receives
//! `Delivery::Reconnected`: events pushed in the gap are gone and the holder
//! must refetch. A stream the server closes cleanly is not reopened: that
//! happens when a newer connection of the same user replaced this one.

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::client::api::{ChatApiClient, ClientError};
use crate::client::events::SseDecoder;
use crate::shared::event::RealtimeEvent;

const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(1000);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Retrying { attempt: u32 },
    Error(String),
    Disconnected,
}

/// What a subscription yields
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Event(RealtimeEvent),
    /// Events were dropped; the holder should refetch
    Missed(u64),
    /// The stream came back after a failure; the holder should refetch
    Reconnected,
}

#[derive(Debug, Clone)]
enum HubSignal {
    Event(RealtimeEvent),
    Reconnected,
}

/// Listener for one open conversation
///
/// Receives the hub's events for the conversation with `counterpart_id`
/// until dropped.
pub struct ConversationSubscription {
    counterpart_id: Uuid,
    receiver: broadcast::Receiver<HubSignal>,
}

impl ConversationSubscription {
    /// Wait for the next delivery; `None` once the hub is gone
    pub async fn recv(&mut self) -> Option<Delivery> {
        loop {
            match self.receiver.recv().await {
                Ok(signal) => {
                    if let Some(delivery) = self.accept(signal) {
                        return Some(delivery);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => return Some(Delivery::Missed(n)),
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take a delivery if one is already queued
    pub fn try_recv(&mut self) -> Option<Delivery> {
        loop {
            match self.receiver.try_recv() {
                Ok(signal) => {
                    if let Some(delivery) = self.accept(signal) {
                        return Some(delivery);
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(n)) => return Some(Delivery::Missed(n)),
                Err(_) => return None,
            }
        }
    }

    fn accept(&self, signal: HubSignal) -> Option<Delivery> {
        match signal {
            HubSignal::Reconnected => Some(Delivery::Reconnected),
            HubSignal::Event(event) if self.concerns(&event) => Some(Delivery::Event(event)),
            HubSignal::Event(_) => None,
        }
    }

    fn concerns(&self, event: &RealtimeEvent) -> bool {
        match event {
            RealtimeEvent::NewMessage(message) => message.involves(self.counterpart_id),
            RealtimeEvent::UserTyping { sender_id }
            | RealtimeEvent::UserStoppedTyping { sender_id } => *sender_id == self.counterpart_id,
            // Deltas only carry the message id; the view ignores ids it does not hold.
            RealtimeEvent::MessageEdited { .. } | RealtimeEvent::MessageDeleted { .. } => true,
            // Tracked by the hub.
            RealtimeEvent::OnlineUsersChanged { .. } => false,
        }
    }
}

pub struct EventHub {
    events: broadcast::Sender<HubSignal>,
    status: watch::Receiver<ConnectionStatus>,
    online: Arc<RwLock<BTreeSet<Uuid>>>,
    task: JoinHandle<()>,
}

impl EventHub {
    /// Start reading the event stream; must be called inside a Tokio runtime
    pub fn connect(api: ChatApiClient, buffer: usize) -> Self {
        let (events, _) = broadcast::channel(buffer.max(1));
        let (status_tx, status) = watch::channel(ConnectionStatus::Connecting);
        let online = Arc::new(RwLock::new(BTreeSet::new()));

        let task = tokio::spawn(run_event_stream(
            api,
            events.clone(),
            status_tx,
            online.clone(),
        ));

        Self {
            events,
            status,
            online,
            task,
        }
    }

    /// Subscribe on opening a conversation
    pub fn subscribe(&self, counterpart_id: Uuid) -> ConversationSubscription {
        ConversationSubscription {
            counterpart_id,
            receiver: self.events.subscribe(),
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    pub fn online_users(&self) -> BTreeSet<Uuid> {
        self.online
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.online
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&user_id)
    }
}

impl Drop for EventHub {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_event_stream(
    api: ChatApiClient,
    events: broadcast::Sender<HubSignal>,
    status: watch::Sender<ConnectionStatus>,
    online: Arc<RwLock<BTreeSet<Uuid>>>,
) {
    let mut retry_delay = INITIAL_RETRY_DELAY;
    let mut attempt = 0u32;
    let mut resync = false;

    loop {
        status.send_replace(ConnectionStatus::Connecting);

        match api.open_event_stream().await {
            Ok(response) => {
                tracing::info!("[EventHub] Connected to event stream");
                status.send_replace(ConnectionStatus::Connected);
                retry_delay = INITIAL_RETRY_DELAY;
                attempt = 0;
                if resync {
                    let _ = events.send(HubSignal::Reconnected);
                    resync = false;
                }

                match read_events(response, &events, &online).await {
                    Ok(()) => {
                        tracing::info!("[EventHub] Event stream closed by server");
                        status.send_replace(ConnectionStatus::Disconnected);
                        return;
                    }
                    Err(e) => tracing::warn!("[EventHub] Event stream error: {}", e),
                }
            }
            Err(ClientError::Unauthorized(message)) => {
                tracing::error!("[EventHub] Event stream rejected: {}", message);
                status.send_replace(ConnectionStatus::Error(message));
                return;
            }
            Err(e) => tracing::warn!("[EventHub] Connection failed: {}", e),
        }

        attempt += 1;
        resync = true;
        online.write().unwrap_or_else(PoisonError::into_inner).clear();
        status.send_replace(ConnectionStatus::Retrying { attempt });
        tracing::info!(
            "[EventHub] Reconnecting in {}ms (attempt {})",
            retry_delay.as_millis(),
            attempt
        );
        tokio::time::sleep(retry_delay).await;
        retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
    }
}

async fn read_events(
    response: reqwest::Response,
    events: &broadcast::Sender<HubSignal>,
    online: &RwLock<BTreeSet<Uuid>>,
) -> Result<(), reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut decoder = SseDecoder::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        for frame in decoder.push(&chunk) {
            let event = match frame.decode() {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("[EventHub] Failed to parse event {:?}: {}", frame.event, e);
                    continue;
                }
            };

            if let RealtimeEvent::OnlineUsersChanged { user_ids } = &event {
                *online.write().unwrap_or_else(PoisonError::into_inner) = user_ids.clone();
            }

            // No open conversation is fine; the online set is already updated.
            let _ = events.send(HubSignal::Event(event));
        }
    }
    Ok(())
}
