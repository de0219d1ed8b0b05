//! Sync Agent
//!
//! Client-side coordinator. It owns the event hub, the open conversation
//! and its subscription, and routes the user's own actions through the HTTP
//! client, patching the local view only with confirmed results.
//!
//! Opening a conversation subscribes before fetching, so nothing pushed
//! between the fetch and the subscription is lost. Switching conversations
//! drops the previous subscription. Whenever the subscription reports lost
//! events (it fell behind, or the stream reconnected) the view is refetched.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::client::api::{ChatApiClient, ClientError};
use crate::client::conversation::ConversationView;
use crate::client::subscription::{ConnectionStatus, ConversationSubscription, Delivery, EventHub};
use crate::shared::error::ChatError;
use crate::shared::event::RealtimeEvent;
use crate::shared::message::{DeleteScope, Message};
use crate::shared::messaging::{SendMessageRequest, UserSummary};

/// Events the hub queues per subscription before it counts as lagging
pub const DEFAULT_EVENT_BUFFER: usize = 256;

struct OpenConversation {
    view: ConversationView,
    subscription: ConversationSubscription,
}

pub struct SyncAgent {
    self_id: Uuid,
    api: ChatApiClient,
    hub: EventHub,
    open: Option<OpenConversation>,
}

impl SyncAgent {
    /// Connect to the event stream as `self_id`; must be called inside a Tokio runtime
    pub fn connect(api: ChatApiClient, self_id: Uuid) -> Self {
        Self::connect_with_buffer(api, self_id, DEFAULT_EVENT_BUFFER)
    }

    /// Like `connect`, queueing at most `buffer` events for a slow reader
    pub fn connect_with_buffer(api: ChatApiClient, self_id: Uuid, buffer: usize) -> Self {
        let hub = EventHub::connect(api.clone(), buffer);
        Self {
            self_id,
            api,
            hub,
            open: None,
        }
    }

    pub fn self_id(&self) -> Uuid {
        self.self_id
    }

    pub fn status(&self) -> ConnectionStatus {
        self.hub.status()
    }

    pub fn online_users(&self) -> BTreeSet<Uuid> {
        self.hub.online_users()
    }

    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.hub.is_online(user_id)
    }

    pub async fn list_users(&self) -> Result<Vec<UserSummary>, ClientError> {
        self.api.list_users().await
    }

    /// The open conversation, if any
    pub fn conversation(&self) -> Option<&ConversationView> {
        self.open.as_ref().map(|open| &open.view)
    }

    /// Open the conversation with `counterpart_id`, replacing the current one
    pub async fn open_conversation(
        &mut self,
        counterpart_id: Uuid,
    ) -> Result<&ConversationView, ClientError> {
        self.close_conversation();

        let mut subscription = self.hub.subscribe(counterpart_id);
        let messages = self.api.fetch_conversation(counterpart_id).await?;
        tracing::debug!(
            counterpart_id = %counterpart_id,
            count = messages.len(),
            "[SyncAgent] Conversation opened"
        );

        // Events queued while fetching may duplicate the fetch; merging is idempotent.
        let mut view = ConversationView::open(self.self_id, counterpart_id, messages);
        if let Drained::Stale = drain(&mut view, &mut subscription) {
            let messages = self.api.fetch_conversation(counterpart_id).await?;
            view = ConversationView::open(self.self_id, counterpart_id, messages);
        }

        let open = self.open.insert(OpenConversation { view, subscription });
        Ok(&open.view)
    }

    /// Close the open conversation and release its subscription
    pub fn close_conversation(&mut self) {
        if let Some(open) = self.open.take() {
            tracing::debug!(
                counterpart_id = %open.view.counterpart_id(),
                "[SyncAgent] Conversation closed"
            );
        }
    }

    /// Apply every event queued for the open conversation
    ///
    /// Refetches when events were lost. Returns whether the view changed.
    pub async fn sync(&mut self) -> Result<bool, ClientError> {
        let Some(open) = self.open.as_mut() else {
            return Ok(false);
        };
        match drain(&mut open.view, &mut open.subscription) {
            Drained::Applied(changed) => Ok(changed),
            Drained::Stale => self.refetch().await.map(|_| true),
        }
    }

    /// Wait for the next event and apply it to the open conversation
    ///
    /// Returns `None` when no conversation is open, the hub has stopped, or
    /// events were lost and the view was refetched instead.
    pub async fn next_event(&mut self) -> Option<RealtimeEvent> {
        let open = self.open.as_mut()?;
        match open.subscription.recv().await? {
            Delivery::Event(event) => {
                open.view.apply_event(&event);
                return Some(event);
            }
            Delivery::Missed(skipped) => {
                tracing::warn!(skipped, "[SyncAgent] Missed events, refetching");
            }
            Delivery::Reconnected => {
                tracing::info!("[SyncAgent] Event stream reconnected, refetching");
            }
        }
        if let Err(e) = self.refetch().await {
            self.record_error(&e);
        }
        None
    }

    pub async fn send_text(&mut self, text: &str) -> Result<Message, ClientError> {
        self.send(SendMessageRequest::text(text)).await
    }

    pub async fn send(&mut self, request: SendMessageRequest) -> Result<Message, ClientError> {
        let receiver_id = self.require_open()?;
        match self.api.send_message(receiver_id, &request).await {
            Ok(message) => {
                if let Some(open) = self.open.as_mut() {
                    open.view.apply_sent(message.clone());
                }
                Ok(message)
            }
            Err(e) => {
                self.record_error(&e);
                Err(e)
            }
        }
    }

    pub async fn edit(&mut self, message_id: Uuid, text: &str) -> Result<Message, ClientError> {
        match self.api.edit_message(message_id, text).await {
            Ok(message) => {
                if let Some(open) = self.open.as_mut() {
                    open.view.apply_edited(message.clone());
                }
                Ok(message)
            }
            Err(e) => {
                self.record_error(&e);
                Err(e)
            }
        }
    }

    pub async fn delete(&mut self, message_id: Uuid, scope: DeleteScope) -> Result<(), ClientError> {
        match self.api.delete_message(message_id, scope).await {
            Ok(_) => {
                if let Some(open) = self.open.as_mut() {
                    open.view.apply_deleted(message_id, scope);
                }
                Ok(())
            }
            Err(e) => {
                self.record_error(&e);
                Err(e)
            }
        }
    }

    /// Tell the open conversation's counterpart whether this user is typing
    pub async fn set_typing(&self, is_typing: bool) -> Result<(), ClientError> {
        let receiver_id = self.require_open()?;
        self.api.send_typing(receiver_id, is_typing).await
    }

    fn require_open(&self) -> Result<Uuid, ClientError> {
        self.open
            .as_ref()
            .map(|open| open.view.counterpart_id())
            .ok_or_else(|| ChatError::validation("conversation", "No conversation is open").into())
    }

    async fn refetch(&mut self) -> Result<(), ClientError> {
        let Some(open) = self.open.as_mut() else {
            return Ok(());
        };
        let counterpart_id = open.view.counterpart_id();
        let messages = self.api.fetch_conversation(counterpart_id).await?;
        open.view = ConversationView::open(self.self_id, counterpart_id, messages);
        Ok(())
    }

    fn record_error(&mut self, error: &ClientError) {
        tracing::warn!("[SyncAgent] Request failed: {}", error);
        if let Some(open) = self.open.as_mut() {
            open.view.record_error(error.user_message());
        }
    }
}

enum Drained {
    Applied(bool),
    Stale,
}

fn drain(view: &mut ConversationView, subscription: &mut ConversationSubscription) -> Drained {
    let mut changed = false;
    while let Some(delivery) = subscription.try_recv() {
        match delivery {
            Delivery::Event(event) => changed |= view.apply_event(&event),
            Delivery::Missed(_) | Delivery::Reconnected => return Drained::Stale,
        }
    }
    Drained::Applied(changed)
}
