/**
 * Directory-wide Event Broadcasting
 *
 * Events that concern every connected user (the online set) go through a
 * `tokio::sync::broadcast` channel that each open event stream subscribes to.
 * Per-user events never use this channel; they are pushed to the user's own
 * channel by the dispatcher.
 */
use crate::shared::event::RealtimeEvent;
use tokio::sync::broadcast;

/// Sender half of the directory-wide channel
pub type RealtimeEventBroadcast = broadcast::Sender<RealtimeEvent>;

/// Broadcast an event to every open stream
///
/// Returns the number of receivers, 0 when nobody is connected.
pub fn broadcast_event(broadcast_tx: &RealtimeEventBroadcast, event: RealtimeEvent) -> usize {
    let event_type = event.event_type();
    match broadcast_tx.send(event) {
        Ok(subscriber_count) => {
            tracing::debug!(
                event = event_type.as_str(),
                subscribers = subscriber_count,
                "[Realtime] Event broadcast"
            );
            subscriber_count
        }
        Err(_) => {
            tracing::debug!(event = event_type.as_str(), "[Realtime] No subscribers");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_broadcast_event_with_subscribers() {
        let (tx, _) = broadcast::channel::<RealtimeEvent>(16);
        let mut sub1 = tx.subscribe();
        let mut sub2 = tx.subscribe();

        let users: BTreeSet<Uuid> = [Uuid::new_v4()].into_iter().collect();
        let count = broadcast_event(&tx, RealtimeEvent::online_users(users.clone()));
        assert_eq!(count, 2);

        for rx in [&mut sub1, &mut sub2] {
            assert_eq!(
                rx.recv().await.unwrap(),
                RealtimeEvent::OnlineUsersChanged { user_ids: users.clone() }
            );
        }
    }

    #[tokio::test]
    async fn test_broadcast_event_no_subscribers() {
        let (tx, _) = broadcast::channel::<RealtimeEvent>(16);
        let count = broadcast_event(&tx, RealtimeEvent::online_users(BTreeSet::new()));
        assert_eq!(count, 0);
    }
}
