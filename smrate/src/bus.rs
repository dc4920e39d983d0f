//! Topic-keyed publish/subscribe routing.
//!
//! The bus holds no data of its own; it forwards payload references to the
//! handlers registered for a topic, synchronously and in subscription order.
//! Subscribing hands back a [`SubscriptionToken`] that must be used to
//! unsubscribe; without it, handlers would accumulate for the life of the
//! process.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Global counter for subscription token ids.
static TOKEN_COUNTER: AtomicU64 = AtomicU64::new(1);

type Handler<P> = Arc<dyn Fn(&P) + Send + Sync>;

/// Proof of a registration, required for removal.
///
/// Tokens are unique within a process lifetime and tied to the topic they
/// were issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionToken<K> {
    id: u64,
    topic: K,
}

impl<K> SubscriptionToken<K> {
    /// Returns the topic this token subscribes to.
    pub fn topic(&self) -> &K {
        &self.topic
    }
}

/// Synchronous topic-keyed notification bus.
///
/// `K` is the topic key type; `P` the payload delivered to handlers. Both the
/// registry and each topic's handler list are append-ordered, which is what
/// gives publishes their in-subscription-order delivery guarantee.
pub struct NotificationBus<K, P> {
    subscribers: Mutex<HashMap<K, Vec<(u64, Handler<P>)>>>,
}

impl<K, P> NotificationBus<K, P>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    /// Registers `handler` for future publishes on `topic`.
    ///
    /// Handlers registered first are invoked first on each publish.
    pub fn subscribe<F>(&self, topic: K, handler: F) -> SubscriptionToken<K>
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        let id = TOKEN_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut subscribers = self.subscribers.lock().expect("bus registry poisoned");
        subscribers
            .entry(topic.clone())
            .or_default()
            .push((id, Arc::new(handler)));

        SubscriptionToken { id, topic }
    }

    /// Removes the registration behind `token`.
    ///
    /// Returns true if the handler was still registered. Unsubscribing twice
    /// is harmless.
    pub fn unsubscribe(&self, token: &SubscriptionToken<K>) -> bool {
        let mut subscribers = self.subscribers.lock().expect("bus registry poisoned");
        let Some(handlers) = subscribers.get_mut(&token.topic) else {
            return false;
        };

        let before = handlers.len();
        handlers.retain(|(id, _)| *id != token.id);
        before != handlers.len()
    }

    /// Delivers `payload` to every handler currently registered for `topic`,
    /// synchronously, in subscription order.
    ///
    /// The handler list is snapshotted before delivery, so handlers may
    /// subscribe or unsubscribe reentrantly without deadlocking the bus;
    /// such changes take effect from the next publish.
    pub fn publish(&self, topic: &K, payload: &P) {
        let snapshot: Vec<Handler<P>> = {
            let subscribers = self.subscribers.lock().expect("bus registry poisoned");
            match subscribers.get(topic) {
                Some(handlers) => handlers.iter().map(|(_, h)| Arc::clone(h)).collect(),
                None => return,
            }
        };

        for handler in snapshot {
            handler(payload);
        }
    }

    /// Number of handlers currently registered for `topic`.
    pub fn subscriber_count(&self, topic: &K) -> usize {
        let subscribers = self.subscribers.lock().expect("bus registry poisoned");
        subscribers.get(topic).map_or(0, Vec::len)
    }
}

impl<K, P> Default for NotificationBus<K, P>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    fn collecting_bus() -> (Arc<NotificationBus<String, u32>>, Arc<StdMutex<Vec<u32>>>) {
        (
            Arc::new(NotificationBus::new()),
            Arc::new(StdMutex::new(Vec::new())),
        )
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus: NotificationBus<String, u32> = NotificationBus::new();
        bus.publish(&"nobody".to_string(), &1);
    }

    #[test]
    fn test_delivery_in_subscription_order() {
        let (bus, seen) = collecting_bus();

        for marker in [10u32, 20, 30] {
            let seen = Arc::clone(&seen);
            bus.subscribe("t".to_string(), move |payload: &u32| {
                seen.lock().unwrap().push(marker + payload);
            });
        }

        bus.publish(&"t".to_string(), &1);
        assert_eq!(*seen.lock().unwrap(), vec![11, 21, 31]);
    }

    #[test]
    fn test_topics_are_isolated() {
        let (bus, seen) = collecting_bus();

        let seen_a = Arc::clone(&seen);
        bus.subscribe("a".to_string(), move |p: &u32| {
            seen_a.lock().unwrap().push(*p);
        });

        bus.publish(&"b".to_string(), &7);
        assert!(seen.lock().unwrap().is_empty());

        bus.publish(&"a".to_string(), &7);
        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let (bus, seen) = collecting_bus();

        let seen_clone = Arc::clone(&seen);
        let token = bus.subscribe("t".to_string(), move |p: &u32| {
            seen_clone.lock().unwrap().push(*p);
        });

        bus.publish(&"t".to_string(), &1);
        assert!(bus.unsubscribe(&token));
        bus.publish(&"t".to_string(), &2);

        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert_eq!(bus.subscriber_count(&"t".to_string()), 0);

        // Second unsubscribe is harmless
        assert!(!bus.unsubscribe(&token));
    }

    #[test]
    fn test_unsubscribe_removes_only_its_handler() {
        let (bus, seen) = collecting_bus();

        let seen_first = Arc::clone(&seen);
        let first = bus.subscribe("t".to_string(), move |p: &u32| {
            seen_first.lock().unwrap().push(*p);
        });
        let seen_second = Arc::clone(&seen);
        bus.subscribe("t".to_string(), move |p: &u32| {
            seen_second.lock().unwrap().push(p + 100);
        });

        bus.unsubscribe(&first);
        bus.publish(&"t".to_string(), &1);

        assert_eq!(*seen.lock().unwrap(), vec![101]);
    }

    #[test]
    fn test_reentrant_subscribe_does_not_deadlock() {
        let (bus, seen) = collecting_bus();

        let bus_inner = Arc::clone(&bus);
        let seen_clone = Arc::clone(&seen);
        bus.subscribe("t".to_string(), move |p: &u32| {
            seen_clone.lock().unwrap().push(*p);
            // Registering from inside a handler must not deadlock
            bus_inner.subscribe("t".to_string(), |_: &u32| {});
        });

        bus.publish(&"t".to_string(), &5);
        assert_eq!(*seen.lock().unwrap(), vec![5]);
        assert_eq!(bus.subscriber_count(&"t".to_string()), 2);
    }
}
