//! Scene Event Bus
//!
//! Per-scene publish/subscribe keyed by event kind. Two subscriber shapes:
//! - mailboxes (`subscribe`): events queue until the owner drains them
//! - listeners (`listen`): closures invoked synchronously on publish
//!
//! Subscribers of a kind receive events in subscription order.

use std::collections::BTreeMap;
use std::fmt;
use serde::{Serialize, Deserialize};

use super::collider::ColliderPair;
use super::object::ObjectId;

/// Event routing key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Two solid colliders overlap.
    Collision,
    /// A trigger collider overlaps another collider.
    Trigger,
    /// Gameplay-defined event.
    Custom(String),
}

/// Event published on a scene's bus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneEvent {
    /// Solid overlap this step.
    Collision(ColliderPair),
    /// Trigger overlap this step.
    Trigger(ColliderPair),
    /// Gameplay event.
    Custom {
        /// Routing name.
        name: String,
        /// Publishing object, if any.
        source: Option<ObjectId>,
    },
}

impl SceneEvent {
    /// Gameplay event from an object.
    pub fn custom(name: impl Into<String>, source: Option<ObjectId>) -> Self {
        Self::Custom { name: name.into(), source }
    }

    /// Routing key of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            SceneEvent::Collision(_) => EventKind::Collision,
            SceneEvent::Trigger(_) => EventKind::Trigger,
            SceneEvent::Custom { name, .. } => EventKind::Custom(name.clone()),
        }
    }

    /// Collider pair for collision/trigger events.
    pub fn pair(&self) -> Option<ColliderPair> {
        match self {
            SceneEvent::Collision(pair) | SceneEvent::Trigger(pair) => Some(*pair),
            SceneEvent::Custom { .. } => None,
        }
    }
}

/// Handle returned by `subscribe`/`listen`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u32);

/// Listener callback.
pub type Listener = Box<dyn FnMut(&SceneEvent)>;

enum Sink {
    Mailbox(Vec<SceneEvent>),
    Listener(Listener),
}

/// Scene-local event bus.
#[derive(Default)]
pub struct EventBus {
    next_id: u32,
    /// Subscription order per kind.
    routes: BTreeMap<EventKind, Vec<SubscriptionId>>,
    sinks: BTreeMap<SubscriptionId, (EventKind, Sink)>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, kind: EventKind, sink: Sink) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.routes.entry(kind.clone()).or_default().push(id);
        self.sinks.insert(id, (kind, sink));
        id
    }

    /// Open a mailbox for `kind`. Drain it with [`EventBus::drain`].
    pub fn subscribe(&mut self, kind: EventKind) -> SubscriptionId {
        self.register(kind, Sink::Mailbox(Vec::new()))
    }

    /// Invoke `listener` for every event of `kind`.
    pub fn listen<F>(&mut self, kind: EventKind, listener: F) -> SubscriptionId
    where
        F: FnMut(&SceneEvent) + 'static,
    {
        self.register(kind, Sink::Listener(Box::new(listener)))
    }

    /// Remove a subscription. Undrained mailbox events are discarded.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some((kind, _)) = self.sinks.remove(&id) else {
            return false;
        };
        if let Some(ids) = self.routes.get_mut(&kind) {
            ids.retain(|s| *s != id);
            if ids.is_empty() {
                self.routes.remove(&kind);
            }
        }
        true
    }

    /// Deliver to every subscriber of the event's kind. Returns recipient count.
    pub fn publish(&mut self, event: SceneEvent) -> usize {
        let kind = event.kind();
        let Some(ids) = self.routes.get(&kind) else {
            return 0;
        };

        let mut delivered = 0;
        for id in ids {
            if let Some((_, sink)) = self.sinks.get_mut(id) {
                match sink {
                    Sink::Mailbox(queue) => queue.push(event.clone()),
                    Sink::Listener(listener) => listener(&event),
                }
                delivered += 1;
            }
        }
        delivered
    }

    /// Take all queued events of a mailbox, oldest first.
    ///
    /// Listeners and unknown ids yield nothing.
    pub fn drain(&mut self, id: SubscriptionId) -> Vec<SceneEvent> {
        match self.sinks.get_mut(&id) {
            Some((_, Sink::Mailbox(queue))) => std::mem::take(queue),
            _ => Vec::new(),
        }
    }

    /// Events waiting in a mailbox.
    pub fn pending(&self, id: SubscriptionId) -> usize {
        match self.sinks.get(&id) {
            Some((_, Sink::Mailbox(queue))) => queue.len(),
            _ => 0,
        }
    }

    /// Number of subscribers for `kind`.
    pub fn subscriber_count(&self, kind: &EventKind) -> usize {
        self.routes.get(kind).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("routes", &self.routes)
            .finish()
    }
}
