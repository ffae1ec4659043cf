// events/bus/event_bus.rs
//
// Synchronous in-process event bus.
//
// DESIGN PRINCIPLES:
// 1. Synchronous - handlers run before emit() returns, in subscription order
// 2. Observable - recent emissions are kept in a bounded log
// 3. Type-safe - events are strongly typed
//
// Engines rely on (1): a favorite toggle is visible in every engine's state
// by the time the toggling call returns.

use std::any::{Any, TypeId};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, error};

use crate::events::types::DomainEvent;

/// Emissions kept in the log before the oldest are dropped
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 256;

/// Type-erased event handler function
type EventHandler = Box<dyn Fn(&dyn Any) + Send + Sync>;

/// The Event Bus
///
/// Lets services publish facts (a favorite was toggled, a session was
/// established) without the engines that react to them depending on each
/// other.
///
/// Handlers are never removed and live as long as the bus. Engines subscribe
/// through a `Weak` to their own state, so a dropped engine leaves behind a
/// handler that does nothing.
pub struct EventBus {
    /// Map from event TypeId to list of handlers
    handlers: Arc<RwLock<HashMap<TypeId, Vec<EventHandler>>>>,

    /// Most recent emissions, oldest first (for debugging)
    event_log: Arc<RwLock<VecDeque<EventLogEntry>>>,

    log_capacity: usize,
}

/// A logged event for debugging and tracing
#[derive(Debug, Clone)]
pub struct EventLogEntry {
    pub event_type: String,
    pub event_id: String,
    pub occurred_at: String,
    pub handler_count: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_log_capacity(DEFAULT_EVENT_LOG_CAPACITY)
    }

    /// Bus whose log keeps at most `capacity` entries. Zero disables it.
    pub fn with_log_capacity(capacity: usize) -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
            event_log: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            log_capacity: capacity,
        }
    }

    /// Subscribe to a specific event type
    ///
    /// Handlers are executed in the order they are subscribed and stay
    /// registered for the lifetime of the bus. Capture a `Weak` when the
    /// handler refers to something that may be dropped first.
    ///
    /// Example:
    /// ```ignore
    /// bus.subscribe::<FavoriteToggled, _>(|event| {
    ///     println!("{} is now favorite: {}", event.item_id, event.is_favorite);
    /// });
    /// ```
    pub fn subscribe<E, F>(&self, handler: F)
    where
        E: DomainEvent + 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<E>();

        let wrapped: EventHandler = Box::new(move |event_any: &dyn Any| {
            if let Some(event) = event_any.downcast_ref::<E>() {
                handler(event);
            } else {
                error!(
                    "Failed to downcast event in handler for {}",
                    std::any::type_name::<E>()
                );
            }
        });

        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        handlers.entry(type_id).or_default().push(wrapped);
    }

    /// Emit an event
    ///
    /// Logs the event, then runs every handler for its type. A panicking
    /// handler is logged and does not stop the remaining handlers.
    pub fn emit<E>(&self, event: E)
    where
        E: DomainEvent + 'static,
    {
        let type_id = TypeId::of::<E>();

        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        let event_handlers = handlers.get(&type_id);
        let handler_count = event_handlers.map(|h| h.len()).unwrap_or(0);

        let log_entry = EventLogEntry {
            event_type: event.event_type().to_string(),
            event_id: event.event_id().to_string(),
            occurred_at: event.occurred_at().to_rfc3339(),
            handler_count,
        };

        debug!(
            "[EVENT] {} (id: {}) | {} handlers",
            log_entry.event_type, log_entry.event_id, log_entry.handler_count
        );

        if self.log_capacity > 0 {
            let mut event_log = self.event_log.write().unwrap_or_else(PoisonError::into_inner);
            if event_log.len() == self.log_capacity {
                event_log.pop_front();
            }
            event_log.push_back(log_entry);
        }

        if let Some(handlers) = event_handlers {
            for (idx, handler) in handlers.iter().enumerate() {
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    handler(&event as &dyn Any);
                }));

                if let Err(e) = result {
                    error!(
                        "Handler {} for {} panicked: {:?}",
                        idx,
                        event.event_type(),
                        e
                    );
                }
            }
        }
    }

    /// Get the event log, oldest first (for debugging)
    pub fn get_event_log(&self) -> Vec<EventLogEntry> {
        self.event_log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn clear_event_log(&self) {
        self.event_log
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Get the number of subscribers for a specific event type
    pub fn subscriber_count<E>(&self) -> usize
    where
        E: 'static,
    {
        let type_id = TypeId::of::<E>();
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        handlers.get(&type_id).map(|h| h.len()).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// Clones share handlers and log
impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            handlers: Arc::clone(&self.handlers),
            event_log: Arc::clone(&self.event_log),
            log_capacity: self.log_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_subscribe_and_emit() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        bus.subscribe::<FavoriteToggled, _>(move |event| {
            assert_eq!(event.item_id, 550);
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(FavoriteToggled::new(550, true));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_multiple_handlers_execute_in_order() {
        let bus = EventBus::new();
        let sequence = Arc::new(RwLock::new(Vec::new()));

        for n in 1..=3 {
            let seq = Arc::clone(&sequence);
            bus.subscribe::<FavoriteToggled, _>(move |_| {
                seq.write().unwrap().push(n);
            });
        }

        bus.emit(FavoriteToggled::new(1, false));

        assert_eq!(*sequence.read().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_event_log_records_emissions() {
        let bus = EventBus::new();

        bus.emit(FavoriteToggled::new(1, true));
        bus.emit(SessionEstablished::new());
        bus.emit(ListCreated::new(8, "Weekend".to_string()));

        let log = bus.get_event_log();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0].event_type, "FavoriteToggled");
        assert_eq!(log[1].event_type, "SessionEstablished");
        assert_eq!(log[2].event_type, "ListCreated");

        bus.clear_event_log();
        assert!(bus.get_event_log().is_empty());
    }

    #[test]
    fn test_event_log_keeps_most_recent_entries() {
        let bus = EventBus::with_log_capacity(4);

        for id in 0..10 {
            bus.emit(FavoriteToggled::new(id, true));
        }

        let log = bus.get_event_log();
        assert_eq!(log.len(), 4);

        bus.emit(SessionEstablished::new());
        let log = bus.get_event_log();
        assert_eq!(log.len(), 4);
        assert_eq!(log[3].event_type, "SessionEstablished");
        assert!(log[..3].iter().all(|entry| entry.event_type == "FavoriteToggled"));
    }

    #[test]
    fn test_zero_capacity_disables_log() {
        let bus = EventBus::with_log_capacity(0);
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        bus.subscribe::<FavoriteToggled, _>(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(FavoriteToggled::new(1, true));

        assert!(bus.get_event_log().is_empty());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscriber_count() {
        let bus = EventBus::new();

        assert_eq!(bus.subscriber_count::<FavoriteToggled>(), 0);

        bus.subscribe::<FavoriteToggled, _>(|_| {});
        bus.subscribe::<FavoriteToggled, _>(|_| {});
        assert_eq!(bus.subscriber_count::<FavoriteToggled>(), 2);

        assert_eq!(bus.subscriber_count::<SessionEstablished>(), 0);
    }

    #[test]
    fn test_handler_panic_doesnt_break_bus() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        bus.subscribe::<FavoriteToggled, _>(|_| {
            panic!("Intentional panic");
        });

        let counter_clone = Arc::clone(&counter);
        bus.subscribe::<FavoriteToggled, _>(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(FavoriteToggled::new(3, true));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
