use crate::error::Result;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// An unpersisted signal delivered synchronously to the listeners attached
/// at publish time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainEvent {
    pub name: String,
    pub payload: Value,
}

/// A typed domain event with a fixed name.
pub trait BusEvent: Serialize + DeserializeOwned {
    const NAME: &'static str;
}

type Handler = Box<dyn Fn(&DomainEvent) + Send + Sync>;

struct Slot {
    id: u64,
    name: String,
    handler: Handler,
    active: AtomicBool,
    /// Held for the duration of each invocation; `unsubscribe` takes it to
    /// wait out an invocation running on another thread.
    gate: Mutex<()>,
}

thread_local! {
    /// Slots whose handler is currently running on this thread.
    static DISPATCHING: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

fn dispatching(id: u64) -> bool {
    DISPATCHING.with(|stack| stack.borrow().contains(&id))
}

/// Pops the dispatch marker even if the handler panics.
struct DispatchMarker;

impl DispatchMarker {
    fn push(id: u64) -> Self {
        DISPATCHING.with(|stack| stack.borrow_mut().push(id));
        DispatchMarker
    }
}

impl Drop for DispatchMarker {
    fn drop(&mut self) {
        DISPATCHING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

#[derive(Default)]
struct BusInner {
    slots: RwLock<Vec<Arc<Slot>>>,
    next_id: AtomicU64,
}

impl BusInner {
    fn detach(&self, slot: &Arc<Slot>) {
        slot.active.store(false, Ordering::SeqCst);
        self.slots
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|other| other.id != slot.id);

        // A handler unsubscribing itself is already inside its own
        // invocation; anyone else waits for an in-flight call to finish.
        if !dispatching(slot.id) {
            drop(slot.gate.lock().unwrap_or_else(|e| e.into_inner()));
        }
    }
}

/// Process-wide, synchronous, fire-and-forget publish/subscribe.
///
/// - Delivery happens on the publishing thread, in subscription order.
/// - Nothing is queued or replayed: a listener attached after `publish`
///   returns never sees that occurrence.
/// - Once [`Subscription::unsubscribe`] returns, the handler will not run
///   again, and any invocation that was running on another thread has
///   completed.
///
/// A handler runs while its subscription's gate is held. A handler may
/// publish on its own thread, including to itself, but two handlers running
/// on different threads must not publish into each other's event names: each
/// would wait on the other's gate and neither would return.
///
/// Cloning yields another handle to the same bus.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

static GLOBAL_BUS: Lazy<EventBus> = Lazy::new(EventBus::new);

impl EventBus {
    /// Creates an isolated bus. Most callers want [`EventBus::global`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide bus. Created on first use and never torn down.
    pub fn global() -> &'static EventBus {
        &GLOBAL_BUS
    }

    /// Delivers `payload` to every listener currently registered for `name`
    /// and returns how many handlers ran.
    pub fn publish(&self, name: &str, payload: Value) -> usize {
        let event = DomainEvent {
            name: name.to_string(),
            payload,
        };

        let targets: Vec<Arc<Slot>> = self
            .inner
            .slots
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|slot| slot.name == name)
            .cloned()
            .collect();

        let mut delivered = 0;
        for slot in targets {
            // Re-entrant publish from inside this slot's own handler must not
            // wait on its own gate.
            let _gate = if dispatching(slot.id) {
                None
            } else {
                Some(slot.gate.lock().unwrap_or_else(|e| e.into_inner()))
            };
            if !slot.active.load(Ordering::SeqCst) {
                continue;
            }
            let _marker = DispatchMarker::push(slot.id);
            (slot.handler)(&event);
            delivered += 1;
        }

        tracing::debug!("[EventBus] '{}' delivered to {} listener(s)", name, delivered);
        delivered
    }

    /// Registers `handler` for events named `name`.
    pub fn subscribe<F>(&self, name: &str, handler: F) -> Subscription
    where
        F: Fn(&DomainEvent) + Send + Sync + 'static,
    {
        let slot = Arc::new(Slot {
            id: self.inner.next_id.fetch_add(1, Ordering::SeqCst),
            name: name.to_string(),
            handler: Box::new(handler),
            active: AtomicBool::new(true),
            gate: Mutex::new(()),
        });
        self.inner
            .slots
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(slot.clone());

        Subscription {
            bus: self.inner.clone(),
            slot: Some(slot),
        }
    }

    /// Publishes a typed event under its fixed name.
    pub fn publish_event<E: BusEvent>(&self, event: &E) -> Result<usize> {
        let payload = serde_json::to_value(event)?;
        Ok(self.publish(E::NAME, payload))
    }

    /// Subscribes to a typed event. Payloads that do not decode as `E` are
    /// logged and skipped.
    pub fn subscribe_event<E, F>(&self, handler: F) -> Subscription
    where
        E: BusEvent,
        F: Fn(E) + Send + Sync + 'static,
    {
        self.subscribe(E::NAME, move |event| {
            match serde_json::from_value::<E>(event.payload.clone()) {
                Ok(typed) => handler(typed),
                Err(e) => tracing::warn!(
                    "[EventBus] Dropping malformed '{}' payload: {}",
                    event.name,
                    e
                ),
            }
        })
    }

    /// Number of live listeners for `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.inner
            .slots
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|slot| slot.name == name)
            .count()
    }
}

/// Capability to deregister a handler. Dropping it also unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    bus: Arc<BusInner>,
    slot: Option<Arc<Slot>>,
}

impl Subscription {
    /// Deregisters the handler. See [`EventBus`] for the guarantee that
    /// holds once this returns.
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(slot) = self.slot.take() {
            self.bus.detach(&slot);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}
