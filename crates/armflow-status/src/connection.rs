use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::error::StatusError;

/// Callback invoked with every inbound line.
pub type FrameHandler = Arc<dyn Fn(&str) + Send + Sync>;

// ─── DeviceConnection ─────────────────────────────────────────────────────

/// The two things the status decoder needs from a device link: a way to
/// send a command without waiting for a reply, and a feed of inbound lines.
pub trait DeviceConnection {
    fn send(&self, command: &str) -> Result<(), StatusError>;

    /// Register `handler` for inbound lines until the returned guard drops.
    fn subscribe(&self, handler: FrameHandler) -> Subscription;
}

impl<T: DeviceConnection + ?Sized> DeviceConnection for &T {
    fn send(&self, command: &str) -> Result<(), StatusError> {
        (**self).send(command)
    }

    fn subscribe(&self, handler: FrameHandler) -> Subscription {
        (**self).subscribe(handler)
    }
}

impl<T: DeviceConnection + ?Sized> DeviceConnection for Arc<T> {
    fn send(&self, command: &str) -> Result<(), StatusError> {
        (**self).send(command)
    }

    fn subscribe(&self, handler: FrameHandler) -> Subscription {
        (**self).subscribe(handler)
    }
}

// ─── FrameBus ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct BusInner {
    next_id: u64,
    handlers: Vec<(u64, FrameHandler)>,
    closed: bool,
}

/// Fan-out of inbound lines to registered handlers.
///
/// Each connection owns its own bus; nothing is shared between connections.
/// Handlers run outside the lock, so a handler may drop its own
/// subscription. Once [`close`](Self::close)d, the bus drops every handler
/// and ignores new ones.
#[derive(Clone, Default)]
pub struct FrameBus {
    inner: Arc<Mutex<BusInner>>,
}

impl FrameBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: FrameHandler) -> Subscription {
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;
        if !inner.closed {
            inner.handlers.push((id, handler));
        }
        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `line` to every live handler; returns how many ran.
    pub fn dispatch(&self, line: &str) -> usize {
        let handlers: Vec<FrameHandler> = lock(&self.inner)
            .handlers
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in &handlers {
            handler(line);
        }
        handlers.len()
    }

    pub fn handler_count(&self) -> usize {
        lock(&self.inner).handlers.len()
    }

    /// Drop every handler; called when the inbound side reaches EOF.
    pub fn close(&self) {
        let handlers = {
            let mut inner = lock(&self.inner);
            inner.closed = true;
            std::mem::take(&mut inner.handlers)
        };
        drop(handlers);
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.inner).closed
    }
}

impl std::fmt::Debug for FrameBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBus")
            .field("handlers", &self.handler_count())
            .finish()
    }
}

fn lock(inner: &Mutex<BusInner>) -> MutexGuard<'_, BusInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ─── Subscription ─────────────────────────────────────────────────────────

/// Keeps a handler registered. Dropping it (or calling
/// [`release`](Self::release)) unregisters the handler; after that the
/// handler is never called again.
#[must_use = "dropping a Subscription unregisters its handler immediately"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    bus: Weak<Mutex<BusInner>>,
}

impl Subscription {
    pub fn release(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            lock(&inner).handlers.retain(|(id, _)| *id != self.id);
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn collector() -> (FrameHandler, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: FrameHandler = Arc::new(move |line: &str| {
            sink.lock().unwrap().push(line.to_string());
        });
        (handler, seen)
    }

    #[test]
    fn dispatch_reaches_every_subscriber() {
        let bus = FrameBus::new();
        let (h1, seen1) = collector();
        let (h2, seen2) = collector();
        let _s1 = bus.subscribe(h1);
        let _s2 = bus.subscribe(h2);

        assert_eq!(bus.dispatch("$TMSTA,1"), 2);
        assert_eq!(*seen1.lock().unwrap(), vec!["$TMSTA,1"]);
        assert_eq!(*seen2.lock().unwrap(), vec!["$TMSTA,1"]);
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let bus = FrameBus::new();
        let (h, seen) = collector();
        let sub = bus.subscribe(h);
        bus.dispatch("one");
        drop(sub);
        assert_eq!(bus.handler_count(), 0);
        assert_eq!(bus.dispatch("two"), 0);
        assert_eq!(*seen.lock().unwrap(), vec!["one"]);
    }

    #[test]
    fn handler_can_drop_its_own_subscription() {
        let bus = FrameBus::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let calls = Arc::new(Mutex::new(0));

        let handler: FrameHandler = {
            let slot = Arc::clone(&slot);
            let calls = Arc::clone(&calls);
            Arc::new(move |_: &str| {
                *calls.lock().unwrap() += 1;
                let own = slot.lock().unwrap().take();
                drop(own);
            })
        };
        *slot.lock().unwrap() = Some(bus.subscribe(handler));

        assert_eq!(bus.dispatch("first"), 1);
        assert_eq!(bus.handler_count(), 0);
        assert_eq!(bus.dispatch("second"), 0);
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn release_only_removes_its_own_handler() {
        let bus = FrameBus::new();
        let (h1, _) = collector();
        let (h2, seen2) = collector();
        let s1 = bus.subscribe(h1);
        let _s2 = bus.subscribe(h2);
        s1.release();
        assert_eq!(bus.handler_count(), 1);
        bus.dispatch("x");
        assert_eq!(seen2.lock().unwrap().len(), 1);
    }

    #[test]
    fn closed_bus_drops_handlers_and_refuses_new_ones() {
        let bus = FrameBus::new();
        let (h1, _) = collector();
        let _s1 = bus.subscribe(h1);
        bus.close();
        assert!(bus.is_closed());
        assert_eq!(bus.handler_count(), 0);

        let (h2, seen) = collector();
        let _s2 = bus.subscribe(h2);
        assert_eq!(bus.dispatch("late"), 0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn subscription_outliving_bus_drops_cleanly() {
        let bus = FrameBus::new();
        let (h, _) = collector();
        let sub = bus.subscribe(h);
        drop(bus);
        drop(sub);
    }
}
