//! # Event Bus
//!
//! Cross-module signals. A module connects a handler to a signal, either
//! for one named sender or for any sender; whoever sends names itself.
//!
//! ```text
//!   toolbar "quit" ──send("base", Exit)──┐
//!                                        ▼
//!                         ┌─────────────────────────────┐
//!                         │ EventBus                    │
//!                         │  exit          / Any ──► h1 │
//!                         │  printing-handle / Any ─► h2 │
//!                         │  exit    / "sales" ──► h3   │  (not called)
//!                         └─────────────────────────────┘
//! ```
//!
//! Handlers run synchronously on the sending thread, in connection order.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use coinbox_core::printing::PrintJob;
use tracing::debug;

/// Signal names, as used by modules and toolbar actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Exit,
    PrintingRegisterFunction,
    PrintingHandle,
}

impl Signal {
    pub const ALL: [Signal; 3] = [
        Signal::Exit,
        Signal::PrintingRegisterFunction,
        Signal::PrintingHandle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Signal::Exit => "exit",
            Signal::PrintingRegisterFunction => "printing-register-function",
            Signal::PrintingHandle => "printing-handle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Signal::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A signal with its arguments.
#[derive(Debug, Clone)]
pub enum Event {
    Exit,
    PrintingRegisterFunction {
        function: String,
    },
    PrintingHandle {
        job: Arc<dyn PrintJob>,
        function: Option<String>,
    },
}

impl Event {
    pub fn signal(&self) -> Signal {
        match self {
            Event::Exit => Signal::Exit,
            Event::PrintingRegisterFunction { .. } => Signal::PrintingRegisterFunction,
            Event::PrintingHandle { .. } => Signal::PrintingHandle,
        }
    }

    /// The argument-less event for a signal, if it has one.
    pub fn bare(signal: Signal) -> Option<Self> {
        match signal {
            Signal::Exit => Some(Event::Exit),
            _ => None,
        }
    }
}

/// Which senders a subscription listens to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SenderFilter {
    Any,
    Named(String),
}

impl SenderFilter {
    pub fn named(name: impl Into<String>) -> Self {
        SenderFilter::Named(name.into())
    }

    fn matches(&self, sender: &str) -> bool {
        match self {
            SenderFilter::Any => true,
            SenderFilter::Named(name) => name == sender,
        }
    }
}

/// Handle for disconnecting a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type Handler = Arc<dyn Fn(&str, &Event) + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    signal: Signal,
    sender: SenderFilter,
    handler: Handler,
}

/// Signal dispatcher shared by all modules.
#[derive(Clone, Default)]
pub struct EventBus {
    subscriptions: Arc<RwLock<Vec<Subscription>>>,
    next_id: Arc<AtomicU64>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriber_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        EventBus::default()
    }

    /// Connects `handler` to `signal` from `sender`.
    ///
    /// The handler receives the sender name and the event.
    pub fn connect<F>(&self, signal: Signal, sender: SenderFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &Event) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.subscriptions
            .write()
            .expect("Event bus lock poisoned")
            .push(Subscription {
                id,
                signal,
                sender,
                handler: Arc::new(handler),
            });
        debug!(%signal, subscription = %id, "Connected");
        id
    }

    /// Removes a subscription. Returns whether it existed.
    pub fn disconnect(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write().expect("Event bus lock poisoned");
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        before != subscriptions.len()
    }

    /// Delivers `event` to every matching handler.
    ///
    /// Handlers may send or connect in turn: the list is copied before
    /// dispatch.
    ///
    /// ## Returns
    /// The number of handlers called.
    pub fn send(&self, sender: &str, event: Event) -> usize {
        let signal = event.signal();
        let handlers: Vec<Handler> = self
            .subscriptions
            .read()
            .expect("Event bus lock poisoned")
            .iter()
            .filter(|s| s.signal == signal && s.sender.matches(sender))
            .map(|s| Arc::clone(&s.handler))
            .collect();

        debug!(%signal, sender, receivers = handlers.len(), "Sending");
        for handler in &handlers {
            handler(sender, &event);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions
            .read()
            .expect("Event bus lock poisoned")
            .len()
    }
}
