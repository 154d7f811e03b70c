//! The navigation store: one authoritative parameter snapshot per page.
//!
//! The store owns the host port, parses the current location into a
//! [`FragmentParams`] snapshot, and replaces that snapshot wholesale on
//! every navigation. Listeners are told about each new snapshot
//! synchronously, whether the change came from [`NavigationStore::navigate`]
//! or from the host's back/forward traversal.
//!
//! # Notification rules
//!
//! - Listeners run in registration order against the snapshot that
//!   triggered the round.
//! - A listener removed during a round is not invoked later in it.
//! - A listener registered during a round first hears the next change.
//! - When a listener navigates, the new snapshot is queued: the current
//!   round finishes first, then the queued snapshot is delivered. Every
//!   listener sees every change exactly once, oldest first, and the last
//!   snapshot it sees is the current one.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};
use url::Url;

use crate::anchor::{AnchorSpec, AnchorTracker, is_anchored};
use crate::error::NavError;
use crate::filter::{ClickTarget, Modifiers};
use crate::host::HistoryPort;
use crate::params::{self, FragmentParams};

type Listener = Rc<dyn Fn(&Rc<FragmentParams>)>;

struct ListenerSlot {
    id: u64,
    active: Rc<Cell<bool>>,
    listener: Listener,
}

struct StoreInner {
    history: RefCell<Box<dyn HistoryPort>>,
    params: RefCell<Rc<FragmentParams>>,
    listeners: RefCell<Vec<ListenerSlot>>,
    next_id: Cell<u64>,
    pending: RefCell<VecDeque<Rc<FragmentParams>>>,
    dispatching: Cell<bool>,
}

impl StoreInner {
    fn remove(&self, id: u64) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(pos) = listeners.iter().position(|slot| slot.id == id) {
            let slot = listeners.remove(pos);
            slot.active.set(false);
            trace!(id, remaining = listeners.len(), "listener removed");
        }
    }
}

/// Clears the dispatching flag even if a listener panics.
struct DispatchGuard<'a>(&'a Cell<bool>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Process-wide holder of the current fragment parameters.
///
/// Cloning yields another handle to the same store. Listeners that need to
/// navigate should capture a [`WeakNavigationStore`] to avoid a cycle.
#[derive(Clone)]
pub struct NavigationStore {
    inner: Rc<StoreInner>,
}

/// Non-owning handle to a [`NavigationStore`].
#[derive(Clone)]
pub struct WeakNavigationStore {
    inner: Weak<StoreInner>,
}

impl WeakNavigationStore {
    #[must_use]
    pub fn upgrade(&self) -> Option<NavigationStore> {
        self.inner.upgrade().map(|inner| NavigationStore { inner })
    }
}

/// Registration handle returned by [`NavigationStore::subscribe`].
///
/// Dropping it unsubscribes the listener.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    store: Weak<StoreInner>,
    id: u64,
}

impl Subscription {
    /// Remove the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.remove(self.id);
        }
    }
}

// `Url::fragment` has already dropped the `#` marker.
fn parse_location(location: &Url) -> FragmentParams {
    params::parse_body(location.fragment().unwrap_or_default())
}

impl NavigationStore {
    /// Create the store, parsing the host's current location.
    pub fn new(history: impl HistoryPort + 'static) -> Self {
        let initial = parse_location(&history.location());
        debug!(params = %initial, "navigation store initialized");
        Self {
            inner: Rc::new(StoreInner {
                history: RefCell::new(Box::new(history)),
                params: RefCell::new(Rc::new(initial)),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                pending: RefCell::new(VecDeque::new()),
                dispatching: Cell::new(false),
            }),
        }
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakNavigationStore {
        WeakNavigationStore {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// The current snapshot. Shared and immutable.
    #[must_use]
    pub fn params(&self) -> Rc<FragmentParams> {
        Rc::clone(&*self.inner.params.borrow())
    }

    /// The host's current location.
    #[must_use]
    pub fn location(&self) -> Url {
        self.inner.history.borrow().location()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Register `listener` for every future snapshot.
    pub fn subscribe(&self, listener: impl Fn(&Rc<FragmentParams>) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.listeners.borrow_mut().push(ListenerSlot {
            id,
            active: Rc::new(Cell::new(true)),
            listener: Rc::new(listener),
        });
        trace!(id, "listener added");
        Subscription {
            store: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Push `target` onto the host history and publish the new snapshot.
    ///
    /// The target is handed to the host as-is.
    ///
    /// # Errors
    ///
    /// Returns the host's error if it refuses the target; the snapshot and
    /// listeners are untouched in that case.
    pub fn navigate(&self, target: impl AsRef<str>) -> Result<(), NavError> {
        let target = target.as_ref();
        debug!(to = target, "navigate");
        self.inner.history.borrow_mut().push_location(target)?;
        self.on_location_change();
        Ok(())
    }

    /// Navigate to the destination a click with `modifiers` selects.
    ///
    /// # Errors
    ///
    /// See [`NavigationStore::navigate`].
    pub fn navigate_click(&self, target: &ClickTarget, modifiers: Modifiers) -> Result<(), NavError> {
        self.navigate(target.resolve(modifiers))
    }

    /// Step back through the host history. Returns `false` at the start.
    pub fn back(&self) -> bool {
        self.traverse(-1)
    }

    /// Step forward through the host history. Returns `false` at the end.
    pub fn forward(&self) -> bool {
        self.traverse(1)
    }

    fn traverse(&self, delta: isize) -> bool {
        let moved = self.inner.history.borrow_mut().go(delta);
        if moved {
            self.on_location_change();
        }
        moved
    }

    /// Re-read the host location and notify listeners.
    ///
    /// Hosts call this when the user moves through history; `navigate`
    /// calls it after every push. Called from inside a listener, the new
    /// snapshot is delivered once the running round has finished.
    pub fn on_location_change(&self) {
        let next = Rc::new(parse_location(&self.location()));
        *self.inner.params.borrow_mut() = Rc::clone(&next);
        debug!(params = %next, "location changed");
        self.inner.pending.borrow_mut().push_back(next);

        if self.inner.dispatching.replace(true) {
            trace!("round in progress, snapshot queued");
            return;
        }
        let _guard = DispatchGuard(&self.inner.dispatching);
        loop {
            // Release the queue before dispatch; listeners may push to it.
            let Some(snapshot) = self.inner.pending.borrow_mut().pop_front() else {
                break;
            };
            self.notify(&snapshot);
        }
    }

    fn notify(&self, snapshot: &Rc<FragmentParams>) {
        let round: Vec<(Rc<Cell<bool>>, Listener)> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|slot| (Rc::clone(&slot.active), Rc::clone(&slot.listener)))
            .collect();
        trace!(listeners = round.len(), params = %snapshot, "notifying");

        for (active, listener) in round {
            if active.get() {
                listener(snapshot);
            }
        }
    }

    /// Whether `predicate` holds for the current snapshot.
    pub fn route(&self, predicate: impl FnOnce(&FragmentParams) -> bool) -> bool {
        predicate(&self.params())
    }

    /// Whether the current snapshot anchors `spec`.
    #[must_use]
    pub fn is_anchored(&self, spec: &AnchorSpec) -> bool {
        is_anchored(&self.params(), spec)
    }

    /// Register an anchor; `on_reveal` runs on each transition into the
    /// anchored state.
    ///
    /// The current snapshot is evaluated immediately, so a view mounted
    /// while its anchor is already in the fragment reveals once.
    pub fn register_anchor(
        &self,
        spec: impl Into<AnchorSpec>,
        on_reveal: impl Fn() + 'static,
    ) -> Subscription {
        let tracker = Rc::new(RefCell::new(AnchorTracker::new(spec.into())));
        let on_reveal: Rc<dyn Fn()> = Rc::new(on_reveal);

        let subscription = {
            let tracker = Rc::clone(&tracker);
            let on_reveal = Rc::clone(&on_reveal);
            self.subscribe(move |params| {
                let fire = tracker.borrow_mut().update(params);
                if fire {
                    on_reveal();
                }
            })
        };

        let fire = tracker.borrow_mut().update(&self.params());
        if fire {
            on_reveal();
        }
        subscription
    }
}
