//! # Event Bus
//!
//! Typed, synchronous publish/subscribe between systems.
//!
//! ```text
//! emit(CollisionEvent) ──> [handler 0] ──> [handler 1] ──> ... ──> returned event
//!                               │
//!                               └── may emit(OtherEvent), which runs to
//!                                   completion before handler 1 starts
//! ```
//!
//! - Handlers for one event kind run in subscription order.
//! - Every handler sees the same event value, so a mutation made by one is
//!   visible to the ones after it and to the emitter.
//! - Dispatch is re-entrant: a handler may emit, subscribe, or reset.
//!   Subscriptions made during a dispatch take effect from the next emit.
//!
//! The bus is single-threaded; share it with `Rc<EventBus>`.

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

/// Marker trait for event types.
pub trait Event: 'static {}

/// Type-erased subscriber.
trait EventHandler {
    fn invoke(&self, event: &mut dyn Any);

    /// False once the handler can never run again.
    fn is_live(&self) -> bool {
        true
    }
}

/// An owner object plus one of its methods.
///
/// The method takes `&O`, so the owner keeps its mutable state behind
/// `Cell`/`RefCell` and a nested emit can reach the same owner again.
struct MethodHandler<O, E> {
    owner: Weak<O>,
    method: fn(&O, &mut E),
}

impl<O: 'static, E: Event> EventHandler for MethodHandler<O, E> {
    fn invoke(&self, event: &mut dyn Any) {
        let Some(event) = event.downcast_mut::<E>() else {
            return;
        };
        if let Some(owner) = self.owner.upgrade() {
            (self.method)(&owner, event);
        }
    }

    fn is_live(&self) -> bool {
        self.owner.strong_count() > 0
    }
}

/// A free-standing closure.
struct FnHandler<E, F> {
    callback: F,
    _event: PhantomData<fn(&mut E)>,
}

impl<E: Event, F: Fn(&mut E) + 'static> EventHandler for FnHandler<E, F> {
    fn invoke(&self, event: &mut dyn Any) {
        if let Some(event) = event.downcast_mut::<E>() {
            (self.callback)(event);
        }
    }
}

type HandlerList = Vec<Rc<dyn EventHandler>>;

/// Typed event dispatcher.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use kestrel_ecs::{Event, EventBus};
///
/// struct Hit {
///     damage: u32,
/// }
/// impl Event for Hit {}
///
/// #[derive(Default)]
/// struct Scoreboard {
///     total: Cell<u32>,
/// }
///
/// impl Scoreboard {
///     fn on_hit(&self, hit: &mut Hit) {
///         self.total.set(self.total.get() + hit.damage);
///     }
/// }
///
/// let bus = EventBus::new();
/// let board = Rc::new(Scoreboard::default());
/// bus.subscribe(&board, Scoreboard::on_hit);
///
/// bus.emit(Hit { damage: 7 });
/// assert_eq!(board.total.get(), 7);
/// ```
#[derive(Default)]
pub struct EventBus {
    subscribers: RefCell<HashMap<TypeId, HandlerList>>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `owner.method` to events of type `E`.
    ///
    /// The bus holds the owner weakly: once every `Rc` to it is dropped its
    /// handler is discarded. Subscribing the same pair twice delivers twice.
    pub fn subscribe<O: 'static, E: Event>(&self, owner: &Rc<O>, method: fn(&O, &mut E)) {
        self.push_handler::<E>(Rc::new(MethodHandler {
            owner: Rc::downgrade(owner),
            method,
        }));
        tracing::debug!(owner = type_name::<O>(), event = type_name::<E>(), "subscribed");
    }

    /// Subscribes a closure to events of type `E`.
    pub fn subscribe_fn<E, F>(&self, callback: F)
    where
        E: Event,
        F: Fn(&mut E) + 'static,
    {
        self.push_handler::<E>(Rc::new(FnHandler {
            callback,
            _event: PhantomData,
        }));
        tracing::debug!(event = type_name::<E>(), "subscribed closure");
    }

    fn push_handler<E: Event>(&self, handler: Rc<dyn EventHandler>) {
        let mut subscribers = self.subscribers.borrow_mut();
        let handlers = subscribers.entry(TypeId::of::<E>()).or_default();
        handlers.retain(|h| h.is_live());
        handlers.push(handler);
    }

    /// Discards handlers of `E` whose owner is gone.
    fn prune<E: Event>(&self) {
        if let Some(handlers) = self.subscribers.borrow_mut().get_mut(&TypeId::of::<E>()) {
            handlers.retain(|h| h.is_live());
        }
    }

    /// Delivers `event` to every subscriber of `E`, in subscription order,
    /// and returns it with all handler mutations applied.
    ///
    /// Handlers whose owner has been dropped are discarded afterwards.
    pub fn emit<E: Event>(&self, mut event: E) -> E {
        // Snapshot so handlers can subscribe or emit without holding a borrow.
        let handlers = self
            .subscribers
            .borrow()
            .get(&TypeId::of::<E>())
            .cloned()
            .unwrap_or_default();

        let mut stale = false;
        for handler in &handlers {
            handler.invoke(&mut event);
            stale |= !handler.is_live();
        }
        if stale {
            self.prune::<E>();
        }
        event
    }

    /// Number of live subscribers for `E`.
    #[must_use]
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.subscribers
            .borrow()
            .get(&TypeId::of::<E>())
            .map_or(0, |handlers| handlers.iter().filter(|h| h.is_live()).count())
    }

    /// Drops every subscription.
    pub fn reset(&self) {
        self.subscribers.borrow_mut().clear();
    }
}
