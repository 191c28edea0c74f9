//! Signal/slot registry for gridstate.
//!
//! Components publish their change notifications through [`Signal`]s. A
//! signal owns its connected slots (callbacks); emitting invokes every slot
//! synchronously on the emitting thread, in connection order.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type used for all notifications
//! - [`ConnectionId`] - Identifier returned when connecting a slot
//!
//! # Emission Semantics
//!
//! - Emission iterates over a snapshot of the connections taken when `emit`
//!   starts. Slots may connect or disconnect other slots (or themselves)
//!   while the signal is being emitted; such changes take effect on the next
//!   emission.
//! - No lock is held while a slot runs, so a slot may freely call back into
//!   the component that emitted the signal.
//! - A slot that panics is isolated: the panic is caught, logged on the
//!   [`targets::SIGNAL`](crate::logging::targets::SIGNAL) target, and the
//!   remaining slots still run.
//!
//! # Example
//!
//! ```
//! use gridstate_core::Signal;
//!
//! // Create a signal that passes a string argument
//! let text_changed = Signal::<String>::new();
//!
//! // Connect a slot (closure)
//! let conn_id = text_changed.connect(|text| {
//!     println!("Text changed to: {}", text);
//! });
//!
//! // Emit the signal
//! text_changed.emit("Hello, World!".to_string());
//!
//! // Disconnect when done
//! text_changed.disconnect(conn_id);
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    /// The ID remains valid until the connection is explicitly disconnected or
    /// the signal is dropped.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A connected slot and its position in connection order. Slot map keys
/// are reused after a disconnect, so they cannot order the slots.
struct Connection<Args> {
    seq: u64,
    slot: Slot<Args>,
}

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple like `(String, i32)` for multiple arguments.
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    /// Sequence number handed to the next connection.
    next_seq: AtomicU64,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            next_seq: AtomicU64::new(0),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    ///
    /// # Example
    ///
    /// ```
    /// use gridstate_core::Signal;
    ///
    /// let signal = Signal::<String>::new();
    /// let id = signal.connect(|s| println!("Got: {}", s));
    /// signal.emit("Hello".to_string());
    /// assert!(signal.disconnect(id));
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.connections.lock().insert(Connection {
            seq,
            slot: Arc::new(slot),
        })
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing. This is useful during
    /// batch updates to prevent cascading notifications.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots.
    ///
    /// Returns the number of slots that completed without panicking.
    #[tracing::instrument(skip_all, target = "gridstate::signal", level = "trace")]
    pub fn emit(&self, args: Args) -> usize {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return 0;
        }

        // Snapshot the registry; the lock must not be held while slots run.
        let mut connections: Vec<(u64, Slot<Args>)> = self
            .connections
            .lock()
            .values()
            .map(|c| (c.seq, c.slot.clone()))
            .collect();
        connections.sort_unstable_by_key(|(seq, _)| *seq);
        let slots: Vec<Slot<Args>> = connections.into_iter().map(|(_, slot)| slot).collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        let mut completed = 0;
        for slot in slots {
            match panic::catch_unwind(AssertUnwindSafe(|| slot(&args))) {
                Ok(()) => completed += 1,
                Err(payload) => {
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| (*s).to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "non-string panic payload".to_string());
                    tracing::error!(target: targets::SIGNAL, %message, "slot panicked during emit");
                }
            }
        }
        completed
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
static_assertions::assert_impl_all!(Signal<(String, usize)>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicI32;

    #[test]
    fn test_signal_connect_emit() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(42);
        signal.emit(7);

        assert_eq!(*received.lock(), vec![42, 7]);
    }

    #[test]
    fn test_slots_run_in_connection_order() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let connect = |n: i32| {
            let order = order.clone();
            signal.connect(move |_| order.lock().push(n))
        };
        let first = connect(1);
        connect(2);
        signal.disconnect(first);
        // Reuses the slot freed by the first connection.
        connect(3);
        connect(4);

        signal.emit(());
        assert_eq!(*order.lock(), vec![2, 3, 4]);
    }

    #[test]
    fn test_signal_disconnect() {
        let signal = Signal::<i32>::new();
        let counter = Arc::new(AtomicI32::new(0));

        let counter_clone = counter.clone();
        let id = signal.connect(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        signal.emit(1);
        assert!(signal.disconnect(id));
        assert!(!signal.disconnect(id));
        signal.emit(1);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_signal_blocked() {
        let signal = Signal::<()>::new();
        let counter = Arc::new(AtomicI32::new(0));

        let counter_clone = counter.clone();
        signal.connect(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        signal.set_blocked(true);
        assert_eq!(signal.emit(()), 0);
        signal.set_blocked(false);
        assert_eq!(signal.emit(()), 1);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disconnect_all() {
        let signal = Signal::<i32>::new();
        signal.connect(|_| {});
        signal.connect(|_| {});
        assert_eq!(signal.connection_count(), 2);

        signal.disconnect_all();
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_slot_may_disconnect_during_emit() {
        let signal = Arc::new(Signal::<()>::new());
        let counter = Arc::new(AtomicI32::new(0));
        let victim = Arc::new(Mutex::new(None));

        let signal_clone = signal.clone();
        let victim_clone = victim.clone();
        signal.connect(move |_| {
            if let Some(id) = victim_clone.lock().take() {
                signal_clone.disconnect(id);
            }
        });

        let counter_clone = counter.clone();
        let id = signal.connect(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });
        *victim.lock() = Some(id);

        // The snapshot taken at emit time still includes the victim.
        signal.emit(());
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        signal.emit(());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(signal.connection_count(), 1);
    }

    #[test]
    fn test_slot_may_connect_during_emit() {
        let signal = Arc::new(Signal::<()>::new());
        let counter = Arc::new(AtomicI32::new(0));

        let signal_clone = signal.clone();
        let counter_clone = counter.clone();
        signal.connect(move |_| {
            let counter = counter_clone.clone();
            signal_clone.connect(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        });

        signal.emit(());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(signal.connection_count(), 2);
    }

    #[test]
    fn test_panicking_slot_is_isolated() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        signal.connect(|_| panic!("listener failure"));
        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        assert_eq!(signal.emit(5), 1);
        assert_eq!(*received.lock(), vec![5]);
    }

    #[test]
    fn test_signal_with_multiple_args() {
        let signal = Signal::<(String, i32)>::new();
        let received = Arc::new(Mutex::new(None));

        let received_clone = received.clone();
        signal.connect(move |args| {
            *received_clone.lock() = Some(args.clone());
        });

        signal.emit(("hello".to_string(), 42));

        let value = received.lock().clone();
        assert_eq!(value, Some(("hello".to_string(), 42)));
    }
}
