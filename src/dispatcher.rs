//! Routes decoded packets to pending one-shot waiters keyed by `(state,
//! id)` -- the same key the registry uses, standing in for "packet type"
//! without runtime reflection.
//!
//! All mutation happens on the event-loop task; there is no locking here
//! because there is no shared-memory concurrency within one client (§5).

use std::collections::HashMap;

use mc_protocol::registry::ClientboundPacket;
use mc_protocol::PacketState;
use tokio::sync::oneshot;

use crate::error::ClientError;

type WaiterKey = (PacketState, i32);

/// A one-shot completion handle: dropped without completing if the caller
/// stops polling it (e.g. the future was cancelled).
type Waiter = oneshot::Sender<Result<ClientboundPacket, ClientError>>;

#[derive(Default)]
pub struct Dispatcher {
    waiters: HashMap<WaiterKey, Vec<Waiter>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a one-shot waiter for `key`. Only packets dispatched
    /// *after* this call can complete it.
    pub fn register(&mut self, key: WaiterKey) -> oneshot::Receiver<Result<ClientboundPacket, ClientError>> {
        let (tx, rx) = oneshot::channel();
        self.waiters.entry(key).or_default().push(tx);
        rx
    }

    /// Removes the waiter for `key` registered by a timed-out `wait_for`
    /// call. Consumes `rx`: dropping the receiver marks its sender closed,
    /// and this then prunes closed senders from the table so a timed-out
    /// waiter cannot be completed by a packet that arrives afterward.
    pub fn cancel(&mut self, key: WaiterKey, rx: oneshot::Receiver<Result<ClientboundPacket, ClientError>>) {
        drop(rx);
        if let Some(list) = self.waiters.get_mut(&key) {
            list.retain(|tx| !tx.is_closed());
        }
    }

    /// Completes every waiter registered for `packet`'s `(state, id)` with
    /// a clone of it, in registration order, removing them atomically.
    /// Packets with no registered waiter are simply dropped here -- any
    /// mandatory side effect (e.g. `SetCompression`) must already have run
    /// before this is called.
    pub fn dispatch(&mut self, packet: ClientboundPacket) {
        let key = packet.key();
        let Some(waiters) = self.waiters.remove(&key) else {
            return;
        };
        for tx in waiters {
            // Ignore send failures: the receiver was dropped (the `wait_for`
            // future was cancelled), which is not this component's concern.
            let _ = tx.send(Ok(packet.clone()));
        }
    }

    /// Fails every pending waiter, across every key, with `Disconnected`.
    /// Called when the transport closes.
    pub fn fail_all(&mut self) {
        for (_, waiters) in self.waiters.drain() {
            for tx in waiters {
                let _ = tx.send(Err(ClientError::Disconnected));
            }
        }
    }
}
