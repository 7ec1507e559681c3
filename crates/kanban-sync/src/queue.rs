//! Per-key exclusivity queue.
//!
//! Each key keeps the completion signal of the last ticket that claimed
//! it. A new ticket swaps in its own signal and waits on the previous
//! ones, so tickets on a key run in the order they were issued. All keys
//! of a ticket are claimed under one lock, which keeps the wait graph
//! acyclic.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use kanban_core::CacheKey;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

struct Tail {
    ticket: u64,
    done: oneshot::Receiver<()>,
}

#[derive(Clone, Default)]
pub(crate) struct KeyQueue {
    tails: Arc<Mutex<HashMap<CacheKey, Tail>>>,
    next_ticket: Arc<AtomicU64>,
}

impl KeyQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Claims `keys` behind whoever holds them now.
    pub(crate) fn enqueue(&self, keys: &[CacheKey]) -> Ticket {
        let keys = normalized(keys);
        let mut tails = self.tails.lock();
        self.claim_locked(&mut tails, keys)
    }

    /// Claims `keys` only if nobody holds any of them.
    ///
    /// Returns the first busy key otherwise.
    pub(crate) fn try_claim(&self, keys: &[CacheKey]) -> Result<Ticket, CacheKey> {
        let keys = normalized(keys);
        let mut tails = self.tails.lock();

        for key in &keys {
            if tails.get_mut(key).is_some_and(Tail::is_live) {
                return Err(key.clone());
            }
        }

        Ok(self.claim_locked(&mut tails, keys))
    }

    /// True if some unreleased ticket holds `key`.
    pub(crate) fn is_held(&self, key: &CacheKey) -> bool {
        self.tails.lock().get_mut(key).is_some_and(Tail::is_live)
    }

    fn claim_locked(&self, tails: &mut HashMap<CacheKey, Tail>, keys: Vec<CacheKey>) -> Ticket {
        let id = self.next_ticket.fetch_add(1, Ordering::Relaxed);

        let mut waits = Vec::new();
        let mut releases = Vec::with_capacity(keys.len());
        for key in &keys {
            let (tx, rx) = oneshot::channel();
            if let Some(previous) = tails.insert(key.clone(), Tail { ticket: id, done: rx }) {
                waits.push(previous.done);
            }
            releases.push(tx);
        }

        Ticket {
            id,
            keys,
            waits,
            releases,
            queue: self.clone(),
        }
    }
}

impl Tail {
    fn is_live(&mut self) -> bool {
        matches!(self.done.try_recv(), Err(TryRecvError::Empty))
    }
}

fn normalized(keys: &[CacheKey]) -> Vec<CacheKey> {
    let mut keys = keys.to_vec();
    keys.sort();
    keys.dedup();
    keys
}

/// Exclusive claim on a set of keys, released on drop.
pub(crate) struct Ticket {
    id: u64,
    keys: Vec<CacheKey>,
    waits: Vec<oneshot::Receiver<()>>,
    releases: Vec<oneshot::Sender<()>>,
    queue: KeyQueue,
}

impl Ticket {
    /// Waits until every earlier ticket on these keys was released.
    pub(crate) async fn ready(&mut self) {
        while let Some(wait) = self.waits.last_mut() {
            // Tickets never send; Err means the holder released its claim.
            let _ = wait.await;
            self.waits.pop();
        }
    }

    pub(crate) fn keys(&self) -> &[CacheKey] {
        &self.keys
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        self.releases.clear();

        let mut tails = self.queue.tails.lock();
        for key in &self.keys {
            if tails.get(key).is_some_and(|tail| tail.ticket == self.id) {
                tails.remove(key);
            }
        }
    }
}
