use arc_swap::ArcSwap;
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering},
        Arc, Weak,
    },
};

use crate::{
    utils::{deliver, tracing::trace},
    Receipt, Receptor,
};

/// The set of receptors attached to one source.
///
/// This is the attach/detach primitive every shared source is built on. Delivery iterates over a
/// snapshot of the entries taken when the pulse arrives, so receptors attached while a pulse is
/// being delivered only see later pulses. Each entry carries its own liveness flag which is
/// checked right before its receptor is invoked, so a receptor cancelled mid-delivery (by itself
/// or by a sibling) is never called again, not even for the pulse currently in flight.
///
/// Receipts returned by [`ReceptorRegistry::add`] only hold a weak reference to the registry;
/// cancelling after the owning source is gone is a no-op.
pub struct ReceptorRegistry<P> {
    next_id: AtomicU64,
    entries: ArcSwap<Vec<Arc<Entry<P>>>>,
}

struct Entry<P> {
    id: u64,
    live: AtomicBool,
    receptor: Receptor<P>,
}

impl<P: 'static> ReceptorRegistry<P> {
    pub fn new() -> Arc<Self> {
        Arc::new(ReceptorRegistry {
            next_id: AtomicU64::new(0),
            entries: ArcSwap::from_pointee(vec![]),
        })
    }

    /// Attaches `receptor`; the returned receipt detaches it again.
    pub fn add(self: &Arc<Self>, receptor: Receptor<P>) -> Receipt {
        let id = self.next_id.fetch_add(1, AtomicOrdering::AcqRel);
        let entry = Arc::new(Entry {
            id,
            live: AtomicBool::new(true),
            receptor,
        });
        self.entries.rcu({
            let entry = Arc::clone(&entry);
            move |entries| {
                let mut entries = (**entries).clone();
                entries.push(Arc::clone(&entry));
                entries
            }
        });
        trace!(id, receptors = self.len(), "receptor added");

        let registry = Arc::downgrade(self);
        Receipt::new(move || {
            entry.live.store(false, AtomicOrdering::Release);
            if let Some(registry) = Weak::upgrade(&registry) {
                registry.remove(id);
            }
        })
    }

    fn remove(&self, id: u64) {
        self.entries.rcu(move |entries| {
            let mut entries = (**entries).clone();
            entries.retain(|entry| entry.id != id);
            entries
        });
        trace!(id, receptors = self.len(), "receptor removed");
    }

    /// Fans `pulse` out to every receptor attached at the time of the call.
    pub fn receive(&self, pulse: P)
    where
        P: Clone,
    {
        let entries = self.entries.load_full();
        trace!(receptors = entries.len(), "fan-out");
        for entry in entries.iter() {
            if entry.live.load(AtomicOrdering::Acquire) {
                deliver!(entry.receptor, pulse.clone(), "to receptor: {pulse}");
            }
        }
    }
}

impl<P> ReceptorRegistry<P> {
    /// Number of currently attached receptors.
    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P> fmt::Debug for ReceptorRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReceptorRegistry<{}>({} receptors)",
            std::any::type_name::<P>(),
            self.len(),
        )
    }
}
