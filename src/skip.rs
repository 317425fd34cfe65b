use std::sync::{
    atomic::{AtomicUsize, Ordering as AtomicOrdering},
    Arc,
};

use crate::{utils::deliver, Stream};

impl<S, P: 'static> Stream<S, P> {
    /// Operator that drops the first `max` pulses and forwards the rest unchanged.
    pub fn skip(self, max: usize) -> Stream<S, P> {
        self.lift(move |downstream| {
            let skipped = AtomicUsize::new(0);
            Arc::new(move |pulse: P| {
                let dropped = skipped
                    .fetch_update(AtomicOrdering::AcqRel, AtomicOrdering::Acquire, |n| {
                        (n < max).then_some(n + 1)
                    })
                    .is_ok();
                if !dropped {
                    deliver!(downstream, pulse, "to downstream: {pulse}");
                }
            })
        })
    }
}
