use parking_lot::Mutex;
use std::{mem, sync::Arc};

use crate::{utils::deliver, Stream};

impl<S, P: 'static> Stream<S, P> {
    /// Operator that collects pulses into batches of `size`.
    ///
    /// A batch is emitted as soon as it is full, in arrival order. A trailing partial batch is
    /// never emitted.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn buffer(self, size: usize) -> Stream<S, Vec<P>>
    where
        P: Send,
    {
        assert!(size > 0, "buffer size must be non-zero");
        self.lift(move |downstream| {
            let pending: Mutex<Vec<P>> = Mutex::new(Vec::with_capacity(size));
            Arc::new(move |pulse: P| {
                let full = {
                    let mut pending = pending.lock();
                    pending.push(pulse);
                    if pending.len() < size {
                        return;
                    }
                    mem::replace(&mut *pending, Vec::with_capacity(size))
                };
                deliver!(downstream, full, "to downstream: {pulse}");
            })
        })
    }
}
