use parking_lot::Mutex;
use std::sync::Arc;

use crate::{utils::deliver, Stream};

impl<S, P: 'static> Stream<S, P> {
    /// Operator that conditionally lets pulses pass through.
    pub fn filter<F>(self, predicate: F) -> Stream<S, P>
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        self.lift(move |downstream| {
            let predicate = Arc::clone(&predicate);
            Arc::new(move |pulse: P| {
                if predicate(&pulse) {
                    deliver!(downstream, pulse, "to downstream: {pulse}");
                }
            })
        })
    }

    /// Operator that compares each pulse with a retained previous one.
    ///
    /// The first pulse always passes. After that a pulse passes only if
    /// `predicate(current, previous)` holds. With `last_passed` unset the previous value advances
    /// on every pulse seen; with it set, only on pulses that were forwarded.
    ///
    /// `sieve(|a, b| a != b, false)` removes consecutive duplicates:
    ///
    /// ```
    /// use crossbeam_queue::SegQueue;
    /// use std::sync::Arc;
    ///
    /// use pulse::from_iter;
    ///
    /// let actual = Arc::new(SegQueue::new());
    ///
    /// from_iter([1, 1, 2, 2, 2, 1]).sieve(|a, b| a != b, false).subscribe({
    ///     let actual = Arc::clone(&actual);
    ///     move |x| actual.push(x)
    /// });
    ///
    /// let mut v = vec![];
    /// while let Some(x) = actual.pop() {
    ///     v.push(x);
    /// }
    /// assert_eq!(v, [1, 2, 1]);
    /// ```
    pub fn sieve<F>(self, predicate: F, last_passed: bool) -> Stream<S, P>
    where
        P: Clone + Send,
        F: Fn(&P, &P) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        self.lift(move |downstream| {
            let predicate = Arc::clone(&predicate);
            let previous: Mutex<Option<P>> = Mutex::new(None);
            Arc::new(move |pulse: P| {
                let retained = previous.lock().clone();
                let pass = match &retained {
                    None => true,
                    Some(previous) => predicate(&pulse, previous),
                };
                if pass || !last_passed {
                    *previous.lock() = Some(pulse.clone());
                }
                if pass {
                    deliver!(downstream, pulse, "to downstream: {pulse}");
                }
            })
        })
    }

    /// Removes consecutive duplicates.
    pub fn distinct(self) -> Stream<S, P>
    where
        P: Clone + PartialEq + Send,
    {
        self.sieve(|current, previous| current != previous, false)
    }
}
