use parking_lot::Mutex;
use std::{mem, sync::Arc};

use crate::{utils::deliver, Stream};

impl<S, P: 'static> Stream<S, P> {
    /// Operator that folds pulses into an accumulator and emits it at terminators.
    ///
    /// Every pulse for which `is_terminator` is false is folded with `combine`. On a terminator
    /// pulse the accumulator is emitted, after folding the terminator in as well when
    /// `include_terminators` is set; when `clear_after_emission` is set the accumulator then
    /// restarts from `initial`.
    ///
    /// ```
    /// use crossbeam_queue::SegQueue;
    /// use std::sync::Arc;
    ///
    /// use pulse::from_iter;
    ///
    /// let actual = Arc::new(SegQueue::new());
    ///
    /// from_iter("ab cd e".chars().collect::<Vec<_>>())
    ///     .reduce(
    ///         String::new(),
    ///         |mut acc, c| {
    ///             acc.push(c);
    ///             acc
    ///         },
    ///         |c| *c == ' ',
    ///         false,
    ///         true,
    ///     )
    ///     .subscribe({
    ///         let actual = Arc::clone(&actual);
    ///         move |word| actual.push(word)
    ///     });
    ///
    /// assert_eq!(actual.pop().as_deref(), Some("ab"));
    /// assert_eq!(actual.pop().as_deref(), Some("cd"));
    /// assert_eq!(actual.pop(), None);
    /// ```
    pub fn reduce<A, F, T>(
        self,
        initial: A,
        combine: F,
        is_terminator: T,
        include_terminators: bool,
        clear_after_emission: bool,
    ) -> Stream<S, A>
    where
        A: Clone + Send + Sync + 'static,
        F: Fn(A, P) -> A + Send + Sync + 'static,
        T: Fn(&P) -> bool + Send + Sync + 'static,
    {
        let combine = Arc::new(combine);
        let is_terminator = Arc::new(is_terminator);
        self.lift(move |downstream| {
            let combine = Arc::clone(&combine);
            let is_terminator = Arc::clone(&is_terminator);
            let initial = initial.clone();
            let accumulator = Mutex::new(initial.clone());
            Arc::new(move |pulse: P| {
                // user callbacks run unlocked so they may push back into this subscription
                let terminator = is_terminator(&pulse);
                if !terminator || include_terminators {
                    let acc = accumulator.lock().clone();
                    let acc = combine(acc, pulse);
                    *accumulator.lock() = acc;
                }
                if !terminator {
                    return;
                }
                let emitted = {
                    let mut accumulator = accumulator.lock();
                    if clear_after_emission {
                        mem::replace(&mut *accumulator, initial.clone())
                    } else {
                        accumulator.clone()
                    }
                };
                deliver!(downstream, emitted, "to downstream: {pulse}");
            })
        })
    }

    /// Operator that emits the running fold of every pulse, starting from `initial`.
    pub fn scan<A, F>(self, initial: A, combine: F) -> Stream<S, A>
    where
        A: Clone + Send + Sync + 'static,
        F: Fn(A, P) -> A + Send + Sync + 'static,
    {
        let combine = Arc::new(combine);
        self.lift(move |downstream| {
            let combine = Arc::clone(&combine);
            let accumulator = Mutex::new(initial.clone());
            Arc::new(move |pulse: P| {
                let acc = accumulator.lock().clone();
                let next = combine(acc, pulse);
                *accumulator.lock() = next.clone();
                deliver!(downstream, next, "to downstream: {pulse}");
            })
        })
    }
}
