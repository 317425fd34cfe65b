use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use crate::{utils::deliver, Error, Stream};

impl<S, P: 'static> Stream<S, P> {
    /// Operator that applies a transformation on pulses passing through it.
    ///
    /// A panic in `f` unwinds out through whatever pushed the triggering pulse; nothing is
    /// delivered downstream for that pulse and the stream stays usable.
    ///
    /// ```
    /// use crossbeam_queue::SegQueue;
    /// use std::sync::Arc;
    ///
    /// use pulse::from_iter;
    ///
    /// let actual = Arc::new(SegQueue::new());
    ///
    /// from_iter([1, 2, 3]).map(|x| x * 10).subscribe({
    ///     let actual = Arc::clone(&actual);
    ///     move |x| actual.push(x)
    /// });
    ///
    /// assert_eq!(actual.pop(), Some(10));
    /// assert_eq!(actual.pop(), Some(20));
    /// assert_eq!(actual.pop(), Some(30));
    /// ```
    pub fn map<Q: 'static, F>(self, f: F) -> Stream<S, Q>
    where
        F: Fn(P) -> Q + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.lift(move |downstream| {
            let f = Arc::clone(&f);
            Arc::new(move |pulse: P| {
                deliver!(downstream, f(pulse), "to downstream: {pulse}");
            })
        })
    }

    /// Forwards the `Result` of a fallible transform as the pulse itself.
    pub fn try_map<Q: 'static, E: 'static, F>(self, f: F) -> Stream<S, Result<Q, E>>
    where
        F: Fn(P) -> Result<Q, E> + Send + Sync + 'static,
    {
        self.map(f)
    }

    /// Like [`Stream::map`], but a panic in `f` is captured and forwarded as an
    /// [`Error::Transform`] pulse instead of unwinding.
    pub fn map_catching<Q: 'static, F>(self, f: F) -> Stream<S, Result<Q, Error>>
    where
        F: Fn(P) -> Q + Send + Sync + 'static,
    {
        self.map(move |pulse| {
            panic::catch_unwind(AssertUnwindSafe(|| f(pulse))).map_err(Error::from_panic)
        })
    }
}
