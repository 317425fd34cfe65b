use std::sync::Arc;

use crate::{
    utils::{deliver, tracing::trace},
    CompositeReceipt, Receptor, Stream,
};

impl<S, S2, P> Stream<S, Stream<S2, P>>
where
    S2: 'static,
    P: 'static,
{
    /// Operator that subscribes to every inner stream the outer stream emits and forwards all of
    /// their pulses downstream.
    ///
    /// Inner subscriptions are never replaced; they all stay attached until the flattened
    /// subscription is cancelled, which cancels the outer subscription and every inner one.
    ///
    /// ```
    /// use crossbeam_queue::SegQueue;
    /// use std::sync::Arc;
    ///
    /// use pulse::from_iter;
    ///
    /// let actual = Arc::new(SegQueue::new());
    ///
    /// from_iter([1usize, 2])
    ///     .map(|x| from_iter(vec![x; x]))
    ///     .flatten()
    ///     .subscribe({
    ///         let actual = Arc::clone(&actual);
    ///         move |x| actual.push(x)
    ///     });
    ///
    /// let mut v = vec![];
    /// while let Some(x) = actual.pop() {
    ///     v.push(x);
    /// }
    /// assert_eq!(v, [1, 2, 2]);
    /// ```
    pub fn flatten(self) -> Stream<S, P> {
        let outer = self.subscriber();
        Stream::new(self.into_source(), move |downstream: Receptor<P>| {
            let receipts = CompositeReceipt::new();
            let outer_receipt = outer(Arc::new({
                let receipts = receipts.clone();
                move |inner: Stream<S2, P>| {
                    if receipts.is_cancelled() {
                        return;
                    }
                    trace!(inner = receipts.len(), "subscribing to inner stream");
                    let downstream = Arc::clone(&downstream);
                    receipts.push(inner.subscribe(move |pulse: P| {
                        deliver!(downstream, pulse, "to downstream: {pulse}");
                    }));
                }
            }));
            receipts.push(outer_receipt);
            receipts.into_receipt()
        })
    }
}

impl<S, P: 'static> Stream<S, P> {
    /// `map` followed by [`Stream::flatten`].
    pub fn flat_map<S2: 'static, Q: 'static, F>(self, f: F) -> Stream<S, Q>
    where
        F: Fn(P) -> Stream<S2, Q> + Send + Sync + 'static,
    {
        self.map(f).flatten()
    }
}
