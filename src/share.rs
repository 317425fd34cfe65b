use arc_swap::ArcSwapOption;
use std::sync::{
    atomic::{AtomicBool, Ordering as AtomicOrdering},
    Arc,
};

use crate::{utils::tracing::trace, Receipt, Receptor, ReceptorRegistry, Stream};

impl<S, P> Stream<S, P>
where
    P: Clone + Send + Sync + 'static,
{
    /// Operator that shares one upstream subscription among all of its receptors.
    ///
    /// Upstream is subscribed when the first receptor attaches and cancelled when the last one
    /// detaches; a later receptor subscribes upstream afresh. Receptors attached while upstream is
    /// already connected only see pulses emitted from then on.
    ///
    /// ```
    /// use crossbeam_queue::SegQueue;
    /// use std::sync::{
    ///     atomic::{AtomicUsize, Ordering},
    ///     Arc,
    /// };
    ///
    /// let source = pulse::sink::<i32>();
    /// let evaluated = Arc::new(AtomicUsize::new(0));
    /// let shared = source
    ///     .clone()
    ///     .map({
    ///         let evaluated = Arc::clone(&evaluated);
    ///         move |x| {
    ///             evaluated.fetch_add(1, Ordering::SeqCst);
    ///             x * 2
    ///         }
    ///     })
    ///     .share();
    ///
    /// let actual = Arc::new(SegQueue::new());
    /// let a = shared.subscribe({
    ///     let actual = Arc::clone(&actual);
    ///     move |x| actual.push(x)
    /// });
    /// let b = shared.subscribe({
    ///     let actual = Arc::clone(&actual);
    ///     move |x| actual.push(x)
    /// });
    ///
    /// source.source().receive(21);
    /// assert_eq!(evaluated.load(Ordering::SeqCst), 1);
    /// assert_eq!(actual.len(), 2);
    ///
    /// a.cancel();
    /// b.cancel();
    /// assert_eq!(source.source().receptor_count(), 0);
    /// ```
    pub fn share(self) -> Stream<S, P> {
        let upstream = self.subscriber();
        let registry = ReceptorRegistry::new();
        let connected = Arc::new(AtomicBool::new(false));
        let upstream_receipt: Arc<ArcSwapOption<Receipt>> = Arc::new(ArcSwapOption::from(None));
        Stream::new(self.into_source(), move |downstream: Receptor<P>| {
            let entry = registry.add(downstream);
            if !connected.swap(true, AtomicOrdering::AcqRel) {
                trace!("connecting shared upstream");
                let receipt = upstream(Arc::new({
                    let registry = Arc::clone(&registry);
                    move |pulse: P| registry.receive(pulse)
                }));
                upstream_receipt.store(Some(Arc::new(receipt)));
            }

            let registry = Arc::clone(&registry);
            let connected = Arc::clone(&connected);
            let upstream_receipt = Arc::clone(&upstream_receipt);
            Receipt::new(move || {
                entry.cancel();
                if registry.is_empty() && connected.swap(false, AtomicOrdering::AcqRel) {
                    trace!("disconnecting shared upstream");
                    if let Some(receipt) = upstream_receipt.swap(None) {
                        receipt.cancel();
                    }
                }
            })
        })
    }
}
