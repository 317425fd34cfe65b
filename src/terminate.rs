use arc_swap::ArcSwapOption;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering},
    Arc,
};

#[cfg(feature = "tracing")]
use tracing::Span;

use crate::{
    utils::{
        deliver,
        tracing::{instrument, trace},
    },
    Receipt, Stream,
};

pub type Terminus<P> = Arc<dyn Fn() -> P + Send + Sync>;

enum Step {
    Forward,
    ForwardAndEnd,
    End,
}

impl<S, P: 'static> Stream<S, P> {
    /// Operator that forwards pulses until `predicate` holds.
    ///
    /// The matching pulse is not forwarded. Instead `terminus`, when given, synthesises one final
    /// pulse, after which the subscription cancels itself (and with it every downstream
    /// subscription built on it). Upstream pulses that still arrive afterwards are dropped.
    ///
    /// ```
    /// use crossbeam_queue::SegQueue;
    /// use std::sync::Arc;
    ///
    /// let stream = pulse::sink::<i32>();
    /// let actual = Arc::new(SegQueue::new());
    ///
    /// stream
    ///     .clone()
    ///     .terminate(|x| *x < 0, Some(Arc::new(|| 0)))
    ///     .subscribe({
    ///         let actual = Arc::clone(&actual);
    ///         move |x| actual.push(x)
    ///     });
    ///
    /// stream.source().feed([1, 2, -1, 3]);
    ///
    /// assert_eq!(actual.pop(), Some(1));
    /// assert_eq!(actual.pop(), Some(2));
    /// assert_eq!(actual.pop(), Some(0));
    /// assert_eq!(actual.pop(), None);
    /// assert_eq!(stream.source().receptor_count(), 0);
    /// ```
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip(predicate, terminus))
    )]
    pub fn terminate<F>(self, predicate: F, terminus: Option<Terminus<P>>) -> Stream<S, P>
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        self.terminate_with(
            move || {
                let predicate = Arc::clone(&predicate);
                move |pulse: &P| {
                    if predicate(pulse) {
                        Step::End
                    } else {
                        Step::Forward
                    }
                }
            },
            terminus,
        )
    }

    /// Operator that forwards the first `max` pulses, then terminates.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace"))]
    pub fn take(self, max: usize) -> Stream<S, P> {
        if max == 0 {
            return Stream::new(self.into_source(), |_downstream| Receipt::empty());
        }
        self.terminate_with(
            move || {
                let taken = AtomicUsize::new(0);
                move |_pulse: &P| {
                    if taken.fetch_add(1, AtomicOrdering::AcqRel) + 1 >= max {
                        Step::ForwardAndEnd
                    } else {
                        Step::Forward
                    }
                }
            },
            None,
        )
    }

    fn terminate_with<M, D>(self, make_decide: M, terminus: Option<Terminus<P>>) -> Stream<S, P>
    where
        M: Fn() -> D + Send + Sync + 'static,
        D: Fn(&P) -> Step + Send + Sync + 'static,
    {
        #[cfg(feature = "tracing")]
        let terminate_fn_span = Span::current();
        let upstream = self.subscriber();
        Stream::new(self.into_source(), move |downstream| {
            instrument!(follows_from: &terminate_fn_span, "terminate");
            let decide = make_decide();
            let ended = Arc::new(AtomicBool::new(false));
            let upstream_receipt: Arc<ArcSwapOption<Receipt>> = Arc::new(ArcSwapOption::from(None));
            let receipt = upstream(Arc::new({
                let terminus = terminus.clone();
                let ended = Arc::clone(&ended);
                let upstream_receipt = Arc::clone(&upstream_receipt);
                move |pulse: P| {
                    if ended.load(AtomicOrdering::Acquire) {
                        return;
                    }
                    let last = match decide(&pulse) {
                        Step::Forward => {
                            deliver!(downstream, pulse, "to downstream: {pulse}");
                            return;
                        }
                        Step::ForwardAndEnd => Some(pulse),
                        Step::End => None,
                    };
                    if ended.swap(true, AtomicOrdering::AcqRel) {
                        return;
                    }
                    trace!("terminated");
                    if let Some(pulse) = last {
                        deliver!(downstream, pulse, "to downstream: {pulse}");
                    }
                    if let Some(terminus) = &terminus {
                        deliver!(downstream, terminus(), "to downstream: {pulse}");
                    }
                    if let Some(receipt) = upstream_receipt.swap(None) {
                        receipt.cancel();
                    }
                }
            }));
            upstream_receipt.store(Some(Arc::new(receipt.clone())));
            // ended while still subscribing, before the receipt existed
            if ended.load(AtomicOrdering::Acquire) {
                upstream_receipt.store(None);
                receipt.cancel();
            }
            receipt
        })
    }
}
