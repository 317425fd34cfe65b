use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::Span;

use crate::{
    utils::{
        deliver,
        tracing::{instrument, trace},
    },
    Receipt, Receptor, Stream,
};

/// Merges pulses from any number of streams of the same pulse type, whatever their sources.
///
/// ```
/// use crossbeam_queue::SegQueue;
/// use std::sync::Arc;
///
/// use pulse::{from_iter, merge};
///
/// let actual = Arc::new(SegQueue::new());
///
/// merge!(from_iter([1, 2]), from_iter([3]), from_iter([4, 5])).subscribe({
///     let actual = Arc::clone(&actual);
///     move |x| actual.push(x)
/// });
///
/// assert_eq!(actual.len(), 5);
/// ```
#[macro_export]
macro_rules! merge {
    ($($s:expr),* $(,)?) => {
        $crate::merge_all(::std::vec![$(($s).erase()),*])
    };
}

/// Fan-in of any number of streams sharing a pulse type.
///
/// Subscribing subscribes to every stream in order; cancelling cancels all of them.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
pub fn merge_all<S, P: 'static>(streams: Vec<Stream<S, P>>) -> Stream<Vec<S>, P> {
    #[cfg(feature = "tracing")]
    let merge_fn_span = Span::current();
    let subscribers: Vec<_> = streams.iter().map(Stream::subscriber).collect();
    let sources = streams.into_iter().map(Stream::into_source).collect();
    Stream::new(sources, move |downstream: Receptor<P>| {
        instrument!(follows_from: &merge_fn_span, "merge");
        trace!(sources = subscribers.len(), "merging");
        subscribers
            .iter()
            .map(|subscriber| subscriber(Arc::clone(&downstream)))
            .collect::<Receipt>()
    })
}

impl<S, P: 'static> Stream<S, P> {
    /// Operator that forwards pulses from both `self` and `other`, whichever fires.
    pub fn merge<S2>(self, other: Stream<S2, P>) -> Stream<(S, S2), P> {
        let left = self.subscriber();
        let right = other.subscriber();
        Stream::new(
            (self.into_source(), other.into_source()),
            move |downstream: Receptor<P>| {
                Receipt::composite([left(Arc::clone(&downstream)), right(downstream)])
            },
        )
    }

    /// Operator that forwards pulses from both sides while keeping track of which side fired.
    ///
    /// A pulse from `self` arrives as `(Some(pulse), None)`, a pulse from `other` as
    /// `(None, Some(pulse))`.
    pub fn either<S2, Q: 'static>(
        self,
        other: Stream<S2, Q>,
    ) -> Stream<(S, S2), (Option<P>, Option<Q>)> {
        let left = self.subscriber();
        let right = other.subscriber();
        Stream::new(
            (self.into_source(), other.into_source()),
            move |downstream: Receptor<(Option<P>, Option<Q>)>| {
                let from_left = {
                    let downstream = Arc::clone(&downstream);
                    move |pulse: P| {
                        deliver!(downstream, (Some(pulse), None), "to downstream: {pulse}");
                    }
                };
                let from_right = move |pulse: Q| {
                    deliver!(downstream, (None, Some(pulse)), "to downstream: {pulse}");
                };
                Receipt::composite([left(Arc::new(from_left)), right(Arc::new(from_right))])
            },
        )
    }
}
