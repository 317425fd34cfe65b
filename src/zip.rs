use parking_lot::Mutex;
use paste::paste;
use std::{any::Any, collections::VecDeque, sync::Arc};

use crate::{
    utils::{deliver, tracing::trace},
    Receipt, Receptor, Stream,
};

/// Type-erased pulse used to zip streams of different pulse types through one n-ary core.
type AnyPulse = Box<dyn Any + Send>;

/// Zips any number of streams into a tuple stream.
///
/// ```
/// use crossbeam_queue::SegQueue;
/// use std::sync::Arc;
///
/// use pulse::{sink, zip};
///
/// let numbers = sink::<i32>();
/// let words = sink::<&'static str>();
/// let flags = sink::<bool>();
/// let actual = Arc::new(SegQueue::new());
///
/// zip!(numbers.clone(), words.clone(), flags.clone()).subscribe({
///     let actual = Arc::clone(&actual);
///     move |x| actual.push(x)
/// });
///
/// numbers.source().feed([1, 2]);
/// words.source().receive("one");
/// flags.source().feed([true, false]);
///
/// assert_eq!(actual.pop(), Some((1, "one", true)));
/// assert_eq!(actual.pop(), None);
/// ```
#[macro_export]
macro_rules! zip {
    ($($s:expr),+ $(,)?) => {
        $crate::StreamTuple::zip(($($s,)+), ::std::option::Option::None)
    };
}

/// Merges any number of streams into a tuple of options, exactly one of which is set per pulse.
#[macro_export]
macro_rules! either {
    ($($s:expr),+ $(,)?) => {
        $crate::StreamTuple::either(($($s,)+))
    };
}

/// N-ary zip of streams sharing a pulse type.
///
/// Keeps one FIFO queue per stream. Whenever every queue holds at least one pulse, the front of
/// each is dequeued and emitted together, in stream order. With a `capacity`, a queue growing
/// beyond it silently drops its oldest pulses.
pub fn zip_all<S, P>(streams: Vec<Stream<S, P>>, capacity: Option<usize>) -> Stream<Vec<S>, Vec<P>>
where
    P: Send + 'static,
{
    let subscribers: Vec<_> = streams.iter().map(Stream::subscriber).collect();
    let sources = streams.into_iter().map(Stream::into_source).collect();
    Stream::new(sources, move |downstream: Receptor<Vec<P>>| {
        let queues: Arc<Mutex<Vec<VecDeque<P>>>> =
            Arc::new(Mutex::new((0..subscribers.len()).map(|_| VecDeque::new()).collect()));
        subscribers
            .iter()
            .enumerate()
            .map(|(index, subscriber)| {
                let queues = Arc::clone(&queues);
                let downstream = Arc::clone(&downstream);
                subscriber(Arc::new(move |pulse: P| {
                    let ready = {
                        let queues = &mut *queues.lock();
                        enqueue(&mut queues[index], pulse, capacity);
                        let mut ready: Vec<Vec<P>> = vec![];
                        while queues.iter().all(|queue| !queue.is_empty()) {
                            ready.push(queues.iter_mut().filter_map(VecDeque::pop_front).collect());
                        }
                        ready
                    };
                    for tuple in ready {
                        deliver!(downstream, tuple, "to downstream: {pulse}");
                    }
                }))
            })
            .collect::<Receipt>()
    })
}

/// N-ary either of streams sharing a pulse type; each pulse is tagged with the index of the
/// stream it came from.
pub fn either_all<S, P: 'static>(streams: Vec<Stream<S, P>>) -> Stream<Vec<S>, (usize, P)> {
    let subscribers: Vec<_> = streams.iter().map(Stream::subscriber).collect();
    let sources = streams.into_iter().map(Stream::into_source).collect();
    Stream::new(sources, move |downstream: Receptor<(usize, P)>| {
        subscribers
            .iter()
            .enumerate()
            .map(|(index, subscriber)| {
                let downstream = Arc::clone(&downstream);
                subscriber(Arc::new(move |pulse: P| {
                    deliver!(downstream, (index, pulse), "to downstream: {pulse}");
                }))
            })
            .collect::<Receipt>()
    })
}

fn enqueue<P>(queue: &mut VecDeque<P>, pulse: P, capacity: Option<usize>) {
    queue.push_back(pulse);
    if let Some(capacity) = capacity {
        while queue.len() > capacity {
            queue.pop_front();
            trace!(capacity, "zip queue over capacity, dropped oldest pulse");
        }
    }
}

impl<S, P: Send + 'static> Stream<S, P> {
    /// Operator that pairs the i-th pulse of `self` with the i-th pulse of `other`.
    ///
    /// Unpaired pulses wait in a per-side queue until their counterpart arrives. `capacity`
    /// bounds each queue, dropping the oldest pulses first; it is a lossy bound, not
    /// backpressure.
    pub fn zip<S2, Q>(self, other: Stream<S2, Q>, capacity: Option<usize>) -> Stream<(S, S2), (P, Q)>
    where
        Q: Send + 'static,
    {
        let left = self.subscriber();
        let right = other.subscriber();
        Stream::new(
            (self.into_source(), other.into_source()),
            move |downstream: Receptor<(P, Q)>| {
                let queues: Arc<Mutex<(VecDeque<P>, VecDeque<Q>)>> = Arc::default();
                let drain = |queues: &mut (VecDeque<P>, VecDeque<Q>)| {
                    let mut ready = vec![];
                    while !queues.0.is_empty() && !queues.1.is_empty() {
                        if let (Some(p), Some(q)) = (queues.0.pop_front(), queues.1.pop_front()) {
                            ready.push((p, q));
                        }
                    }
                    ready
                };
                let left_receipt = left(Arc::new({
                    let queues = Arc::clone(&queues);
                    let downstream = Arc::clone(&downstream);
                    move |pulse: P| {
                        let ready = {
                            let queues = &mut *queues.lock();
                            enqueue(&mut queues.0, pulse, capacity);
                            drain(queues)
                        };
                        for pair in ready {
                            deliver!(downstream, pair, "to downstream: {pulse}");
                        }
                    }
                }));
                let right_receipt = right(Arc::new(move |pulse: Q| {
                    let ready = {
                        let queues = &mut *queues.lock();
                        enqueue(&mut queues.1, pulse, capacity);
                        drain(queues)
                    };
                    for pair in ready {
                        deliver!(downstream, pair, "to downstream: {pulse}");
                    }
                }));
                Receipt::composite([left_receipt, right_receipt])
            },
        )
    }
}

fn into_any<S, P: Send + 'static>(stream: Stream<S, P>) -> (S, Stream<(), AnyPulse>) {
    let subscriber = stream.subscriber();
    let erased = Stream::new((), move |downstream: Receptor<AnyPulse>| {
        subscriber(Arc::new(move |pulse: P| downstream(Box::new(pulse) as AnyPulse)))
    });
    (stream.into_source(), erased)
}

fn decode<P: 'static>(pulse: AnyPulse) -> P {
    match pulse.downcast::<P>() {
        Ok(pulse) => *pulse,
        Err(_) => unreachable!("pulse decoded at the wrong position"),
    }
}

/// A tuple of streams that can be zipped or merged into one tuple-typed stream.
///
/// Implemented for tuples of 2 to 12 streams; every arity goes through the same type-erased
/// [`zip_all`] / [`either_all`] core and is decoded positionally.
pub trait StreamTuple {
    type Sources;
    type Zipped;
    type Either;

    fn zip(self, capacity: Option<usize>) -> Stream<Self::Sources, Self::Zipped>;

    fn either(self) -> Stream<Self::Sources, Self::Either>;
}

macro_rules! stream_tuple_impls {
    ($(
        { $(($idx:tt) -> $T:ident)+ }
    )+) => { paste! {
        $(
            impl<$($T: Send + 'static, [<S $T>]: 'static),+> StreamTuple for ($(Stream<[<S $T>], $T>,)+) {
                type Sources = ($([<S $T>],)+);
                type Zipped = ($($T,)+);
                type Either = ($(Option<$T>,)+);

                fn zip(self, capacity: Option<usize>) -> Stream<Self::Sources, Self::Zipped> {
                    $(
                        let ([<source_ $idx>], [<erased_ $idx>]) = into_any(self.$idx);
                    )+
                    zip_all(vec![$([<erased_ $idx>]),+], capacity)
                        .map(|pulses: Vec<AnyPulse>| {
                            let mut pulses = pulses.into_iter();
                            ($(decode::<$T>(pulses.next().unwrap_or_else(|| {
                                unreachable!("zip emitted fewer pulses than streams")
                            })),)+)
                        })
                        .with_source(($([<source_ $idx>],)+))
                }

                fn either(self) -> Stream<Self::Sources, Self::Either> {
                    $(
                        let ([<source_ $idx>], [<erased_ $idx>]) = into_any(self.$idx);
                    )+
                    either_all(vec![$([<erased_ $idx>]),+])
                        .map(|(index, pulse): (usize, AnyPulse)| {
                            let mut pulse = Some(pulse);
                            ($(
                                if index == $idx { pulse.take().map(decode::<$T>) } else { None },
                            )+)
                        })
                        .with_source(($([<source_ $idx>],)+))
                }
            }
        )+
    } };
}

stream_tuple_impls! {
    {
        (0) -> A
        (1) -> B
    }
    {
        (0) -> A
        (1) -> B
        (2) -> C
    }
    {
        (0) -> A
        (1) -> B
        (2) -> C
        (3) -> D
    }
    {
        (0) -> A
        (1) -> B
        (2) -> C
        (3) -> D
        (4) -> E
    }
    {
        (0) -> A
        (1) -> B
        (2) -> C
        (3) -> D
        (4) -> E
        (5) -> F
    }
    {
        (0) -> A
        (1) -> B
        (2) -> C
        (3) -> D
        (4) -> E
        (5) -> F
        (6) -> G
    }
    {
        (0) -> A
        (1) -> B
        (2) -> C
        (3) -> D
        (4) -> E
        (5) -> F
        (6) -> G
        (7) -> H
    }
    {
        (0) -> A
        (1) -> B
        (2) -> C
        (3) -> D
        (4) -> E
        (5) -> F
        (6) -> G
        (7) -> H
        (8) -> I
    }
    {
        (0) -> A
        (1) -> B
        (2) -> C
        (3) -> D
        (4) -> E
        (5) -> F
        (6) -> G
        (7) -> H
        (8) -> I
        (9) -> J
    }
    {
        (0) -> A
        (1) -> B
        (2) -> C
        (3) -> D
        (4) -> E
        (5) -> F
        (6) -> G
        (7) -> H
        (8) -> I
        (9) -> J
        (10) -> K
    }
    {
        (0) -> A
        (1) -> B
        (2) -> C
        (3) -> D
        (4) -> E
        (5) -> F
        (6) -> G
        (7) -> H
        (8) -> I
        (9) -> J
        (10) -> K
        (11) -> L
    }
}
