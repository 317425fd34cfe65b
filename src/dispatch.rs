use async_nursery::{Nurse, NurseExt};
use futures_timer::Delay;
use std::{
    fmt,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering},
        Arc,
    },
    thread,
    time::Duration,
};

use crate::{
    utils::{
        deliver,
        tracing::{trace, warning},
    },
    Error, Receipt, Receptor, Stream,
};

/// A unit of deferred delivery handed to a [`Dispatcher`].
pub type Work = Box<dyn FnOnce() + Send>;

/// An execution context that pulse delivery can be marshalled onto.
pub trait Dispatcher: Send + Sync + 'static {
    /// Arranges for `work` to run, after `delay` if one is given.
    fn schedule(&self, work: Work, delay: Option<Duration>) -> Result<(), Error>;
}

/// Runs work synchronously on the calling thread, sleeping first when delayed.
#[derive(Clone, Copy, Debug, Default)]
pub struct Immediate;

impl Dispatcher for Immediate {
    fn schedule(&self, work: Work, delay: Option<Duration>) -> Result<(), Error> {
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        work();
        Ok(())
    }
}

/// Spawns work as a task on an [`async_nursery`] nursery.
pub struct NurseryDispatcher<N> {
    nursery: N,
}

impl<N> NurseryDispatcher<N>
where
    N: Nurse<()> + Send + Sync + 'static,
{
    pub fn new(nursery: N) -> Self {
        NurseryDispatcher { nursery }
    }
}

impl<N> fmt::Debug for NurseryDispatcher<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NurseryDispatcher<{}>", std::any::type_name::<N>())
    }
}

impl<N> Dispatcher for NurseryDispatcher<N>
where
    N: Nurse<()> + Send + Sync + 'static,
{
    fn schedule(&self, work: Work, delay: Option<Duration>) -> Result<(), Error> {
        self.nursery
            .nurse(async move {
                if let Some(delay) = delay {
                    Delay::new(delay).await;
                }
                work();
            })
            .map_err(|err| Error::Dispatch(format!("{err:?}")))
    }
}

impl<S, P> Stream<S, P>
where
    P: Send + 'static,
{
    /// Operator that hands the delivery of every pulse to `dispatcher`, optionally delayed.
    ///
    /// Pulses still queued on the dispatcher when the subscription is cancelled are dropped.
    /// Work the dispatcher refuses is logged and dropped.
    ///
    /// ```
    /// use crossbeam_queue::SegQueue;
    /// use std::sync::Arc;
    ///
    /// use pulse::{from_iter, Immediate};
    ///
    /// let actual = Arc::new(SegQueue::new());
    ///
    /// from_iter([1, 2, 3]).dispatch(Immediate, None).subscribe({
    ///     let actual = Arc::clone(&actual);
    ///     move |x| actual.push(x)
    /// });
    ///
    /// assert_eq!(actual.len(), 3);
    /// ```
    pub fn dispatch<D>(self, dispatcher: D, delay: Option<Duration>) -> Stream<S, P>
    where
        D: Dispatcher,
    {
        let upstream = self.subscriber();
        let dispatcher = Arc::new(dispatcher);
        Stream::new(self.into_source(), move |downstream: Receptor<P>| {
            let live = Arc::new(AtomicBool::new(true));
            let receipt = upstream(Arc::new({
                let dispatcher = Arc::clone(&dispatcher);
                let live = Arc::clone(&live);
                move |pulse: P| {
                    let downstream = Arc::clone(&downstream);
                    let live = Arc::clone(&live);
                    let scheduled = dispatcher.schedule(
                        Box::new(move || {
                            if live.load(AtomicOrdering::Acquire) {
                                deliver!(downstream, pulse, "dispatched: {pulse}");
                            }
                        }),
                        delay,
                    );
                    match scheduled {
                        Ok(()) => {}
                        #[cfg(feature = "tracing")]
                        Err(err) => {
                            warning!(%err, "dropping pulse");
                        }
                        #[cfg(not(feature = "tracing"))]
                        Err(_) => {}
                    }
                }
            }));

            let request = receipt.clone();
            Receipt::with_request(
                move || {
                    live.store(false, AtomicOrdering::Release);
                    receipt.cancel();
                },
                move || request.request(),
            )
        })
    }
}

/// Source emitting `0, 1, 2, ...` once every `period`, with one timer task per subscription.
///
/// The task stops at the first tick after its subscription is cancelled.
///
/// ```
/// use async_nursery::Nursery;
/// use crossbeam_queue::SegQueue;
/// use std::{sync::Arc, time::Duration};
///
/// use pulse::interval;
///
/// let (nursery, nursery_out) = Nursery::new(async_executors::AsyncStd);
///
/// let actual = Arc::new(SegQueue::new());
///
/// let receipt = interval(Duration::from_millis(100), nursery.clone()).subscribe({
///     let actual = Arc::clone(&actual);
///     move |x| actual.push(x)
/// });
///
/// drop(nursery);
/// async_std::task::block_on(async_std::task::sleep(Duration::from_millis(450)));
/// receipt.cancel();
/// async_std::task::block_on(nursery_out);
///
/// let mut v = vec![];
/// while let Some(x) = actual.pop() {
///     v.push(x);
/// }
/// assert!(v.starts_with(&[0, 1, 2]));
/// ```
pub fn interval<N>(period: Duration, nursery: N) -> Stream<(), usize>
where
    N: Nurse<()> + Send + Sync + 'static,
{
    Stream::new((), move |downstream: Receptor<usize>| {
        let cleared = Arc::new(AtomicBool::new(false));
        let spawned = nursery.nurse({
            let cleared = Arc::clone(&cleared);
            let i = AtomicUsize::new(0);
            let mut timer = Delay::new(period);
            async move {
                loop {
                    Pin::new(&mut timer).await;
                    if cleared.load(AtomicOrdering::Acquire) {
                        break;
                    }
                    timer.reset(period);
                    let i = i.fetch_add(1, AtomicOrdering::AcqRel);
                    deliver!(downstream, i, "tick: {pulse}");
                }
            }
        });
        match spawned {
            Ok(()) => {
                trace!(?period, "interval started");
            }
            #[cfg(feature = "tracing")]
            Err(err) => {
                warning!(?err, "interval could not start");
            }
            #[cfg(not(feature = "tracing"))]
            Err(_) => {}
        }
        Receipt::new(move || cleared.store(true, AtomicOrdering::Release))
    })
}
