use never::Never;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::{
    utils::{deliver, tracing::trace},
    Receipt, Stream,
};

#[cfg(feature = "tracing")]
use std::fmt;

/// Stream factory that pushes every element of an iterable to each new subscriber.
///
/// The iterable is a value source: it is cloned for every subscription, so each subscriber sees
/// the whole sequence. Delivery is synchronous and finishes before `subscribe` returns.
///
/// # Examples
///
/// ```
/// use crossbeam_queue::SegQueue;
/// use std::sync::Arc;
///
/// use pulse::from_iter;
///
/// let actual = Arc::new(SegQueue::new());
///
/// from_iter([1, 2, 3, 4, 5]).filter(|x| x % 2 == 1).subscribe({
///     let actual = Arc::clone(&actual);
///     move |x| actual.push(x)
/// });
///
/// assert_eq!(
///     &{
///         let mut v = vec![];
///         while let Some(x) = actual.pop() {
///             v.push(x);
///         }
///         v
///     }[..],
///     [1, 3, 5]
/// );
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace"))]
pub fn from_iter<
    #[cfg(not(feature = "tracing"))] I: 'static,
    #[cfg(feature = "tracing")] I: fmt::Debug + 'static,
>(
    iter: I,
) -> Stream<I, I::Item>
where
    I: IntoIterator + Clone + Send + Sync,
    I::Item: 'static,
{
    let source = iter.clone();
    Stream::new(source, move |receptor| {
        for item in iter.clone() {
            deliver!(receptor, item, "to receptor: {pulse}");
        }
        Receipt::empty()
    })
}

/// Stream factory over a pull-based generator.
///
/// Each subscription pulls from `generator` until it yields `None` and pushes every value it gets.
/// The generator is shared, so a later subscription resumes wherever the previous one stopped.
/// Delivery is synchronous, so the generator has to run dry eventually.
pub fn from_fn<P: 'static, F>(generator: F) -> Stream<(), P>
where
    F: FnMut() -> Option<P> + Send + 'static,
{
    let generator = Arc::new(Mutex::new(generator));
    Stream::new((), move |receptor| {
        loop {
            let next = {
                let generator = &mut *generator.lock();
                generator()
            };
            match next {
                Some(pulse) => {
                    deliver!(receptor, pulse, "to receptor: {pulse}");
                }
                None => {
                    trace!("generator exhausted");
                    break;
                }
            }
        }
        Receipt::empty()
    })
}

/// A stream that never emits.
pub fn never() -> Stream<(), Never> {
    Stream::new((), |_receptor| Receipt::empty())
}
