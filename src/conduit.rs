use crate::{
    utils::tracing::{trace, warning},
    Error, Receipt, StatePulse, Stream, Transceiver,
};

/// What happens to a write that arrives deeper than the reentrancy limit allows.
///
/// In every case the value is stored and its emission suppressed; the policies only differ in how
/// loudly that is reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverflowPolicy {
    /// Suppress silently.
    #[default]
    Truncate,
    /// Suppress and emit a `tracing` warning (with the `tracing` feature).
    Warn,
    /// Raise [`Error::ReentrancyLimit`] as a panic, unwinding out of the outermost write.
    Panic,
}

/// How many nested writes a transceiver propagates before it stops emitting.
///
/// A write arriving while the transceiver is already `limit` or more writes deep is applied but
/// not emitted. The default limit of 1 allows exactly one reentrant pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Reentrancy {
    pub limit: usize,
    pub overflow: OverflowPolicy,
}

impl Reentrancy {
    pub const fn new(limit: usize) -> Self {
        Reentrancy {
            limit,
            overflow: OverflowPolicy::Truncate,
        }
    }

    pub const fn with_limit(self, limit: usize) -> Self {
        Reentrancy { limit, ..self }
    }

    pub const fn with_overflow(self, overflow: OverflowPolicy) -> Self {
        Reentrancy { overflow, ..self }
    }

    /// Whether a write entering at `depth` (the number of writes already in progress) must have
    /// its emission suppressed.
    pub const fn exceeded_by(&self, depth: usize) -> bool {
        depth > self.limit
    }

    pub(crate) fn overflow(&self, depth: usize) {
        let limit = self.limit;
        match self.overflow {
            OverflowPolicy::Truncate => {
                trace!(depth, limit, "reentrant write suppressed");
            }
            OverflowPolicy::Warn => {
                warning!(depth, limit, "reentrant write suppressed");
            }
            OverflowPolicy::Panic => {
                panic!("{}", Error::ReentrancyLimit { depth, limit });
            }
        }
    }
}

impl Default for Reentrancy {
    fn default() -> Self {
        Reentrancy::new(1)
    }
}

/// Binds two transceivers of the same value type in both directions.
///
/// See [`conduit_with`].
pub fn conduit<T, L, R>(left: &L, right: &R, reentrancy: Reentrancy) -> Receipt
where
    T: Clone + PartialEq + Send + Sync + 'static,
    L: Transceiver<T> + Clone,
    R: Transceiver<T> + Clone,
{
    conduit_with(left, right, |value| value, |value| value, reentrancy)
}

/// Binds two transceivers in both directions through a pair of conversions.
///
/// Every change of `left` is converted with `to_right` and written into `right`, and every change
/// of `right` is converted with `to_left` and written into `left`. The left-to-right link is
/// attached first, so on construction `right` is primed from `left`, then `left` from `right`.
///
/// Writes made by the conduit go through [`Transceiver::write_within`] with `reentrancy`, which
/// bounds how long the two sides keep re-propagating each other's updates. The conversions are
/// not checked for round-trip fidelity: a pair that never agrees settles after the reentrant pass
/// the limit allows, with the two sides differing by that last conversion.
///
/// Cancelling the returned receipt detaches both directions.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "trace", skip(left, right, to_right, to_left))
)]
pub fn conduit_with<T, U, L, R, F, G>(
    left: &L,
    right: &R,
    to_right: F,
    to_left: G,
    reentrancy: Reentrancy,
) -> Receipt
where
    T: Clone + PartialEq + Send + Sync + 'static,
    U: Clone + PartialEq + Send + Sync + 'static,
    L: Transceiver<T> + Clone,
    R: Transceiver<U> + Clone,
    F: Fn(T) -> U + Send + Sync + 'static,
    G: Fn(U) -> T + Send + Sync + 'static,
{
    let rightward = Stream::from_source(left.clone())
        .changes()
        .map(move |pulse: StatePulse<T>| to_right(pulse.new))
        .subscribe({
            let right = right.clone();
            move |value| right.write_within(value, &reentrancy)
        });
    let leftward = Stream::from_source(right.clone())
        .changes()
        .map(move |pulse: StatePulse<U>| to_left(pulse.new))
        .subscribe({
            let left = left.clone();
            move |value| left.write_within(value, &reentrancy)
        });
    Receipt::composite([rightward, leftward])
}

/// Two-way identity binding with the default [`Reentrancy`].
///
/// ```
/// let a = pulse::StateCell::new(0);
/// let b = pulse::StateCell::new(0);
/// let _binding = pulse::bind(&a, &b);
///
/// a.write(5);
/// assert_eq!((a.read(), b.read()), (5, 5));
/// b.write(7);
/// assert_eq!((a.read(), b.read()), (7, 7));
/// ```
pub fn bind<T, L, R>(left: &L, right: &R) -> Receipt
where
    T: Clone + PartialEq + Send + Sync + 'static,
    L: Transceiver<T> + Clone,
    R: Transceiver<T> + Clone,
{
    conduit(left, right, Reentrancy::default())
}

impl<S, P: 'static> Stream<S, P> {
    /// One-way binding: writes every pulse into `target`.
    ///
    /// Nothing flows back, so no reentrancy guard is involved beyond the target's own.
    pub fn pipe<T>(&self, target: &T) -> Receipt
    where
        T: Transceiver<P> + Clone,
    {
        let target = target.clone();
        trace!("piping into transceiver");
        self.subscribe(move |pulse| target.write(pulse))
    }
}

impl<S, T> Stream<S, StatePulse<T>>
where
    S: Transceiver<T> + Clone,
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Two-way identity binding between the transceivers behind two streams.
    pub fn bind<R>(&self, other: &Stream<R, StatePulse<T>>) -> Receipt
    where
        R: Transceiver<T> + Clone,
    {
        bind(self.source(), other.source())
    }

    /// Two-way binding through conversions; see [`conduit_with`].
    pub fn conduit<R, U, F, G>(
        &self,
        other: &Stream<R, StatePulse<U>>,
        to_right: F,
        to_left: G,
        reentrancy: Reentrancy,
    ) -> Receipt
    where
        R: Transceiver<U> + Clone,
        U: Clone + PartialEq + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
        G: Fn(U) -> T + Send + Sync + 'static,
    {
        conduit_with(self.source(), other.source(), to_right, to_left, reentrancy)
    }
}
