use arc_swap::ArcSwap;
use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering as AtomicOrdering},
        Arc,
    },
};

use crate::{
    utils::{deliver, tracing::trace},
    Receipt, Receptor, ReceptorRegistry, Reentrancy, Source, Stream,
};

/// A pulse describing a change of some state: the previous value and the current one.
///
/// `old` is `None` only for the priming pulse delivered when a subscription starts. Every later
/// pulse carries the `new` of the one before it as its `old`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StatePulse<T> {
    pub old: Option<T>,
    pub new: T,
}

impl<T> StatePulse<T> {
    pub fn primed(new: T) -> Self {
        StatePulse { old: None, new }
    }

    pub fn changed(old: T, new: T) -> Self {
        StatePulse {
            old: Some(old),
            new,
        }
    }

    pub fn is_priming(&self) -> bool {
        self.old.is_none()
    }

    /// Applies `f` to both the old and the new value.
    pub fn map<U, F>(self, f: F) -> StatePulse<U>
    where
        F: Fn(T) -> U,
    {
        StatePulse {
            old: self.old.map(&f),
            new: f(self.new),
        }
    }
}

/// Readable, writable state whose changes can be subscribed to.
///
/// Subscribing (through [`Source::subscribe`]) must first deliver a priming [`StatePulse`]
/// carrying the current value, then one pulse per write.
pub trait Transceiver<T>: Source<Pulse = StatePulse<T>> {
    fn read(&self) -> T;

    fn write(&self, value: T);

    /// Writes on behalf of a binding that carries its own reentrancy configuration.
    ///
    /// Transceivers that do not track reentrancy simply write.
    fn write_within(&self, value: T, _reentrancy: &Reentrancy) {
        self.write(value);
    }
}

/// The canonical in-memory [`Transceiver`]: a single shared value plus the receptors observing
/// it.
///
/// `StateCell` is a handle; clones address the same value. Writes are synchronous: the new value
/// is stored and the resulting [`StatePulse`] fanned out before `write` returns, so receptors may
/// write again from inside their callback. Each cell counts how deeply such writes are nested.
/// Once a write arrives while that depth already exceeds the [`Reentrancy`] limit in effect, the
/// value is still stored but no pulse is emitted, which is what lets two-way bindings settle.
pub struct StateCell<T> {
    inner: Arc<CellInner<T>>,
}

struct CellInner<T> {
    value: ArcSwap<T>,
    registry: Arc<ReceptorRegistry<StatePulse<T>>>,
    entrancy: AtomicUsize,
    suppressed: AtomicU64,
    reentrancy: Reentrancy,
}

struct Entered<'a>(&'a AtomicUsize);

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, AtomicOrdering::AcqRel);
    }
}

impl<T> StateCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        Self::with_reentrancy(initial, Reentrancy::default())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(initial)))]
    pub fn with_reentrancy(initial: T, reentrancy: Reentrancy) -> Self {
        StateCell {
            inner: Arc::new(CellInner {
                value: ArcSwap::from_pointee(initial),
                registry: ReceptorRegistry::new(),
                entrancy: AtomicUsize::new(0),
                suppressed: AtomicU64::new(0),
                reentrancy,
            }),
        }
    }

    pub fn read(&self) -> T {
        (**self.inner.value.load()).clone()
    }

    pub fn write(&self, value: T) {
        let reentrancy = self.inner.reentrancy;
        self.write_within(value, &reentrancy);
    }

    pub fn write_within(&self, value: T, reentrancy: &Reentrancy) {
        let depth = self.inner.entrancy.fetch_add(1, AtomicOrdering::AcqRel);
        let _entered = Entered(&self.inner.entrancy);
        let old = self.inner.value.swap(Arc::new(value.clone()));
        let old = Arc::try_unwrap(old).unwrap_or_else(|old| (*old).clone());
        if reentrancy.exceeded_by(depth) {
            self.inner.suppressed.fetch_add(1, AtomicOrdering::AcqRel);
            reentrancy.overflow(depth);
            return;
        }
        trace!(depth, "state changed");
        self.inner.registry.receive(StatePulse::changed(old, value));
    }

    /// Replaces the value with `f` applied to the current one.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        self.write(f(self.read()));
    }

    pub fn reentrancy(&self) -> Reentrancy {
        self.inner.reentrancy
    }

    /// Number of writes whose emission was suppressed by the reentrancy limit so far.
    pub fn suppressed(&self) -> u64 {
        self.inner.suppressed.load(AtomicOrdering::Acquire)
    }

    pub fn receptor_count(&self) -> usize {
        self.inner.registry.len()
    }
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        StateCell {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + Default + 'static> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("value", &**self.inner.value.load())
            .field("receptors", &self.inner.registry.len())
            .field("reentrancy", &self.inner.reentrancy)
            .finish()
    }
}

impl<T> Source for StateCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Pulse = StatePulse<T>;

    fn subscribe(&self, receptor: Receptor<StatePulse<T>>) -> Receipt {
        let entry = self.inner.registry.add(Arc::clone(&receptor));
        let current = self.read();
        deliver!(receptor, StatePulse::primed(current), "priming: {pulse}");

        let cell = Arc::downgrade(&self.inner);
        Receipt::with_request(
            move || entry.cancel(),
            move || {
                if let Some(cell) = cell.upgrade() {
                    let current = (**cell.value.load()).clone();
                    deliver!(receptor, StatePulse::primed(current), "re-priming: {pulse}");
                }
            },
        )
    }
}

impl<T> Transceiver<T> for StateCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn read(&self) -> T {
        StateCell::read(self)
    }

    fn write(&self, value: T) {
        StateCell::write(self, value);
    }

    fn write_within(&self, value: T, reentrancy: &Reentrancy) {
        StateCell::write_within(self, value, reentrancy);
    }
}

/// Stream factory over a fresh [`StateCell`] holding `initial`.
///
/// ```
/// let state = pulse::transceiver(1);
/// let seen = std::sync::Arc::new(crossbeam_queue::SegQueue::new());
///
/// state.subscribe({
///     let seen = seen.clone();
///     move |pulse| seen.push(pulse)
/// });
/// state.write(2);
///
/// assert_eq!(seen.pop(), Some(pulse::StatePulse::primed(1)));
/// assert_eq!(seen.pop(), Some(pulse::StatePulse::changed(1, 2)));
/// ```
pub fn transceiver<T>(initial: T) -> Stream<StateCell<T>, StatePulse<T>>
where
    T: Clone + Send + Sync + 'static,
{
    Stream::from_source(StateCell::new(initial))
}

impl<S, T: 'static> Stream<S, StatePulse<T>> {
    /// Forwards the priming pulse, then only the pulses where `predicate(new, old)` holds.
    ///
    /// No extra state is retained: every pulse already carries the value it replaced.
    pub fn changes_by<F>(self, predicate: F) -> Stream<S, StatePulse<T>>
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        self.filter(move |pulse| match &pulse.old {
            None => true,
            Some(old) => predicate(&pulse.new, old),
        })
    }

    /// Forwards the priming pulse, then only pulses whose value actually changed.
    ///
    /// For optional values a first assignment away from `None` is a change like any other.
    pub fn changes(self) -> Stream<S, StatePulse<T>>
    where
        T: PartialEq,
    {
        self.changes_by(|new, old| new != old)
    }

    /// Drops the previous values, keeping only `new`.
    pub fn values(self) -> Stream<S, T> {
        self.map(|pulse| pulse.new)
    }
}

impl<S, T> Stream<S, StatePulse<T>>
where
    S: Transceiver<T>,
    T: 'static,
{
    pub fn read(&self) -> T {
        self.source().read()
    }

    pub fn write(&self, value: T) {
        self.source().write(value);
    }
}
