use std::{fmt, sync::Arc};

use crate::{Receipt, Receptor, ReceptorRegistry, Source, Stream};

/// A source that external code pushes pulses into.
///
/// Clones share one registry: a pulse received through any clone reaches every receptor.
pub struct SinkSource<P> {
    registry: Arc<ReceptorRegistry<P>>,
}

impl<P: Clone + 'static> SinkSource<P> {
    pub fn new() -> Self {
        SinkSource {
            registry: ReceptorRegistry::new(),
        }
    }

    /// Pushes `pulse` to every attached receptor.
    pub fn receive(&self, pulse: P) {
        self.registry.receive(pulse);
    }

    pub fn feed<I>(&self, iter: I)
    where
        I: IntoIterator<Item = P>,
    {
        for pulse in iter {
            self.receive(pulse);
        }
    }

    pub fn receptor_count(&self) -> usize {
        self.registry.len()
    }
}

impl<P: Clone + 'static> Default for SinkSource<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for SinkSource<P> {
    fn clone(&self) -> Self {
        SinkSource {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<P> fmt::Debug for SinkSource<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SinkSource").field(&self.registry).finish()
    }
}

impl<P: Clone + Send + Sync + 'static> Source for SinkSource<P> {
    type Pulse = P;

    fn subscribe(&self, receptor: Receptor<P>) -> Receipt {
        self.registry.add(receptor)
    }
}

/// Stream factory over a fresh [`SinkSource`].
///
/// ```
/// use crossbeam_queue::SegQueue;
/// use std::sync::Arc;
///
/// let stream = pulse::sink::<i32>();
/// let actual = Arc::new(SegQueue::new());
/// let receipt = stream.subscribe({
///     let actual = Arc::clone(&actual);
///     move |x| actual.push(x)
/// });
///
/// stream.source().receive(1);
/// receipt.cancel();
/// stream.source().receive(2);
///
/// assert_eq!(actual.pop(), Some(1));
/// assert_eq!(actual.pop(), None);
/// ```
pub fn sink<P: Clone + Send + Sync + 'static>() -> Stream<SinkSource<P>, P> {
    Stream::from_source(SinkSource::new())
}
