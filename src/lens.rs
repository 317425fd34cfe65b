use std::{fmt, sync::Arc};

use crate::{Receipt, Receptor, Reentrancy, Source, StatePulse, Stream, Transceiver};

/// A pure pair of functions viewing and updating a part `P` of a whole `W`.
///
/// Lenses are expected to satisfy `get(&set(whole, part)) == part`; that is not checked.
pub struct Lens<W, P> {
    get: Arc<dyn Fn(&W) -> P + Send + Sync>,
    set: Arc<dyn Fn(W, P) -> W + Send + Sync>,
}

impl<W: 'static, P: 'static> Lens<W, P> {
    pub fn new<G, F>(get: G, set: F) -> Self
    where
        G: Fn(&W) -> P + Send + Sync + 'static,
        F: Fn(W, P) -> W + Send + Sync + 'static,
    {
        Lens {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    pub fn get(&self, whole: &W) -> P {
        (self.get)(whole)
    }

    pub fn set(&self, whole: W, part: P) -> W {
        (self.set)(whole, part)
    }

    /// Focuses further into the part through `inner`.
    pub fn compose<Q: 'static>(self, inner: Lens<P, Q>) -> Lens<W, Q> {
        let outer_get = Arc::clone(&self.get);
        let inner_get = Arc::clone(&inner.get);
        let outer = self;
        Lens::new(
            move |whole: &W| inner_get(&outer_get(whole)),
            move |whole: W, part: Q| {
                let middle = outer.get(&whole);
                outer.set(whole, inner.set(middle, part))
            },
        )
    }
}

impl<W, P> Clone for Lens<W, P> {
    fn clone(&self) -> Self {
        Lens {
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<W, P> fmt::Debug for Lens<W, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lens<{}, {}>",
            std::any::type_name::<W>(),
            std::any::type_name::<P>(),
        )
    }
}

/// A transceiver viewing part of a parent transceiver through a [`Lens`].
///
/// It keeps no receptors of its own: subscriptions go to the parent and every parent pulse is
/// mapped through the lens on both its old and new value. Writes read the parent, set the part
/// and write the whole back.
pub struct Focus<T, W, P> {
    parent: T,
    lens: Lens<W, P>,
}

impl<T, W, P> Focus<T, W, P> {
    pub fn new(parent: T, lens: Lens<W, P>) -> Self {
        Focus { parent, lens }
    }

    pub fn parent(&self) -> &T {
        &self.parent
    }
}

impl<T: Clone, W, P> Clone for Focus<T, W, P> {
    fn clone(&self) -> Self {
        Focus {
            parent: self.parent.clone(),
            lens: self.lens.clone(),
        }
    }
}

impl<T: fmt::Debug, W, P> fmt::Debug for Focus<T, W, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Focus")
            .field("parent", &self.parent)
            .field("lens", &self.lens)
            .finish()
    }
}

impl<T, W, P> Source for Focus<T, W, P>
where
    T: Transceiver<W>,
    W: 'static,
    P: 'static,
{
    type Pulse = StatePulse<P>;

    fn subscribe(&self, receptor: Receptor<StatePulse<P>>) -> Receipt {
        let lens = self.lens.clone();
        self.parent
            .subscribe(Arc::new(move |pulse: StatePulse<W>| {
                receptor(pulse.map(|whole| lens.get(&whole)))
            }))
    }
}

impl<T, W, P> Transceiver<P> for Focus<T, W, P>
where
    T: Transceiver<W>,
    W: 'static,
    P: 'static,
{
    fn read(&self) -> P {
        self.lens.get(&self.parent.read())
    }

    fn write(&self, value: P) {
        self.parent.write(self.lens.set(self.parent.read(), value));
    }

    fn write_within(&self, value: P, reentrancy: &Reentrancy) {
        self.parent
            .write_within(self.lens.set(self.parent.read(), value), reentrancy);
    }
}

impl<S, W> Stream<S, StatePulse<W>>
where
    S: Transceiver<W> + Clone,
    W: 'static,
{
    /// Derives a transceiver stream over the part of this state selected by `lens`.
    ///
    /// ```
    /// use pulse::{transceiver, Lens};
    ///
    /// let point = transceiver((1, 2));
    /// let x = point.focus(Lens::new(|p: &(i32, i32)| p.0, |p, x| (x, p.1)));
    ///
    /// x.write(10);
    /// assert_eq!(x.read(), 10);
    /// assert_eq!(point.read(), (10, 2));
    /// ```
    pub fn focus<P: 'static>(&self, lens: Lens<W, P>) -> Stream<Focus<S, W, P>, StatePulse<P>> {
        Stream::from_source(Focus::new(self.source().clone(), lens))
    }
}
