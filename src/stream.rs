use std::{fmt, sync::Arc};

#[cfg(feature = "tracing")]
use tracing::Span;

use crate::{utils::tracing::instrument, Receipt};

/// A callback attached to a stream. Every pulse is handed to it by value.
pub type Receptor<P> = Arc<dyn Fn(P) + Send + Sync>;

pub(crate) type Subscriber<P> = Arc<dyn Fn(Receptor<P>) -> Receipt + Send + Sync>;

/// Anything that can push pulses to a receptor until the returned [`Receipt`] is cancelled.
///
/// Adapters bridging external change notifications only need to implement this to be usable with
/// every operator on [`Stream`].
pub trait Source: Send + Sync + 'static {
    type Pulse;

    fn subscribe(&self, receptor: Receptor<Self::Pulse>) -> Receipt;
}

/// A composable, push-based description of a source value and a way to subscribe to it.
///
/// Streams are immutable: every subscription is independent and individually cancellable, and
/// operator state (buffers, accumulators, previous values) is allocated per subscription. State
/// is only shared between subscriptions when it lives in the source itself, as it does for
/// [`StateCell`](crate::StateCell).
pub struct Stream<S, P> {
    source: S,
    subscriber: Subscriber<P>,
}

impl<S, P: 'static> Stream<S, P> {
    /// Builds a stream over `source` whose subscriptions are performed by `subscribe`.
    pub fn new<F>(source: S, subscribe: F) -> Self
    where
        F: Fn(Receptor<P>) -> Receipt + Send + Sync + 'static,
    {
        Stream {
            source,
            subscriber: Arc::new(subscribe),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Attaches `receptor` to the stream.
    pub fn subscribe<F>(&self, receptor: F) -> Receipt
    where
        F: Fn(P) + Send + Sync + 'static,
    {
        (self.subscriber)(Arc::new(receptor))
    }

    pub fn subscribe_receptor(&self, receptor: Receptor<P>) -> Receipt {
        (self.subscriber)(receptor)
    }

    /// The primitive behind every transforming operator.
    ///
    /// `lift` receives the downstream receptor of a new subscription and returns the receptor to
    /// attach upstream. It runs once per subscription, so any state it creates belongs to that
    /// subscription alone.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
    pub fn lift<Q: 'static, F>(self, lift: F) -> Stream<S, Q>
    where
        F: Fn(Receptor<Q>) -> Receptor<P> + Send + Sync + 'static,
    {
        #[cfg(feature = "tracing")]
        let lift_fn_span = Span::current();
        let upstream = self.subscriber;
        Stream::new(self.source, move |downstream| {
            instrument!(follows_from: &lift_fn_span, "subscribe");
            upstream(lift(downstream))
        })
    }

    pub(crate) fn subscriber(&self) -> Subscriber<P> {
        Arc::clone(&self.subscriber)
    }

    /// Replaces the source value, keeping the subscription behaviour.
    pub fn with_source<S2>(self, source: S2) -> Stream<S2, P> {
        Stream {
            source,
            subscriber: self.subscriber,
        }
    }

    /// Drops the source value.
    pub fn erase(self) -> Stream<(), P> {
        self.with_source(())
    }
}

impl<S: Source + Clone> Stream<S, S::Pulse>
where
    S::Pulse: 'static,
{
    pub fn from_source(source: S) -> Self {
        let subscribed = source.clone();
        Stream::new(source, move |receptor| subscribed.subscribe(receptor))
    }
}

impl<S, P> Source for Stream<S, P>
where
    S: Send + Sync + 'static,
    P: 'static,
{
    type Pulse = P;

    fn subscribe(&self, receptor: Receptor<P>) -> Receipt {
        (self.subscriber)(receptor)
    }
}

impl<S: Clone, P> Clone for Stream<S, P> {
    fn clone(&self) -> Self {
        Stream {
            source: self.source.clone(),
            subscriber: Arc::clone(&self.subscriber),
        }
    }
}

impl<S, P> fmt::Debug for Stream<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stream<{}, {}>",
            std::any::type_name::<S>(),
            std::any::type_name::<P>(),
        )
    }
}
