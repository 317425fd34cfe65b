//! Push-based reactive streams with explicit, revocable subscriptions, plus observable state
//! ("transceivers") that can be bound to each other in both directions.
//!
//! A [`Stream`] pairs a source value with a way to subscribe to it. Subscribing attaches a
//! [`Receptor`] and hands back a [`Receipt`]; the subscription lasts until the receipt is
//! cancelled, not until it is dropped. Operators such as [`Stream::map`], [`Stream::filter`] or
//! [`Stream::zip`] build new streams over the same source with per-subscription state.
//!
//! [`StateCell`] is the in-memory [`Transceiver`]: a readable, writable value whose subscribers
//! receive a [`StatePulse`] with the old and new value on every write. [`conduit`] binds two
//! transceivers so that each change on one side is written to the other, with a [`Reentrancy`]
//! limit that lets mutually-updating pairs settle.
//!
//! Delivery is synchronous and happens on the caller's thread. [`Stream::dispatch`] marshals it
//! onto a [`Dispatcher`] instead.

pub use crate::{
    conduit::{bind, conduit, conduit_with, OverflowPolicy, Reentrancy},
    dispatch::{interval, Dispatcher, Immediate, NurseryDispatcher, Work},
    error::Error,
    from_iter::{from_fn, from_iter, never},
    lens::{Focus, Lens},
    merge::merge_all,
    receipt::{CompositeReceipt, Receipt},
    registry::ReceptorRegistry,
    sink::{sink, SinkSource},
    state::{transceiver, StateCell, StatePulse, Transceiver},
    stream::{Receptor, Source, Stream},
    terminate::Terminus,
    zip::{either_all, zip_all, StreamTuple},
};

mod buffer;
mod conduit;
mod dispatch;
mod error;
mod filter;
mod flatten;
mod from_iter;
mod lens;
mod map;
mod merge;
mod receipt;
mod reduce;
mod registry;
mod share;
mod sink;
mod skip;
mod state;
mod stream;
mod terminate;
mod zip;

pub(crate) mod utils;
