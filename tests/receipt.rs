use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicUsize, Ordering as AtomicOrdering},
        Arc,
    },
};

use crate::common::{collector, drain};

use pulse::{sink, transceiver, CompositeReceipt, Receipt, StatePulse};

pub mod common;

fn counting_receipt(count: &Arc<AtomicUsize>) -> Receipt {
    let count = Arc::clone(count);
    Receipt::new(move || {
        count.fetch_add(1, AtomicOrdering::AcqRel);
    })
}

#[test_log::test]
fn cancel_is_idempotent() {
    let cancelled = Arc::new(AtomicUsize::new(0));
    let receipt = counting_receipt(&cancelled);

    assert!(!receipt.is_cancelled());
    receipt.cancel();
    receipt.clone().cancel();
    receipt.cancel();

    assert!(receipt.is_cancelled());
    assert_eq!(cancelled.load(AtomicOrdering::Acquire), 1);
}

#[test_log::test]
fn dropping_a_receipt_does_not_cancel_the_subscription() {
    let stream = sink::<i32>();
    let (actual, push) = collector();

    drop(stream.subscribe(push));
    stream.source().receive(1);

    assert_eq!(drain(&actual), [1]);
    assert_eq!(stream.source().receptor_count(), 1);
}

#[test_log::test]
fn a_composite_cancels_all_of_its_receipts() {
    let cancelled = Arc::new(AtomicUsize::new(0));
    let receipt: Receipt = (0..3).map(|_| counting_receipt(&cancelled)).collect();

    receipt.cancel();
    receipt.cancel();

    assert_eq!(cancelled.load(AtomicOrdering::Acquire), 3);
}

#[test_log::test]
fn receipts_pushed_after_cancellation_are_cancelled_immediately() {
    let cancelled = Arc::new(AtomicUsize::new(0));
    let composite = CompositeReceipt::new();
    composite.push(counting_receipt(&cancelled));

    composite.cancel();
    assert_eq!(cancelled.load(AtomicOrdering::Acquire), 1);

    let late = counting_receipt(&cancelled);
    composite.push(late.clone());
    assert!(late.is_cancelled());
    assert_eq!(cancelled.load(AtomicOrdering::Acquire), 2);
    assert!(composite.is_empty());
}

#[test_log::test]
fn a_panicking_child_does_not_stop_the_others_from_being_cancelled() {
    let cancelled = Arc::new(AtomicUsize::new(0));
    let composite = CompositeReceipt::new();
    composite.push(counting_receipt(&cancelled));
    composite.push(Receipt::new(|| panic!("cancel failed")));
    composite.push(counting_receipt(&cancelled));

    let result = panic::catch_unwind(AssertUnwindSafe(|| composite.cancel()));

    assert!(result.is_err());
    assert_eq!(cancelled.load(AtomicOrdering::Acquire), 2);
}

#[test_log::test]
fn request_re_primes_a_state_subscription() {
    let state = transceiver(1);
    let (actual, push) = collector();
    let receipt = state.subscribe(push);

    state.write(2);
    receipt.request();
    receipt.cancel();
    receipt.request();

    assert_eq!(
        drain(&actual),
        [
            StatePulse::primed(1),
            StatePulse::changed(1, 2),
            StatePulse::primed(2),
        ]
    );
}

#[test_log::test]
fn request_on_a_plain_receipt_does_nothing() {
    let cancelled = Arc::new(AtomicUsize::new(0));
    let receipt = counting_receipt(&cancelled);

    receipt.request();
    Receipt::empty().request();

    assert_eq!(cancelled.load(AtomicOrdering::Acquire), 0);
}

#[test_log::test]
fn cancelling_releases_what_the_receipt_captured() {
    let captured = Arc::new(());
    let released = Arc::downgrade(&captured);
    let receipt = Receipt::with_request(
        {
            let captured = Arc::clone(&captured);
            move || drop(captured)
        },
        move || {
            let _captured = &captured;
        },
    );

    receipt.cancel();

    assert!(receipt.is_cancelled());
    assert!(released.upgrade().is_none());
}
