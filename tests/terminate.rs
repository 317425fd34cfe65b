use std::sync::Arc;

use crate::common::{collector, drain};

use pulse::{from_iter, sink};

pub mod common;

#[test_log::test]
fn it_stops_at_the_matching_pulse_without_forwarding_it() {
    let stream = sink::<i32>();
    let (actual, push) = collector();

    stream.clone().terminate(|x| *x < 0, None).subscribe(push);
    stream.source().feed([1, 2, -1, 3]);

    assert_eq!(drain(&actual), [1, 2]);
    assert_eq!(stream.source().receptor_count(), 0);
}

#[test_log::test]
fn the_terminus_passes_through_downstream_operators() {
    let stream = sink::<i32>();
    let (actual, push) = collector();

    stream
        .clone()
        .terminate(|x| *x == 0, Some(Arc::new(|| -1)))
        .map(|x| x * 10)
        .subscribe(push);
    stream.source().feed([1, 0, 2]);

    assert_eq!(drain(&actual), [10, -10]);
}

#[test_log::test]
fn termination_during_subscription_still_cancels_upstream() {
    let (actual, push) = collector();

    let receipt = from_iter([1, 2, 3, 4]).terminate(|x| *x == 2, None).subscribe(push);

    assert_eq!(drain(&actual), [1]);
    assert!(receipt.is_cancelled());
}

#[test_log::test]
fn take_forwards_the_first_pulses_then_detaches() {
    let stream = sink::<i32>();
    let (actual, push) = collector();

    stream.clone().take(2).subscribe(push);
    assert_eq!(stream.source().receptor_count(), 1);

    stream.source().feed([1, 2, 3]);

    assert_eq!(drain(&actual), [1, 2]);
    assert_eq!(stream.source().receptor_count(), 0);
}

#[test_log::test]
fn take_zero_never_subscribes_upstream() {
    let stream = sink::<i32>();
    let (actual, push) = collector();

    stream.clone().take(0).subscribe(push);
    stream.source().receive(1);

    assert!(drain(&actual).is_empty());
    assert_eq!(stream.source().receptor_count(), 0);
}

#[test_log::test]
fn cancelling_releases_the_downstream_receptor() {
    let stream = sink::<i32>();
    let captured = Arc::new(());
    let released = Arc::downgrade(&captured);

    let receipt = stream
        .clone()
        .terminate(|x| *x < 0, None)
        .subscribe(move |_| {
            let _captured = &captured;
        });
    receipt.cancel();

    assert!(released.upgrade().is_none());
    assert_eq!(stream.source().receptor_count(), 0);
}

#[test_log::test]
fn terminating_releases_the_downstream_receptor() {
    let stream = sink::<i32>();
    let captured = Arc::new(());
    let released = Arc::downgrade(&captured);

    let _receipt = stream
        .clone()
        .terminate(|x| *x < 0, None)
        .subscribe(move |_| {
            let _captured = &captured;
        });
    stream.source().receive(-1);

    assert!(released.upgrade().is_none());
}
