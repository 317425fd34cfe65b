use crate::common::{collector, drain};

use pulse::{from_iter, merge, merge_all, never, sink};

pub mod common;

#[test_log::test]
fn it_interleaves_pulses_in_arrival_order() {
    let left = sink::<i32>();
    let right = sink::<i32>();
    let (actual, push) = collector();

    left.clone().merge(right.clone()).subscribe(push);
    left.source().receive(1);
    right.source().receive(2);
    left.source().receive(3);

    assert_eq!(drain(&actual), [1, 2, 3]);
}

#[test_log::test]
fn cancelling_the_merge_detaches_every_source() {
    let left = sink::<i32>();
    let right = sink::<i32>();

    let receipt = merge_all(vec![left.clone(), right.clone()]).subscribe(|_| {});
    assert_eq!(left.source().receptor_count(), 1);
    assert_eq!(right.source().receptor_count(), 1);

    receipt.cancel();

    assert_eq!(left.source().receptor_count(), 0);
    assert_eq!(right.source().receptor_count(), 0);
}

#[test_log::test]
fn the_macro_subscribes_to_sources_in_order() {
    let (actual, push) = collector();

    merge!(from_iter([1, 2]), from_iter([3]), from_iter([4, 5])).subscribe(push);

    assert_eq!(drain(&actual), [1, 2, 3, 4, 5]);
}

#[test_log::test]
fn never_is_neutral() {
    let (actual, push) = collector();

    from_iter([1, 2])
        .merge(never().map(|never| match never {}))
        .subscribe(push);

    assert_eq!(drain(&actual), [1, 2]);
}

#[test_log::test]
fn either_tags_each_pulse_with_its_side() {
    let numbers = sink::<i32>();
    let words = sink::<&'static str>();
    let (actual, push) = collector();

    numbers.clone().either(words.clone()).subscribe(push);
    numbers.source().receive(1);
    words.source().receive("one");

    assert_eq!(drain(&actual), [(Some(1), None), (None, Some("one"))]);
}
