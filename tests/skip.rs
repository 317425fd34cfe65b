use crate::common::{collector, drain};

use pulse::{from_iter, sink};

pub mod common;

#[test_log::test]
fn it_drops_the_first_pulses() {
    let (actual, push) = collector();

    from_iter(1..=5).skip(2).subscribe(push);

    assert_eq!(drain(&actual), [3, 4, 5]);
}

#[test_log::test]
fn skipping_more_than_available_forwards_nothing() {
    let (actual, push) = collector();

    from_iter([1, 2]).skip(5).subscribe(push);

    assert!(drain(&actual).is_empty());
}

#[test_log::test]
fn the_count_is_per_subscription() {
    let stream = sink::<i32>();
    let skipped = stream.clone().skip(1);
    let (first, push_first) = collector();
    let (second, push_second) = collector();

    skipped.subscribe(push_first);
    stream.source().receive(1);
    skipped.subscribe(push_second);
    stream.source().feed([2, 3]);

    assert_eq!(drain(&first), [2, 3]);
    assert_eq!(drain(&second), [3]);
}
