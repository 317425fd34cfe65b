use crate::common::{collector, drain};

use pulse::{from_iter, sink};

pub mod common;

#[test_log::test]
fn it_emits_the_accumulator_at_each_terminator() {
    let (actual, push) = collector();

    from_iter([1, 2, 0, 3, 4, 0, 5])
        .reduce(0, |acc, x| acc + x, |x| *x == 0, false, true)
        .subscribe(push);

    assert_eq!(drain(&actual), [3, 7]);
}

#[test_log::test]
fn terminators_can_be_folded_in_and_the_accumulator_kept() {
    let (actual, push) = collector();

    from_iter("a,b,c".chars().collect::<Vec<_>>())
        .reduce(
            String::new(),
            |mut acc, c| {
                acc.push(c);
                acc
            },
            |c| *c == ',',
            true,
            false,
        )
        .subscribe(push);

    assert_eq!(drain(&actual), ["a,", "a,b,"]);
}

#[test_log::test]
fn scan_emits_every_intermediate_accumulator() {
    let (actual, push) = collector();

    from_iter([1, 2, 3]).scan(0, |acc, x| acc + x).subscribe(push);

    assert_eq!(drain(&actual), [1, 3, 6]);
}

#[test_log::test]
fn accumulators_are_per_subscription() {
    let stream = sink::<i32>();
    let sums = stream.clone().scan(0, |acc, x| acc + x);
    let (first, push_first) = collector();
    let (second, push_second) = collector();

    sums.subscribe(push_first);
    stream.source().receive(10);
    sums.subscribe(push_second);
    stream.source().receive(1);

    assert_eq!(drain(&first), [10, 11]);
    assert_eq!(drain(&second), [1]);
}

#[test_log::test]
fn combine_may_push_back_into_its_own_subscription() {
    let stream = sink::<i32>();
    let feeder = stream.source().clone();
    let (actual, push) = collector();

    stream
        .clone()
        .scan(0, move |acc, x| {
            if x == 1 {
                feeder.receive(10);
            }
            acc + x
        })
        .subscribe(push);
    stream.source().receive(1);

    assert_eq!(drain(&actual).len(), 2);
}
