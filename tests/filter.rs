use proptest::prelude::*;

use crate::common::{collector, drain};

use pulse::{from_iter, sink};

pub mod common;

#[test_log::test]
fn it_filters_pulses() {
    let (actual, push) = collector();

    from_iter(1..=6).filter(|x| x % 2 == 0).subscribe(push);

    assert_eq!(drain(&actual), [2, 4, 6]);
}

#[test_log::test]
fn sieve_compares_with_every_pulse_seen() {
    let (actual, push) = collector();

    from_iter([5, 1, 2, 6]).sieve(|current, previous| current > previous, false).subscribe(push);

    assert_eq!(drain(&actual), [5, 2, 6]);
}

#[test_log::test]
fn sieve_compares_with_the_last_pulse_passed() {
    let (actual, push) = collector();

    from_iter([5, 1, 2, 6]).sieve(|current, previous| current > previous, true).subscribe(push);

    assert_eq!(drain(&actual), [5, 6]);
}

#[test_log::test]
fn sieve_state_is_per_subscription() {
    let stream = from_iter([1, 1, 2]).distinct();
    let (first, push_first) = collector();
    let (second, push_second) = collector();

    stream.subscribe(push_first);
    stream.subscribe(push_second);

    assert_eq!(drain(&first), [1, 2]);
    assert_eq!(drain(&second), [1, 2]);
}

proptest! {
    #[test]
    fn sieving_on_inequality_removes_consecutive_duplicates(
        input in proptest::collection::vec(0u8..4, 0..64),
    ) {
        let (actual, push) = collector();

        from_iter(input.clone()).sieve(|a, b| a != b, false).subscribe(push);

        let mut expected = input;
        expected.dedup();
        prop_assert_eq!(drain(&actual), expected);
    }

    #[test]
    fn the_first_pulse_always_passes_the_sieve(
        input in proptest::collection::vec(any::<i32>(), 1..16),
        last_passed in any::<bool>(),
    ) {
        let (actual, push) = collector();

        from_iter(input.clone()).sieve(|_, _| false, last_passed).subscribe(push);

        prop_assert_eq!(drain(&actual), [input[0]]);
    }
}

#[test_log::test]
fn the_predicate_may_push_back_into_its_own_subscription() {
    let stream = sink::<i32>();
    let feeder = stream.source().clone();
    let (actual, push) = collector();

    stream
        .clone()
        .sieve(
            move |current, previous| {
                if *current == 2 {
                    feeder.receive(3);
                }
                current != previous
            },
            false,
        )
        .subscribe(push);
    stream.source().feed([1, 2]);

    assert_eq!(drain(&actual), [1, 3, 2]);
}
