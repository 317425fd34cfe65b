use proptest::prelude::*;

use crate::common::{collector, drain};

use pulse::{from_iter, sink};

pub mod common;

#[test_log::test]
fn it_emits_full_batches_in_order() {
    let (actual, push) = collector();

    from_iter(1..=7).buffer(3).subscribe(push);

    assert_eq!(drain(&actual), [vec![1, 2, 3], vec![4, 5, 6]]);
}

#[test_log::test]
fn a_partial_batch_is_held_back_until_it_fills() {
    let stream = sink::<char>();
    let (actual, push) = collector();
    stream.clone().buffer(2).subscribe(push);

    stream.source().receive('a');
    assert!(actual.is_empty());

    stream.source().receive('b');
    assert_eq!(drain(&actual), [vec!['a', 'b']]);
}

#[test_log::test]
#[should_panic(expected = "buffer size must be non-zero")]
fn a_zero_sized_buffer_is_rejected() {
    let _ = from_iter([1]).buffer(0);
}

proptest! {
    #[test]
    fn batches_are_full_and_preserve_order(
        input in proptest::collection::vec(any::<u16>(), 0..64),
        size in 1usize..8,
    ) {
        let (actual, push) = collector();

        from_iter(input.clone()).buffer(size).subscribe(push);

        let batches = drain(&actual);
        prop_assert_eq!(batches.len(), input.len() / size);
        prop_assert!(batches.iter().all(|batch| batch.len() == size));
        prop_assert_eq!(batches.concat(), &input[..batches.len() * size]);
    }
}
