use std::sync::{
    atomic::{AtomicUsize, Ordering as AtomicOrdering},
    Arc,
};

use crate::common::{collector, drain};

use pulse::sink;

pub mod common;

#[test_log::test]
fn it_subscribes_upstream_once_for_all_receptors() {
    let source = sink::<i32>();
    let evaluated = Arc::new(AtomicUsize::new(0));
    let shared = source
        .clone()
        .map({
            let evaluated = Arc::clone(&evaluated);
            move |x| {
                evaluated.fetch_add(1, AtomicOrdering::AcqRel);
                x + 1
            }
        })
        .share();
    let (first, push_first) = collector();
    let (second, push_second) = collector();

    shared.subscribe(push_first);
    shared.subscribe(push_second);
    assert_eq!(source.source().receptor_count(), 1);

    source.source().receive(1);

    assert_eq!(evaluated.load(AtomicOrdering::Acquire), 1);
    assert_eq!(drain(&first), [2]);
    assert_eq!(drain(&second), [2]);
}

#[test_log::test]
fn late_receptors_only_see_later_pulses() {
    let source = sink::<i32>();
    let shared = source.clone().share();
    let (first, push_first) = collector();
    let (second, push_second) = collector();

    shared.subscribe(push_first);
    source.source().receive(1);
    shared.subscribe(push_second);
    source.source().receive(2);

    assert_eq!(drain(&first), [1, 2]);
    assert_eq!(drain(&second), [2]);
}

#[test_log::test]
fn upstream_is_released_with_the_last_receptor_and_reconnected_on_demand() {
    let source = sink::<i32>();
    let shared = source.clone().share();

    let a = shared.subscribe(|_| {});
    let b = shared.subscribe(|_| {});
    a.cancel();
    assert_eq!(source.source().receptor_count(), 1);
    b.cancel();
    assert_eq!(source.source().receptor_count(), 0);

    let (actual, push) = collector();
    shared.subscribe(push);
    assert_eq!(source.source().receptor_count(), 1);

    source.source().receive(3);
    assert_eq!(drain(&actual), [3]);
}
