use std::sync::{
    atomic::{AtomicBool, Ordering as AtomicOrdering},
    Arc, OnceLock,
};

use crate::common::{collector, drain};

use pulse::{Receipt, ReceptorRegistry};

pub mod common;

#[test_log::test]
fn it_fans_out_to_every_receptor_in_order() {
    let registry = ReceptorRegistry::new();
    let (actual, push) = collector();
    let push = Arc::new(push);

    registry.add(Arc::new({
        let push = Arc::clone(&push);
        move |x: i32| push(("first", x))
    }));
    registry.add(Arc::new(move |x: i32| push(("second", x))));
    registry.receive(7);

    assert_eq!(drain(&actual), [("first", 7), ("second", 7)]);
    assert_eq!(registry.len(), 2);
}

#[test_log::test]
fn receptors_added_during_delivery_only_see_later_pulses() {
    let registry = ReceptorRegistry::<i32>::new();
    let (actual, push) = collector();
    let push = Arc::new(push);
    let added = Arc::new(AtomicBool::new(false));

    registry.add(Arc::new({
        let registry = Arc::downgrade(&registry);
        let push = Arc::clone(&push);
        move |x| {
            push(("outer", x));
            if !added.swap(true, AtomicOrdering::AcqRel) {
                if let Some(registry) = registry.upgrade() {
                    let push = Arc::clone(&push);
                    registry.add(Arc::new(move |x| push(("late", x))));
                }
            }
        }
    }));

    registry.receive(1);
    registry.receive(2);

    assert_eq!(drain(&actual), [("outer", 1), ("outer", 2), ("late", 2)]);
}

#[test_log::test]
fn a_receptor_cancelled_during_delivery_is_not_called_again() {
    let registry = ReceptorRegistry::<i32>::new();
    let (actual, push) = collector();
    let push = Arc::new(push);
    let victim: Arc<OnceLock<Receipt>> = Arc::new(OnceLock::new());

    registry.add(Arc::new({
        let victim = Arc::clone(&victim);
        let push = Arc::clone(&push);
        move |x| {
            push(("canceller", x));
            if let Some(receipt) = victim.get() {
                receipt.cancel();
            }
        }
    }));
    let receipt = registry.add(Arc::new(move |x| push(("victim", x))));
    victim.set(receipt).ok();

    registry.receive(1);
    registry.receive(2);

    assert_eq!(drain(&actual), [("canceller", 1), ("canceller", 2)]);
    assert_eq!(registry.len(), 1);
}

#[test_log::test]
fn cancelling_after_the_registry_is_gone_is_a_no_op() {
    let registry = ReceptorRegistry::<i32>::new();
    let receipt = registry.add(Arc::new(|_| {}));

    drop(registry);
    receipt.cancel();

    assert!(receipt.is_cancelled());
}

#[test_log::test]
fn a_receptor_may_cancel_itself_during_delivery() {
    let registry = ReceptorRegistry::<i32>::new();
    let (actual, push) = collector();
    let push = Arc::new(push);
    let own: Arc<OnceLock<Receipt>> = Arc::new(OnceLock::new());

    let receipt = registry.add(Arc::new({
        let own = Arc::clone(&own);
        let push = Arc::clone(&push);
        move |x| {
            push(("once", x));
            if let Some(receipt) = own.get() {
                receipt.cancel();
            }
        }
    }));
    own.set(receipt).ok();
    registry.add(Arc::new(move |x| push(("always", x))));

    registry.receive(1);
    registry.receive(2);

    assert_eq!(drain(&actual), [("once", 1), ("always", 1), ("always", 2)]);
    assert_eq!(registry.len(), 1);
}
