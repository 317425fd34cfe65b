use crossbeam_queue::SegQueue;
use std::sync::Arc;

pub type Collected<T> = Arc<SegQueue<T>>;

/// A thread-safe queue plus a receptor pushing into it.
#[allow(dead_code)]
pub fn collector<T: Send + 'static>() -> (Collected<T>, impl Fn(T) + Send + Sync + 'static) {
    let collected = Arc::new(SegQueue::new());
    let push = {
        let collected = Arc::clone(&collected);
        move |pulse| collected.push(pulse)
    };
    (collected, push)
}

#[allow(dead_code)]
pub fn drain<T>(queue: &SegQueue<T>) -> Vec<T> {
    let mut v = vec![];
    while let Some(x) = queue.pop() {
        v.push(x);
    }
    v
}
