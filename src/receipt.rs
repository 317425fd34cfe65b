use parking_lot::Mutex;
use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering as AtomicOrdering},
        Arc,
    },
};

type Cancel = Box<dyn FnOnce() + Send>;
type Request = Arc<dyn Fn() + Send + Sync>;

/// Cancellation handle for one subscription.
///
/// A `Receipt` is a cheap, cloneable handle; every clone addresses the same subscription.
/// Cancelling is idempotent, and dropping a receipt does **not** cancel it: subscriptions are
/// revoked explicitly.
///
/// Some subscriptions also support [`Receipt::request`], which re-issues the current value to the
/// subscribed receptor without waiting for the next natural change.
#[derive(Clone)]
pub struct Receipt(Arc<ReceiptInner>);

struct ReceiptInner {
    cancelled: AtomicBool,
    kind: ReceiptKind,
}

enum ReceiptKind {
    Empty,
    // Both are taken on cancel so whatever they capture is released with the subscription.
    Action {
        cancel: Mutex<Option<Cancel>>,
        request: Mutex<Option<Request>>,
    },
    Composite(CompositeReceipt),
}

impl Receipt {
    /// A receipt with nothing to cancel.
    pub fn empty() -> Self {
        Receipt(Arc::new(ReceiptInner {
            cancelled: AtomicBool::new(false),
            kind: ReceiptKind::Empty,
        }))
    }

    /// A receipt that runs `cancel` the first time it is cancelled.
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Receipt(Arc::new(ReceiptInner {
            cancelled: AtomicBool::new(false),
            kind: ReceiptKind::Action {
                cancel: Mutex::new(Some(Box::new(cancel))),
                request: Mutex::new(None),
            },
        }))
    }

    /// A receipt that runs `cancel` once on cancellation and `request` on every re-prime
    /// until cancelled.
    pub fn with_request<F, R>(cancel: F, request: R) -> Self
    where
        F: FnOnce() + Send + 'static,
        R: Fn() + Send + Sync + 'static,
    {
        Receipt(Arc::new(ReceiptInner {
            cancelled: AtomicBool::new(false),
            kind: ReceiptKind::Action {
                cancel: Mutex::new(Some(Box::new(cancel))),
                request: Mutex::new(Some(Arc::new(request))),
            },
        }))
    }

    /// Combines receipts so that cancelling (or requesting) the result cancels (or requests)
    /// each of them in order.
    pub fn composite<I>(receipts: I) -> Self
    where
        I: IntoIterator<Item = Receipt>,
    {
        let composite = CompositeReceipt::new();
        for receipt in receipts {
            composite.push(receipt);
        }
        composite.into_receipt()
    }

    /// Cancels the subscription. Calling this more than once has no further effect.
    pub fn cancel(&self) {
        if self.0.cancelled.swap(true, AtomicOrdering::AcqRel) {
            return;
        }
        match &self.0.kind {
            ReceiptKind::Empty => {}
            ReceiptKind::Action { cancel, request } => {
                request.lock().take();
                let cancel = cancel.lock().take();
                if let Some(cancel) = cancel {
                    cancel();
                }
            }
            ReceiptKind::Composite(composite) => composite.cancel(),
        }
    }

    /// Re-issues the current value to the subscribed receptor, if the subscription supports it.
    pub fn request(&self) {
        if self.is_cancelled() {
            return;
        }
        match &self.0.kind {
            ReceiptKind::Empty => {}
            ReceiptKind::Action { request, .. } => {
                let request = request.lock().clone();
                if let Some(request) = request {
                    request();
                }
            }
            ReceiptKind::Composite(composite) => composite.request(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.cancelled.load(AtomicOrdering::Acquire)
    }
}

impl Default for Receipt {
    fn default() -> Self {
        Receipt::empty()
    }
}

impl fmt::Debug for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receipt")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl FromIterator<Receipt> for Receipt {
    fn from_iter<I: IntoIterator<Item = Receipt>>(iter: I) -> Self {
        Receipt::composite(iter)
    }
}

/// An ordered, growable set of receipts that are cancelled together.
///
/// Receipts pushed after the set has been cancelled are cancelled on the spot, which lets
/// operators such as `flatten` keep attaching inner subscriptions without racing the outer
/// cancellation.
#[derive(Clone, Default)]
pub struct CompositeReceipt(Arc<CompositeInner>);

#[derive(Default)]
struct CompositeInner {
    cancelled: AtomicBool,
    receipts: Mutex<Vec<Receipt>>,
}

impl CompositeReceipt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, receipt: Receipt) {
        if self.is_cancelled() {
            receipt.cancel();
            return;
        }
        self.0.receipts.lock().push(receipt);
        // cancelled between the check and the push
        if self.is_cancelled() {
            self.cancel();
        }
    }

    pub fn len(&self) -> usize {
        self.0.receipts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.cancelled.load(AtomicOrdering::Acquire)
    }

    /// Cancels every child, in insertion order.
    ///
    /// A panicking child does not stop the remaining children from being cancelled; the first
    /// panic is resumed once all of them have been visited.
    pub fn cancel(&self) {
        self.0.cancelled.store(true, AtomicOrdering::Release);
        let receipts = std::mem::take(&mut *self.0.receipts.lock());
        let mut first_panic = None;
        for receipt in receipts {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| receipt.cancel())) {
                first_panic.get_or_insert(payload);
            }
        }
        if let Some(payload) = first_panic {
            panic::resume_unwind(payload);
        }
    }

    pub fn request(&self) {
        let receipts = self.0.receipts.lock().clone();
        for receipt in receipts {
            receipt.request();
        }
    }

    /// Wraps the set into a plain [`Receipt`].
    pub fn into_receipt(self) -> Receipt {
        Receipt(Arc::new(ReceiptInner {
            cancelled: AtomicBool::new(false),
            kind: ReceiptKind::Composite(self),
        }))
    }
}

impl fmt::Debug for CompositeReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeReceipt")
            .field("len", &self.len())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
