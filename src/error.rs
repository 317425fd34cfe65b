use std::any::Any;

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A write re-entered a transceiver deeper than its reentrancy limit allows.
    #[error("reentrant write at depth {depth} exceeds the limit of {limit}")]
    ReentrancyLimit { depth: usize, limit: usize },
    /// A transform panicked; carries the panic message.
    #[error("transform panicked: {0}")]
    Transform(String),
    #[error("dispatcher rejected work: {0}")]
    Dispatch(String),
}

impl Error {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
            (*message).to_owned()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        Error::Transform(message)
    }
}
