/// Enters a trace span for the rest of the enclosing block, linked to the span the stream was
/// built in.
macro_rules! instrument {
    (follows_from: $follows_from:expr, $name:expr) => {
        ::cfg_if::cfg_if! {
            if #[cfg(feature = "tracing")] {
                ::paste::paste! {
                    let [<$name _span>] = ::tracing::trace_span!($name);
                    [<$name _span>].follows_from($follows_from);
                    let [<_ $name _entered>] = [<$name _span>].enter();
                }
            }
        }
    };
}
pub(crate) use instrument;

macro_rules! trace {
    ($($arg:tt)+) => {
        ::cfg_if::cfg_if! {
            if #[cfg(feature = "tracing")] {
                ::tracing::trace!($($arg)+);
            }
        }
    };
}
pub(crate) use trace;

macro_rules! warning {
    ($($arg:tt)+) => {
        ::cfg_if::cfg_if! {
            if #[cfg(feature = "tracing")] {
                ::tracing::warn!($($arg)+);
            }
        }
    };
}
pub(crate) use warning;
