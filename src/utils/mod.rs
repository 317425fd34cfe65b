pub(crate) mod tracing;

macro_rules! deliver {
    ($receptor:expr, $pulse:expr, $str:literal) => {
        ::cfg_if::cfg_if! {
            if #[cfg(feature = "tracing")] {
                {
                    let pulse = $pulse;
                    ::tracing::trace!($str, pulse = ::std::any::type_name_of_val(&pulse));
                    ($receptor)(pulse);
                }
            } else {
                ($receptor)($pulse);
            }
        }
    };
    ($receptor:expr, $pulse:expr, $str:literal, $($arg:tt)+) => {
        ::cfg_if::cfg_if! {
            if #[cfg(feature = "tracing")] {
                {
                    let pulse = $pulse;
                    ::tracing::trace!($str, pulse = ::std::any::type_name_of_val(&pulse), $($arg)+);
                    ($receptor)(pulse);
                }
            } else {
                ($receptor)($pulse);
            }
        }
    };
}
pub(crate) use deliver;
