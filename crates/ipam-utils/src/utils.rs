//! Logging macros over `tracing`.

#[doc(hidden)]
pub use tracing;

/// wrapping tracing::trace
#[macro_export]
macro_rules! ipam_log_trace {
       ( $msg: expr) => {$crate::utils::tracing::trace!($msg)};
       ( $format: expr, $($arg:tt)+) => {$crate::utils::tracing::trace!($format,  $($arg)+)};
}

/// wrapping tracing::debug
#[macro_export]
macro_rules! ipam_log_debug {
       ( $msg: expr) => {$crate::utils::tracing::debug!($msg)};
       ( $format: expr, $($arg:tt)+) => { $crate::utils::tracing::debug!( $format,  $($arg)+) };
}

/// wrapping tracing::info
#[macro_export]
macro_rules! ipam_log_info {
       ( $msg: expr) => {$crate::utils::tracing::info!($msg)};
       ( $format: expr, $($arg:tt)+) => { $crate::utils::tracing::info!( $format,  $($arg)+) };
}

/// wrapping tracing::warn
#[macro_export]
macro_rules! ipam_log_warn {
       ( $msg: expr) => {$crate::utils::tracing::warn!($msg)};
       ( $format: expr, $($arg:tt)+) => { $crate::utils::tracing::warn!( $format,  $($arg)+) };
}

/// wrapping tracing::error
#[macro_export]
macro_rules! ipam_log_error {
       ( $msg: expr) => {$crate::utils::tracing::error!($msg)};
       ( $format: expr, $($arg:tt)+) => { $crate::utils::tracing::error!( $format,  $($arg)+) };
}

/// Logs an error at debug level and gives it back
/// wrapped in an Err(..)
///
#[macro_export]
macro_rules! ipam_err_with_log {
    ($error: expr) => {{
        // Bind once so the expression is evaluated a single time, like `dbg!`.
        match $error {
            tmp => {
                $crate::utils::tracing::debug!(
                    "{:?} - {:?} at {:?}:{:?}",
                    std::module_path!(),
                    &tmp,
                    file!(),
                    line!()
                );
                Err(tmp)
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn ipam_err_with_log_evaluates_once() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
        let counter = AtomicUsize::new(0);
        let _result: Result<(), usize> =
            ipam_err_with_log!(counter.fetch_add(1, Ordering::Relaxed));
        assert_eq!(1, counter.load(Ordering::Relaxed));
    }

    #[test]
    fn ipam_err_with_log_returns_the_error() {
        let result: Result<(), &str> = ipam_err_with_log!("boom");
        assert_eq!(Err("boom"), result);
    }
}
