//! Logging macros, compiled out without the `log` feature.

macro_rules! trace {
  ($($a:tt)*) => {{
    #[cfg(feature = "log")]
    ::log::trace!($($a)*);
  }};
}

macro_rules! debug {
  ($($a:tt)*) => {{
    #[cfg(feature = "log")]
    ::log::debug!($($a)*);
  }};
}

macro_rules! warn {
  ($($a:tt)*) => {{
    #[cfg(feature = "log")]
    ::log::warn!($($a)*);
  }};
}

macro_rules! error {
  ($($a:tt)*) => {{
    #[cfg(feature = "log")]
    ::log::error!($($a)*);
  }};
}
