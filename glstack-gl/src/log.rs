//! Logging macros, compiled out without the `log` feature.

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
