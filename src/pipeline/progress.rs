// src/pipeline/progress.rs

// With the "progressbar" feature the real indicatif types are used, otherwise
// these no-op stand-ins keep the call sites identical.

#[cfg(feature = "progressbar")]
pub use indicatif::{ProgressBar, ProgressStyle};

#[cfg(not(feature = "progressbar"))]
mod stub {
    use std::borrow::Cow;

    pub struct ProgressBar;

    impl ProgressBar {
        pub fn new(_length: u64) -> Self {
            Self {}
        }

        pub fn set_message(&self, _message: impl Into<Cow<'static, str>>) {}
        pub fn finish(&self) {}
        pub fn inc(&self, _inc: u64) {}
        pub fn set_style(&self, _style: ProgressStyle) {}
    }

    pub struct ProgressStyle;

    impl ProgressStyle {
        pub fn default_bar() -> Self {
            Self {}
        }
        pub fn template(self, _template: &str) -> Result<Self, String> {
            Ok(self)
        }
    }
}

#[cfg(not(feature = "progressbar"))]
pub use stub::{ProgressBar, ProgressStyle};

/// Builds a bar for `len` files, or nothing when progress is disabled.
pub(crate) fn file_progress(show: bool, len: usize, message: &'static str) -> Option<ProgressBar> {
    if !show {
        return None;
    }
    let p = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {msg:<30!} {wide_bar} {pos:>9!}/{len:<9!}")
    {
        p.set_style(style);
    }
    p.set_message(message);
    Some(p)
}
