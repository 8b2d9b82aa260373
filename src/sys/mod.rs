//! Raw ABI and platform-call definitions.

pub mod jni;

#[cfg(windows)]
pub mod windows;
