//! Utility functions and helper modules.

pub mod platform;

pub use platform::*;
