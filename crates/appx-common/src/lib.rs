//! APPX Common
//!
//! Runtime utilities shared by the APPX crates and binaries.

pub mod logging;

pub use logging::{init_logging, LogFormat};
