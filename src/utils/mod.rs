//! Utility modules

pub mod error;

pub use error::{RecorderError, RecorderResult};
