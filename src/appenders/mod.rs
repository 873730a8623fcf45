//! Appender implementations

pub mod console;
pub mod hourly_file;

pub use console::ConsoleAppender;
pub use hourly_file::{HourKey, HourlyFileAppender, Rotation, RotationPolicy};

pub use crate::core::Appender;
