//! Structured logging to stderr.

mod format;

pub use format::StructuredLogger;
