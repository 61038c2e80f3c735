//! Event logger implementations

pub mod tracing_logger;

pub use tracing_logger::TracingAuthLogger;
