pub mod sink;
pub mod sinks;

pub use sink::{OutputError, OutputSink};
pub use sinks::{DiskSink, MemorySink};
