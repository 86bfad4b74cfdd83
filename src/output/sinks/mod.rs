pub mod disk;
pub mod memory;

pub use disk::DiskSink;
pub use memory::MemorySink;
