mod buffer_sink;
mod rechunker;
mod slot;

pub use buffer_sink::{BufferSink, FrameSink, TeardownReport};
pub use rechunker::Rechunker;
pub use slot::{FrameReceiver, PendingSlot};
