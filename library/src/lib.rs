pub mod audio;
pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod sink;
pub mod util;

pub use config::{SinkDescriptor, SinkOptions};
pub use error::{SinkError, SinkResult};
pub use graph::{QueuedSource, Upstream};
pub use model::{
    AudioFrame, AudioParams, ChannelLayout, Frame, LinkParams, MediaType, PixelFormat,
    SampleFormat, VideoFrame, VideoParams,
};
pub use sink::{BufferSink, FrameReceiver, FrameSink, TeardownReport};
pub use util::Rational;
