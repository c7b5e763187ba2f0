//! The boundary between a sink and the filter graph that feeds it.

pub mod queued;

pub use queued::QueuedSource;

use crate::error::{SinkError, SinkResult};
use crate::model::frame::AudioFrame;
use crate::model::link::LinkParams;
use crate::sink::FrameReceiver;

/// What a sink needs from the graph side of its input link.
pub trait Upstream {
    /// Negotiated parameters of the link. Constant for the sink's lifetime.
    fn link(&self) -> &LinkParams;

    /// Asks the graph to produce one unit and hand it to `receiver`.
    ///
    /// May drive arbitrary upstream work before returning. Returns
    /// [`SinkError::Eof`] once no more frames will come.
    fn request_frame(&mut self, receiver: &mut dyn FrameReceiver) -> SinkResult<()>;

    /// How many frames could be produced right now without blocking.
    fn poll_frame(&mut self) -> SinkResult<usize>;

    /// A fresh, writable audio frame of `nb_samples` samples in the link format.
    fn get_audio_buffer(&mut self, nb_samples: usize) -> SinkResult<AudioFrame> {
        let params = self
            .link()
            .audio_params()
            .ok_or_else(|| SinkError::invalid_argument("audio buffer requested on a video link"))?;
        AudioFrame::alloc(params, nb_samples)
    }
}

impl<U: Upstream + ?Sized> Upstream for Box<U> {
    fn link(&self) -> &LinkParams {
        (**self).link()
    }

    fn request_frame(&mut self, receiver: &mut dyn FrameReceiver) -> SinkResult<()> {
        (**self).request_frame(receiver)
    }

    fn poll_frame(&mut self) -> SinkResult<usize> {
        (**self).poll_frame()
    }

    fn get_audio_buffer(&mut self, nb_samples: usize) -> SinkResult<AudioFrame> {
        (**self).get_audio_buffer(nb_samples)
    }
}
