use log::{error, trace};

use crate::error::{SinkError, SinkResult};
use crate::graph::Upstream;
use crate::model::frame::Frame;

/// Receiving end of a link: the graph hands each produced frame to it.
pub trait FrameReceiver {
    /// Takes ownership of `frame`. Must only be called while the receiver
    /// is ready for one more frame.
    fn deliver(&mut self, frame: Frame) -> SinkResult<()>;
}

/// Holds at most one frame delivered by the graph and not yet claimed.
#[derive(Debug, Default)]
pub struct PendingSlot {
    frame: Option<Frame>,
}

impl PendingSlot {
    pub fn new() -> Self {
        Self { frame: None }
    }

    pub fn is_occupied(&self) -> bool {
        self.frame.is_some()
    }

    pub fn peek(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn take(&mut self) -> Option<Frame> {
        self.frame.take()
    }

    /// Makes sure the slot holds a frame, requesting one from `upstream` if
    /// it is empty. Upstream failures pass through untouched.
    pub fn fill_from<U: Upstream + ?Sized>(&mut self, upstream: &mut U) -> SinkResult<&Frame> {
        if self.frame.is_none() {
            upstream.request_frame(self)?;
        }
        match self.frame.as_ref() {
            Some(frame) => Ok(frame),
            None => {
                error!("upstream reported success without delivering a frame");
                Err(SinkError::invalid_state(
                    "upstream reported success but delivered no frame",
                ))
            }
        }
    }

    /// Requests a frame if needed and transfers it out of the slot.
    pub fn pull_from<U: Upstream + ?Sized>(&mut self, upstream: &mut U) -> SinkResult<Frame> {
        self.fill_from(upstream)?;
        self.frame
            .take()
            .ok_or_else(|| SinkError::invalid_state("pending slot emptied during pull"))
    }
}

impl FrameReceiver for PendingSlot {
    fn deliver(&mut self, frame: Frame) -> SinkResult<()> {
        if self.frame.is_some() {
            error!(
                "frame delivered into an occupied slot (pts={:?})",
                frame.pts()
            );
            return Err(SinkError::invalid_state(
                "frame delivered while the previous one is still pending",
            ));
        }
        trace!("slot received {} frame pts={:?}", frame.media_type(), frame.pts());
        self.frame = Some(frame);
        Ok(())
    }
}
