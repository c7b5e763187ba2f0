use std::collections::VecDeque;

use log::trace;

use super::Upstream;
use crate::error::{SinkError, SinkResult};
use crate::model::frame::{AudioFrame, Frame};
use crate::model::link::LinkParams;
use crate::sink::FrameReceiver;

enum Step {
    Deliver(Frame),
    Burst(Vec<Frame>),
    Fail(SinkError),
    /// Report success without delivering anything.
    Silent,
}

/// Upstream that replays a prepared script of frames and failures, one step
/// per request. Reports end-of-stream once the script runs out.
pub struct QueuedSource {
    link: LinkParams,
    steps: VecDeque<Step>,
    requests: usize,
    fail_allocations: bool,
}

impl QueuedSource {
    pub fn new(link: LinkParams) -> Self {
        Self {
            link,
            steps: VecDeque::new(),
            requests: 0,
            fail_allocations: false,
        }
    }

    pub fn with_frames<I>(link: LinkParams, frames: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Frame>,
    {
        let mut source = Self::new(link);
        for frame in frames {
            source.push_frame(frame);
        }
        source
    }

    pub fn push_frame(&mut self, frame: impl Into<Frame>) {
        self.steps.push_back(Step::Deliver(frame.into()));
    }

    /// Queues a step that delivers several frames for a single request.
    pub fn push_burst(&mut self, frames: Vec<Frame>) {
        self.steps.push_back(Step::Burst(frames));
    }

    pub fn push_error(&mut self, err: SinkError) {
        self.steps.push_back(Step::Fail(err));
    }

    pub fn push_silent_success(&mut self) {
        self.steps.push_back(Step::Silent);
    }

    /// Makes every following `get_audio_buffer` call fail with out-of-memory.
    pub fn set_fail_allocations(&mut self, fail: bool) {
        self.fail_allocations = fail;
    }

    /// Number of `request_frame` calls served so far.
    pub fn requests(&self) -> usize {
        self.requests
    }
}

impl Upstream for QueuedSource {
    fn link(&self) -> &LinkParams {
        &self.link
    }

    fn request_frame(&mut self, receiver: &mut dyn FrameReceiver) -> SinkResult<()> {
        self.requests += 1;
        match self.steps.pop_front() {
            None => Err(SinkError::Eof),
            Some(Step::Deliver(frame)) => {
                trace!("queued source delivering frame pts={:?}", frame.pts());
                receiver.deliver(frame)
            }
            Some(Step::Burst(frames)) => {
                for frame in frames {
                    receiver.deliver(frame)?;
                }
                Ok(())
            }
            Some(Step::Fail(err)) => Err(err),
            Some(Step::Silent) => Ok(()),
        }
    }

    fn poll_frame(&mut self) -> SinkResult<usize> {
        Ok(self
            .steps
            .iter()
            .map(|step| match step {
                Step::Deliver(_) => 1,
                Step::Burst(frames) => frames.len(),
                Step::Fail(_) | Step::Silent => 0,
            })
            .sum())
    }

    fn get_audio_buffer(&mut self, nb_samples: usize) -> SinkResult<AudioFrame> {
        if self.fail_allocations {
            return Err(SinkError::OutOfMemory(format!(
                "audio buffer of {} samples",
                nb_samples
            )));
        }
        let params = self
            .link
            .audio_params()
            .ok_or_else(|| SinkError::invalid_argument("audio buffer requested on a video link"))?;
        AudioFrame::alloc(params, nb_samples)
    }
}
