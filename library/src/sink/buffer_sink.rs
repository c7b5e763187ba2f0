use log::{debug, trace};
use uuid::Uuid;

use super::rechunker::Rechunker;
use super::slot::{FrameReceiver, PendingSlot};
use crate::config::{SinkOptions, descriptor_for};
use crate::error::{SinkError, SinkResult};
use crate::graph::Upstream;
use crate::model::format::MediaType;
use crate::model::frame::{AudioFrame, Frame};
use crate::model::link::LinkParams;
use crate::util::Rational;

/// Consumer-facing half of a sink.
pub trait FrameSink {
    /// Frames ready upstream, without pulling any of them.
    fn poll(&mut self) -> SinkResult<usize>;

    /// Takes the next frame, driving upstream as needed.
    fn pull(&mut self) -> SinkResult<Frame>;
}

/// What [`BufferSink::teardown`] released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TeardownReport {
    pub released_pending_frame: bool,
    pub had_sample_queue: bool,
    pub released_samples: usize,
}

/// Terminal node of a filter graph. Frames are pulled out one at a time,
/// either as produced upstream or re-cut into fixed-size audio chunks.
pub struct BufferSink<U: Upstream> {
    id: Uuid,
    options: SinkOptions,
    upstream: U,
    slot: PendingSlot,
    rechunker: Option<Rechunker>,
    eof: bool,
}

impl<U: Upstream> BufferSink<U> {
    pub fn new(upstream: U) -> SinkResult<Self> {
        let media_type = upstream.link().media_type();
        let options = SinkOptions::new(descriptor_for(media_type).name, media_type);
        Self::with_options(upstream, options)
    }

    pub fn with_options(upstream: U, options: SinkOptions) -> SinkResult<Self> {
        upstream.link().validate()?;
        options.validate()?;
        let link_media = upstream.link().media_type();
        if options.media_type != link_media {
            return Err(SinkError::invalid_argument(format!(
                "{} sink '{}' attached to {} link",
                options.media_type, options.name, link_media
            )));
        }

        let id = Uuid::new_v4();
        debug!(
            "{} '{}' ({}) created, time base {}",
            descriptor_for(link_media).name,
            options.name,
            id,
            upstream.link().time_base
        );

        Ok(Self {
            id,
            options,
            upstream,
            slot: PendingSlot::new(),
            rechunker: None,
            eof: false,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn options(&self) -> &SinkOptions {
        &self.options
    }

    pub fn link(&self) -> &LinkParams {
        self.upstream.link()
    }

    pub fn media_type(&self) -> MediaType {
        self.link().media_type()
    }

    pub fn time_base(&self) -> Rational {
        self.link().time_base
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.link().audio_params().map(|p| p.sample_rate)
    }

    pub fn channels(&self) -> Option<usize> {
        self.link().audio_params().map(|p| p.channels())
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    pub fn upstream_mut(&mut self) -> &mut U {
        &mut self.upstream
    }

    /// True once upstream has reported end-of-stream.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Samples held back by fixed-size reads.
    pub fn buffered_samples(&self) -> usize {
        self.rechunker.as_ref().map_or(0, Rechunker::buffered)
    }

    pub fn set_frame_size(&mut self, frame_size: Option<usize>) -> SinkResult<()> {
        let mut options = self.options.clone();
        options.frame_size = frame_size;
        options.validate()?;
        self.options = options;
        Ok(())
    }

    /// Returns the next frame without taking it. A later [`pull`](Self::pull)
    /// hands out this same frame.
    pub fn peek(&mut self) -> SinkResult<&Frame> {
        if self.eof && !self.slot.is_occupied() {
            return Err(SinkError::Eof);
        }
        match self.slot.fill_from(&mut self.upstream) {
            Err(SinkError::Eof) => {
                debug!("'{}': end of stream", self.options.name);
                self.eof = true;
                Err(SinkError::Eof)
            }
            other => other,
        }
    }

    /// Returns exactly `nb_samples` samples, or fewer for the last chunk
    /// before end-of-stream.
    ///
    /// Samples left over from a larger upstream frame are kept for the next
    /// call. Mixing this with [`pull`](Self::pull) on the same sink skips
    /// whatever is still queued here.
    pub fn read_samples(&mut self, nb_samples: usize) -> SinkResult<AudioFrame> {
        if nb_samples == 0 {
            return Err(SinkError::invalid_argument("nb_samples must be positive"));
        }

        if self.rechunker.is_none() {
            let link = *self.upstream.link();
            let params = link.audio_params().ok_or_else(|| {
                SinkError::invalid_argument("fixed-size sample reads need an audio link")
            })?;
            debug!(
                "'{}': sample queue for {} {}ch @ {}Hz, initial {} samples",
                self.options.name,
                params.sample_format.name(),
                params.channels(),
                params.sample_rate,
                nb_samples
            );
            self.rechunker = Some(Rechunker::new(params, link.time_base, nb_samples)?);
        }
        let Some(chunker) = self.rechunker.as_mut() else {
            return Err(SinkError::invalid_state("sample queue missing"));
        };

        loop {
            if chunker.buffered() >= nb_samples {
                return chunker.take(&mut self.upstream, nb_samples);
            }

            let pulled = pull_next(
                &mut self.slot,
                &mut self.upstream,
                &mut self.eof,
                &self.options.name,
            );
            match pulled {
                Ok(Frame::Audio(frame)) => chunker.push(frame)?,
                Ok(Frame::Video(_)) => {
                    return Err(SinkError::invalid_state("video frame arrived on an audio link"));
                }
                Err(SinkError::Eof) if chunker.buffered() > 0 => {
                    let rest = chunker.buffered();
                    trace!("'{}': draining final {} samples", self.options.name, rest);
                    return chunker.take(&mut self.upstream, rest);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Next frame in the configured shape: fixed-size when the options set a
    /// `frame_size` on an audio sink, as produced upstream otherwise.
    pub fn get_frame(&mut self) -> SinkResult<Frame> {
        match self.options.frame_size {
            Some(frame_size) if self.media_type() == MediaType::Audio => {
                self.read_samples(frame_size).map(Frame::Audio)
            }
            _ => self.pull(),
        }
    }

    /// Releases the pending frame and the sample queue. Safe to call any
    /// number of times; also runs on drop.
    pub fn teardown(&mut self) -> TeardownReport {
        let released_pending_frame = self.slot.take().is_some();
        let (had_sample_queue, released_samples) = match self.rechunker.take() {
            Some(mut chunker) => (true, chunker.clear()),
            None => (false, 0),
        };

        let report = TeardownReport {
            released_pending_frame,
            had_sample_queue,
            released_samples,
        };
        if report != TeardownReport::default() {
            debug!("'{}' ({}) teardown: {:?}", self.options.name, self.id, report);
        }
        report
    }
}

fn pull_next<U: Upstream + ?Sized>(
    slot: &mut PendingSlot,
    upstream: &mut U,
    eof: &mut bool,
    name: &str,
) -> SinkResult<Frame> {
    if *eof && !slot.is_occupied() {
        return Err(SinkError::Eof);
    }
    match slot.pull_from(upstream) {
        Err(SinkError::Eof) => {
            debug!("'{}': end of stream", name);
            *eof = true;
            Err(SinkError::Eof)
        }
        other => other,
    }
}

impl<U: Upstream> FrameSink for BufferSink<U> {
    fn poll(&mut self) -> SinkResult<usize> {
        self.upstream.poll_frame()
    }

    fn pull(&mut self) -> SinkResult<Frame> {
        let frame = pull_next(
            &mut self.slot,
            &mut self.upstream,
            &mut self.eof,
            &self.options.name,
        )?;
        trace!("'{}': pulled frame pts={:?}", self.options.name, frame.pts());
        Ok(frame)
    }
}

impl<U: Upstream> FrameReceiver for BufferSink<U> {
    fn deliver(&mut self, frame: Frame) -> SinkResult<()> {
        self.slot.deliver(frame)
    }
}

impl<U: Upstream> Drop for BufferSink<U> {
    fn drop(&mut self) {
        self.teardown();
    }
}
